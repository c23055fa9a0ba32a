use serde::{Deserialize, Serialize};

use super::{InstanceId, UnixMillis};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceState {
    Booting,
    Starting,
    Deploying,
    Ready,
    Stopping,
    Stopped,
    Failed,
}

impl InstanceState {
    pub fn is_alive(self) -> bool {
        !matches!(self, InstanceState::Stopped | InstanceState::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub id: String,
    #[serde(default)]
    pub commit: Option<String>,
}

/// An application process unit that emits logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub id: InstanceId,
    #[serde(default)]
    pub index: Option<u32>,
    pub state: InstanceState,
    pub deployment: Deployment,
    pub creation_date: UnixMillis,
    #[serde(default)]
    pub deletion_date: Option<UnixMillis>,
}

/// An instance referenced by id whose metadata could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GhostInstance {
    pub ghost: bool,
    pub id: InstanceId,
}

impl GhostInstance {
    pub fn new(id: impl Into<InstanceId>) -> Self {
        Self {
            ghost: true,
            id: id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InstanceRef {
    Ghost(GhostInstance),
    Resolved(Instance),
}

impl InstanceRef {
    pub fn id(&self) -> &str {
        match self {
            InstanceRef::Ghost(ghost) => &ghost.id,
            InstanceRef::Resolved(instance) => &instance.id,
        }
    }

    pub fn is_ghost(&self) -> bool {
        matches!(self, InstanceRef::Ghost(_))
    }

    pub fn deployment_id(&self) -> Option<&str> {
        match self {
            InstanceRef::Ghost(_) => None,
            InstanceRef::Resolved(instance) => Some(&instance.deployment.id),
        }
    }
}

impl From<Instance> for InstanceRef {
    fn from(instance: Instance) -> Self {
        InstanceRef::Resolved(instance)
    }
}

impl From<GhostInstance> for InstanceRef {
    fn from(ghost: GhostInstance) -> Self {
        InstanceRef::Ghost(ghost)
    }
}
