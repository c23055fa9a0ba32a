use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LogsProgressValue {
    /// Records received during the current connection.
    pub value: u64,
    /// Only set for bounded (cold) ranges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PauseReason {
    Overflow,
    User,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StreamState {
    #[default]
    Idle,
    Connecting,
    WaitingForFirstLog,
    Running {
        progress: LogsProgressValue,
        overflowing: bool,
    },
    Paused {
        reason: PauseReason,
        progress: LogsProgressValue,
        overflowing: bool,
    },
    Completed {
        progress: LogsProgressValue,
        overflowing: bool,
    },
    Error,
}

/// Payload-free discriminant of [`StreamState`], used in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    Idle,
    Connecting,
    WaitingForFirstLog,
    Running,
    PausedByUser,
    PausedByOverflow,
    Completed,
    Error,
}

impl StreamState {
    pub fn kind(&self) -> StateKind {
        match self {
            StreamState::Idle => StateKind::Idle,
            StreamState::Connecting => StateKind::Connecting,
            StreamState::WaitingForFirstLog => StateKind::WaitingForFirstLog,
            StreamState::Running { .. } => StateKind::Running,
            StreamState::Paused {
                reason: PauseReason::User,
                ..
            } => StateKind::PausedByUser,
            StreamState::Paused {
                reason: PauseReason::Overflow,
                ..
            } => StateKind::PausedByOverflow,
            StreamState::Completed { .. } => StateKind::Completed,
            StreamState::Error => StateKind::Error,
        }
    }

    pub fn progress(&self) -> Option<LogsProgressValue> {
        match self {
            StreamState::Running { progress, .. }
            | StreamState::Paused { progress, .. }
            | StreamState::Completed { progress, .. } => Some(*progress),
            _ => None,
        }
    }

    pub fn is_overflowing(&self) -> bool {
        match self {
            StreamState::Running { overflowing, .. }
            | StreamState::Paused { overflowing, .. }
            | StreamState::Completed { overflowing, .. } => *overflowing,
            _ => false,
        }
    }

    /// True while a transport is expected to be open.
    pub fn is_connected(&self) -> bool {
        matches!(
            self.kind(),
            StateKind::Connecting
                | StateKind::WaitingForFirstLog
                | StateKind::Running
                | StateKind::PausedByUser
        )
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StateKind::Idle => "idle",
            StateKind::Connecting => "connecting",
            StateKind::WaitingForFirstLog => "waitingForFirstLog",
            StateKind::Running => "running",
            StateKind::PausedByUser => "paused(user)",
            StateKind::PausedByOverflow => "paused(overflow)",
            StateKind::Completed => "completed",
            StateKind::Error => "error",
        };
        f.write_str(label)
    }
}
