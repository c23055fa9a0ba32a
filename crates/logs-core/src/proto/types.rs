use serde::{Deserialize, Serialize};

pub type UnixMillis = i64;
pub type InstanceId = String;

/// Identifies one `connect()` epoch of a stream controller.
pub type ConnectionId = u64;

/// Metadata key carrying the id of the instance that emitted a record.
pub const INSTANCE_ID_KEY: &str = "instanceId";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub name: String,
    pub value: String,
}

impl Metadata {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One log line as received from the transport. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub id: String,
    pub timestamp: UnixMillis,
    /// Raw message, ANSI sequences included.
    pub message: String,
    #[serde(default)]
    pub metadata: Vec<Metadata>,
}

impl LogRecord {
    pub fn new(id: impl Into<String>, timestamp: UnixMillis, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            timestamp,
            message: message.into(),
            metadata: Vec::new(),
        }
    }

    pub fn with_metadata(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push(Metadata::new(name, value));
        self
    }

    pub fn metadata_value(&self, name: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.value.as_str())
    }

    pub fn instance_id(&self) -> Option<&str> {
        self.metadata_value(INSTANCE_ID_KEY)
    }
}

/// Time window of a subscription. `until` absent means a live tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamRange {
    pub since: UnixMillis,
    #[serde(default)]
    pub until: Option<UnixMillis>,
}

impl StreamRange {
    pub fn live(since: UnixMillis) -> Self {
        Self { since, until: None }
    }

    pub fn bounded(since: UnixMillis, until: UnixMillis) -> Self {
        Self {
            since,
            until: Some(until),
        }
    }

    pub fn is_bounded(&self) -> bool {
        self.until.is_some()
    }

    /// Share of the range covered by `at`, in `[0, 100]`. `None` for live ranges.
    pub fn percent_at(&self, at: UnixMillis) -> Option<f64> {
        let until = self.until?;
        // wire timestamps may sit anywhere in i64
        let span = i128::from(until) - i128::from(self.since);
        if span <= 0 {
            return Some(100.0);
        }
        let covered = (i128::from(at) - i128::from(self.since)) as f64 / span as f64 * 100.0;
        Some(covered.clamp(0.0, 100.0))
    }
}
