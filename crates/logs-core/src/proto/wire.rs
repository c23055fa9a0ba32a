use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::{LogRecord, Metadata, UnixMillis};
use crate::errors::RecordError;

/// Date field of a wire log event: RFC 3339 text or epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Millis(i64),
    Text(String),
}

impl RawTimestamp {
    pub fn to_millis(&self) -> Result<UnixMillis, RecordError> {
        match self {
            RawTimestamp::Millis(ms) => Ok(*ms),
            RawTimestamp::Text(text) => DateTime::parse_from_rfc3339(text)
                .map(|dt| dt.timestamp_millis())
                .map_err(|_| RecordError::InvalidDate(text.clone())),
        }
    }
}

/// A log event as it arrives on the wire, before normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawLogEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub date: Option<RawTimestamp>,
    #[serde(default)]
    pub message: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl RawLogEvent {
    pub fn from_json(payload: &str) -> Result<Self, RecordError> {
        serde_json::from_str(payload).map_err(RecordError::Json)
    }

    /// Scalar extra fields become metadata, sorted by name. Nulls, arrays and
    /// objects are dropped.
    pub fn into_record(self) -> Result<LogRecord, RecordError> {
        let id = match self.id {
            Some(id) if !id.is_empty() => id,
            _ => return Err(RecordError::MissingField("id")),
        };
        let timestamp = self
            .date
            .ok_or(RecordError::MissingField("date"))?
            .to_millis()?;

        let metadata = self
            .extra
            .into_iter()
            .filter_map(|(name, value)| scalar_to_string(value).map(|v| Metadata { name, value: v }))
            .collect();

        Ok(LogRecord {
            id,
            timestamp,
            message: self.message,
            metadata,
        })
    }
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

impl TryFrom<RawLogEvent> for LogRecord {
    type Error = RecordError;

    fn try_from(raw: RawLogEvent) -> Result<Self, Self::Error> {
        raw.into_record()
    }
}

#[cfg(test)]
mod tests {
    use super::RawLogEvent;
    use crate::RecordError;

    #[test]
    fn normalizes_iso_dates_and_sorts_metadata() {
        let raw = RawLogEvent::from_json(
            r#"{
                "id": "log-1",
                "date": "2024-03-01T10:00:00.250Z",
                "message": "\u001b[32mstarted\u001b[0m",
                "zone": "par",
                "instanceId": "inst-1",
                "port": 8080,
                "tags": ["a"],
                "nothing": null
            }"#,
        )
        .expect("parse raw event");
        let record = raw.into_record().expect("normalize");

        assert_eq!(record.id, "log-1");
        assert_eq!(record.timestamp, 1_709_287_200_250);
        assert_eq!(record.message, "\u{1b}[32mstarted\u{1b}[0m");
        let names: Vec<_> = record.metadata.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["instanceId", "port", "zone"]);
        assert_eq!(record.metadata_value("port"), Some("8080"));
        assert_eq!(record.instance_id(), Some("inst-1"));
    }

    #[test]
    fn accepts_epoch_millis() {
        let record = RawLogEvent::from_json(r#"{"id":"x","date":1700000000123,"message":"m"}"#)
            .and_then(RawLogEvent::into_record)
            .expect("normalize");
        assert_eq!(record.timestamp, 1_700_000_000_123);
        assert!(record.metadata.is_empty());
    }

    #[test]
    fn rejects_incomplete_events() {
        let missing_id = RawLogEvent::from_json(r#"{"date":1,"message":"m"}"#)
            .and_then(RawLogEvent::into_record)
            .expect_err("id is required");
        assert!(matches!(missing_id, RecordError::MissingField("id")));

        let bad_date = RawLogEvent::from_json(r#"{"id":"x","date":"yesterday"}"#)
            .and_then(RawLogEvent::into_record)
            .expect_err("date must parse");
        assert!(bad_date.to_string().contains("yesterday"));

        assert!(matches!(
            RawLogEvent::from_json("{not json"),
            Err(RecordError::Json(_))
        ));
    }
}
