use serde::{Deserialize, Serialize};

use super::{ConnectionId, LogRecord};

/// Lifecycle signals delivered by a transport, one at a time, in arrival order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum TransportEvent {
    Connected,
    Log(LogRecord),
    Completed,
    Error(String),
}

/// A transport event tagged with the connection that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportMessage {
    pub connection: ConnectionId,
    pub event: TransportEvent,
}

impl TransportMessage {
    pub fn new(connection: ConnectionId, event: TransportEvent) -> Self {
        Self { connection, event }
    }
}
