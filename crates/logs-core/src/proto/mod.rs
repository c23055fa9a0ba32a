mod event;
mod instance;
mod state;
mod types;
mod wire;

pub use event::{TransportEvent, TransportMessage};
pub use instance::{Deployment, GhostInstance, Instance, InstanceRef, InstanceState};
pub use state::{LogsProgressValue, PauseReason, StateKind, StreamState};
pub use types::{ConnectionId, InstanceId, LogRecord, Metadata, StreamRange, UnixMillis};
pub use wire::{RawLogEvent, RawTimestamp};
