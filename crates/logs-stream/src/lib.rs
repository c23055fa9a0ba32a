mod buffer;
mod config;
mod controller;
mod errors;
mod progress;
mod selection;

pub use buffer::{Page, RecordBuffer};
pub use config::{DEFAULT_BUFFER_CAPACITY, DEFAULT_OVERFLOW_LIMIT, StreamConfig, StreamRequest};
pub use controller::{LogStreamController, RecordOutcome, Transport};
pub use errors::{ConfigError, StreamError};
pub use progress::{LoadingProgress, ProgressState, ReceiveOutcome};
pub use selection::InstanceSelection;
