mod errors;
pub mod proto;

pub use errors::{Action, RecordError, TransitionError};
