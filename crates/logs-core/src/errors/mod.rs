use std::fmt;

use thiserror::Error;

use crate::proto::StateKind;

/// Operations that drive the stream state machines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Connect,
    Receive,
    Pause,
    Resume,
    Complete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::Start => "start",
            Action::Connect => "connect",
            Action::Receive => "receive",
            Action::Pause => "pause",
            Action::Resume => "resume",
            Action::Complete => "complete",
        };
        f.write_str(label)
    }
}

/// A state-machine call made from a state that does not allow it.
/// The state is left untouched when this is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot {action} while {from}")]
pub struct TransitionError {
    pub action: Action,
    pub from: StateKind,
}

impl TransitionError {
    pub fn new(action: Action, from: StateKind) -> Self {
        Self { action, from }
    }
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("log event is missing `{0}`")]
    MissingField(&'static str),

    #[error("invalid log date: {0}")]
    InvalidDate(String),

    #[error("invalid log event payload: {0}")]
    Json(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::{Action, TransitionError};
    use crate::proto::StateKind;

    #[test]
    fn transition_error_names_action_and_state() {
        let err = TransitionError::new(Action::Resume, StateKind::PausedByOverflow);
        assert_eq!(err.to_string(), "cannot resume while paused(overflow)");
    }
}
