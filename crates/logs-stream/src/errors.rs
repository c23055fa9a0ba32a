use cc_logs_core::TransitionError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("overflow limit must be greater than zero")]
    ZeroOverflowLimit,

    #[error("buffer capacity must be greater than zero")]
    ZeroBufferCapacity,

    #[error("range end {until} is not after its start {since}")]
    InvertedRange { since: i64, until: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("invalid stream configuration: {0}")]
    Config(#[from] ConfigError),
}
