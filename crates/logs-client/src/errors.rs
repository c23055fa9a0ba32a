use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid logs endpoint: {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid access token header")]
    InvalidToken,
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Request failed ({status}): {body}")]
    Status { status: StatusCode, body: String },
    #[error("a tokio runtime is required to open log streams")]
    NoRuntime,
}
