pub mod errors;
pub mod retry;
pub mod sse;
pub mod transport;

pub use errors::ClientError;
pub use sse::{SseFrame, SseParser, parse_frame};
pub use transport::{HttpTransport, LOGS_EVENT_NAME};
