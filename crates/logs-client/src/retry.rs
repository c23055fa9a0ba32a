use rand::Rng;
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;
use url::Url;

use crate::errors::ClientError;

const OPEN_MAX_RETRIES: usize = 3;
const BACKOFF_START: Duration = Duration::from_millis(250);
const BACKOFF_CAP: Duration = Duration::from_secs(3);

/// Sends the initial stream request, retrying transient failures. Once a
/// response is returned the stream is established and no longer retried.
pub async fn open_with_retries(
    client: &Client,
    url: &Url,
    headers: &HeaderMap,
) -> Result<reqwest::Response, ClientError> {
    let mut backoff = BACKOFF_START;
    for attempt in 0..=OPEN_MAX_RETRIES {
        match client.get(url.clone()).headers(headers.clone()).send().await {
            Ok(response) => {
                let status = response.status();
                // only a 2xx hands back the response; its body is the event
                // stream, so error bodies are read here and never streamed
                if status.is_success() {
                    return Ok(response);
                }
                if retryable_status(status) && attempt < OPEN_MAX_RETRIES {
                    warn!(%status, attempt, "logs stream request failed, retrying");
                    sleep(with_jitter(backoff)).await;
                    backoff = (backoff * 2).min(BACKOFF_CAP);
                    continue;
                }
                let body = response.text().await.unwrap_or_default();
                return Err(ClientError::Status { status, body });
            }
            Err(err) => {
                if retryable_error(&err) && attempt < OPEN_MAX_RETRIES {
                    warn!(error = %err, attempt, "logs stream request failed, retrying");
                    sleep(with_jitter(backoff)).await;
                    backoff = (backoff * 2).min(BACKOFF_CAP);
                    continue;
                }
                return Err(ClientError::Request(err));
            }
        }
    }

    Err(ClientError::Status {
        status: StatusCode::REQUEST_TIMEOUT,
        body: "Request failed after retries.".to_string(),
    })
}

pub(crate) fn retryable_status(status: StatusCode) -> bool {
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

fn retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

fn with_jitter(base: Duration) -> Duration {
    let jitter_ms = rand::thread_rng().gen_range(0..180);
    base + Duration::from_millis(jitter_ms)
}
