use cc_logs_core::proto::{
    ConnectionId, LogRecord, RawLogEvent, StreamRange, TransportEvent, TransportMessage, UnixMillis,
};
use cc_logs_stream::{StreamRequest, Transport};
use chrono::{DateTime, SecondsFormat, Utc};
use futures_util::StreamExt;
use reqwest::{header, Client};
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use crate::errors::ClientError;
use crate::retry::open_with_retries;
use crate::sse::{SseFrame, SseParser};

/// SSE event name carrying one log line.
pub const LOGS_EVENT_NAME: &str = "APPLICATION_LOG";
const END_OF_STREAM_EVENT: &str = "END_OF_STREAM";
const HEARTBEAT_EVENT: &str = "HEARTBEAT";

/// Streams logs over HTTP server-sent events.
///
/// Each `open()` spawns one task on the runtime captured at construction;
/// its events are sent, tagged with the connection id, to the channel the
/// transport was created with. `close()` aborts the task, which also cancels
/// a pending retry sleep.
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
    headers: header::HeaderMap,
    events: UnboundedSender<TransportMessage>,
    runtime: Handle,
    task: Option<JoinHandle<()>>,
}

impl HttpTransport {
    pub fn new(endpoint: &str, events: UnboundedSender<TransportMessage>) -> Result<Self, ClientError> {
        let runtime = Handle::try_current().map_err(|_| ClientError::NoRuntime)?;
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("text/event-stream"),
        );
        Ok(Self {
            client: Client::builder().build()?,
            endpoint: Url::parse(endpoint)?,
            headers,
            events,
            runtime,
            task: None,
        })
    }

    pub fn with_token(mut self, token: &str) -> Result<Self, ClientError> {
        let value = header::HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| ClientError::InvalidToken)?;
        self.headers.insert(header::AUTHORIZATION, value);
        Ok(self)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn is_open(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Transport for HttpTransport {
    fn open(&mut self, connection: ConnectionId, request: &StreamRequest) {
        self.close();
        let url = stream_url(&self.endpoint, request);
        info!(connection, %url, "connecting to logs stream");
        let task = self.runtime.spawn(run_stream(
            self.client.clone(),
            url,
            self.headers.clone(),
            request.range,
            Sink {
                connection,
                events: self.events.clone(),
            },
        ));
        self.task = Some(task);
    }

    fn close(&mut self) {
        if let Some(task) = self.task.take() {
            debug!("closing logs stream");
            task.abort();
        }
    }
}

impl Drop for HttpTransport {
    fn drop(&mut self) {
        self.close();
    }
}

struct Sink {
    connection: ConnectionId,
    events: UnboundedSender<TransportMessage>,
}

impl Sink {
    /// False once the controller side is gone.
    fn send(&self, event: TransportEvent) -> bool {
        self.events
            .send(TransportMessage::new(self.connection, event))
            .is_ok()
    }
}

async fn run_stream(
    client: Client,
    url: Url,
    headers: header::HeaderMap,
    range: StreamRange,
    sink: Sink,
) {
    let response = match open_with_retries(&client, &url, &headers).await {
        Ok(response) => response,
        Err(err) => {
            sink.send(TransportEvent::Error(err.to_string()));
            return;
        }
    };
    if !sink.send(TransportEvent::Connected) {
        return;
    }

    let mut parser = SseParser::new();
    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        let bytes = match chunk {
            Ok(bytes) => bytes,
            Err(err) => {
                sink.send(TransportEvent::Error(format!("logs stream interrupted: {err}")));
                return;
            }
        };
        for frame in parser.push_chunk(&bytes) {
            match frame_to_event(frame) {
                Some(event @ TransportEvent::Completed) => {
                    sink.send(event);
                    return;
                }
                Some(event) => {
                    if !sink.send(event) {
                        return;
                    }
                }
                None => {}
            }
        }
    }

    // a live tail has no natural end
    if range.is_bounded() {
        sink.send(TransportEvent::Completed);
    } else {
        sink.send(TransportEvent::Error("logs stream closed by server".into()));
    }
}

/// Maps one SSE frame to a transport event. Malformed log payloads are
/// dropped with a warning so a single bad line never ends the stream.
pub(crate) fn frame_to_event(frame: SseFrame) -> Option<TransportEvent> {
    match frame.event.as_deref() {
        None | Some("message") | Some(LOGS_EVENT_NAME) => match parse_record(&frame.data) {
            Ok(record) => Some(TransportEvent::Log(record)),
            Err(err) => {
                warn!(error = %err, id = ?frame.id, "skipping malformed log event");
                None
            }
        },
        Some(END_OF_STREAM_EVENT) => Some(TransportEvent::Completed),
        Some(HEARTBEAT_EVENT) => None,
        Some(other) => {
            debug!(event = other, "ignoring unknown logs stream event");
            None
        }
    }
}

fn parse_record(data: &str) -> Result<LogRecord, cc_logs_core::RecordError> {
    RawLogEvent::from_json(data)?.into_record()
}

pub(crate) fn stream_url(endpoint: &Url, request: &StreamRequest) -> Url {
    let mut url = endpoint.clone();
    {
        let mut query = url.query_pairs_mut();
        if let Some(since) = iso_date(request.range.since) {
            query.append_pair("since", &since);
        }
        if let Some(until) = request.range.until.and_then(iso_date) {
            query.append_pair("until", &until);
        }
        for instance in &request.instances {
            query.append_pair("instanceId", instance);
        }
    }
    url
}

fn iso_date(ms: UnixMillis) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(ms).map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}
