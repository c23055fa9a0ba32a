use anyhow::{Context, Result, bail};
use cc_logs_client::HttpTransport;
use cc_logs_core::proto::{
    StateKind, StreamRange, StreamState, TransportEvent, TransportMessage, UnixMillis,
};
use cc_logs_stream::{InstanceSelection, LogStreamController, StreamConfig, StreamRequest};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::render::Renderer;

const TOKEN_ENV: &str = "CC_LOGS_TOKEN";

pub struct TailOptions {
    pub url: String,
    pub since: UnixMillis,
    pub until: Option<UnixMillis>,
    pub instances: Vec<String>,
    pub stream: StreamConfig,
}

/// Keyboard commands read from stdin, one per line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Pause,
    Resume,
    Clear,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    match line.trim() {
        "p" | "pause" => Some(Command::Pause),
        "r" | "resume" => Some(Command::Resume),
        "c" | "clear" => Some(Command::Clear),
        "q" | "quit" => Some(Command::Quit),
        _ => None,
    }
}

pub async fn exec(options: TailOptions, renderer: Renderer) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<TransportMessage>();
    let mut transport = HttpTransport::new(&options.url, tx)?;
    if let Ok(token) = std::env::var(TOKEN_ENV) {
        transport = transport.with_token(&token)?;
    }

    let mut controller = LogStreamController::new(transport, options.stream)?;
    let range = StreamRange {
        since: options.since,
        until: options.until,
    };
    let request = StreamRequest::new(range).with_instances(options.instances.clone());
    let selection = InstanceSelection::all();

    controller
        .connect(request.clone())
        .context("Failed to open logs stream")?;
    let mut states = controller.subscribe();
    let mut status = StatusLine::default();
    let mut cursor = 0u64;
    let mut last_error: Option<String> = None;

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            message = rx.recv() => {
                let Some(message) = message else {
                    bail!("logs transport stopped unexpectedly");
                };
                if let TransportEvent::Error(reason) = &message.event {
                    last_error = Some(reason.clone());
                }
                controller.handle(message);
            }
            line = stdin.next_line(), if stdin_open => {
                match line? {
                    None => stdin_open = false,
                    Some(line) => match parse_command(&line) {
                        Some(Command::Pause) => report(controller.pause()),
                        Some(Command::Resume) => report(controller.resume()),
                        Some(Command::Clear) => {
                            controller.reset();
                            controller.connect(request.clone())?;
                            cursor = 0;
                        }
                        Some(Command::Quit) => {
                            controller.disconnect();
                            return Ok(());
                        }
                        None => eprintln!("commands: p(ause), r(esume), c(lear), q(uit)"),
                    },
                }
            }
            _ = tokio::signal::ctrl_c() => {
                controller.disconnect();
                return Ok(());
            }
        }

        let page = controller.page(cursor);
        if page.skipped > 0 {
            eprintln!("... {} records evicted before they were shown", page.skipped);
        }
        for record in selection.filter(page.records) {
            println!("{}", renderer.line(record));
        }
        cursor = page.next_cursor;

        let state = states.borrow_and_update().clone();
        status.update(&state);
        match state {
            StreamState::Completed { progress, .. } => {
                info!(records = progress.value, "query completed");
                return Ok(());
            }
            StreamState::Error => {
                bail!(
                    "logs stream failed: {}",
                    last_error.as_deref().unwrap_or("unknown transport error")
                );
            }
            _ => {}
        }
    }
}

fn report(result: Result<(), cc_logs_core::TransitionError>) {
    if let Err(err) = result {
        eprintln!("{err}");
    }
}

/// Prints a notice on stderr whenever the state kind changes.
#[derive(Default)]
struct StatusLine {
    last: Option<StateKind>,
}

impl StatusLine {
    fn update(&mut self, state: &StreamState) {
        let kind = state.kind();
        if self.last == Some(kind) {
            return;
        }
        self.last = Some(kind);
        debug!(state = %kind, "stream state");
        if let Some(message) = describe(state) {
            eprintln!("{message}");
        }
    }
}

fn describe(state: &StreamState) -> Option<String> {
    match state {
        StreamState::Connecting => Some("connecting...".into()),
        StreamState::WaitingForFirstLog => Some("connected, waiting for logs".into()),
        StreamState::Paused {
            reason: cc_logs_core::proto::PauseReason::User,
            progress,
            ..
        } => Some(format!("paused after {} records (r to resume)", progress.value)),
        StreamState::Paused { progress, .. } => Some(format!(
            "too many logs: stopped after {} records (c to clear and reconnect)",
            progress.value
        )),
        StreamState::Completed { progress, .. } => {
            Some(format!("done: {} records", progress.value))
        }
        StreamState::Idle | StreamState::Running { .. } | StreamState::Error => None,
    }
}
