//! The log stream controller.
//!
//! The controller owns one logical subscription: it opens a [`Transport`],
//! consumes the [`TransportMessage`]s the host loop feeds back to it, keeps
//! the records in a bounded buffer and publishes every [`StreamState`]
//! transition on a `watch` channel. It is single-writer: the buffer and the
//! state are only mutated through `&mut self`, readers get shared borrows or
//! a watch receiver.
//!
//! User pause keeps the transport open. Records that arrive while paused are
//! counted and parked in a pending queue, then appended in arrival order on
//! resume.

use std::collections::VecDeque;

use cc_logs_core::proto::{
    ConnectionId, LogRecord, PauseReason, StateKind, StreamState, TransportEvent,
    TransportMessage,
};
use cc_logs_core::{Action, TransitionError};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::buffer::{Page, RecordBuffer, push_bounded};
use crate::config::{StreamConfig, StreamRequest};
use crate::errors::StreamError;
use crate::progress::{LoadingProgress, ProgressState, ReceiveOutcome};
use crate::selection::InstanceSelection;

/// The connection side the controller drives. Implementations deliver
/// events for `connection` back to the controller's owner, which passes them
/// to [`LogStreamController::handle`].
pub trait Transport {
    fn open(&mut self, connection: ConnectionId, request: &StreamRequest);

    /// Tears the connection down, cancelling pending timers. Must be
    /// idempotent.
    fn close(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Appended to the visible buffer.
    Buffered,
    /// Held until the user resumes.
    Pending,
    /// Dropped: the stream is not accepting records.
    Rejected,
}

pub struct LogStreamController<T: Transport> {
    transport: T,
    config: StreamConfig,
    state_tx: watch::Sender<StreamState>,
    progress: LoadingProgress,
    buffer: RecordBuffer,
    pending: VecDeque<LogRecord>,
    request: Option<StreamRequest>,
    /// Epoch whose transport events are still accepted.
    live_connection: Option<ConnectionId>,
    last_connection: ConnectionId,
    transport_open: bool,
    rejected: u64,
}

impl<T: Transport> LogStreamController<T> {
    pub fn new(transport: T, config: StreamConfig) -> Result<Self, StreamError> {
        config.validate()?;
        let (state_tx, _) = watch::channel(StreamState::Idle);
        Ok(Self {
            transport,
            config,
            state_tx,
            progress: LoadingProgress::new(config.overflow_limit),
            buffer: RecordBuffer::new(config.buffer_capacity),
            pending: VecDeque::new(),
            request: None,
            live_connection: None,
            last_connection: 0,
            transport_open: false,
            rejected: 0,
        })
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn state(&self) -> StreamState {
        self.state_tx.borrow().clone()
    }

    /// Receives every state transition. The current state is marked seen.
    pub fn subscribe(&self) -> watch::Receiver<StreamState> {
        self.state_tx.subscribe()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn request(&self) -> Option<&StreamRequest> {
        self.request.as_ref()
    }

    pub fn connection(&self) -> Option<ConnectionId> {
        self.live_connection
    }

    pub fn records(&self) -> impl DoubleEndedIterator<Item = &LogRecord> + ExactSizeIterator {
        self.buffer.iter()
    }

    pub fn page(&self, cursor: u64) -> Page<'_> {
        self.buffer.page(cursor)
    }

    pub fn filtered<'a>(
        &'a self,
        selection: &'a InstanceSelection,
    ) -> impl Iterator<Item = &'a LogRecord> + 'a {
        selection.filter(self.buffer.iter())
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Records dropped because the stream was not accepting them.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Opens a new connection epoch. Allowed from `idle`, `completed` and
    /// `error`; the previous epoch's records and progress are discarded.
    pub fn connect(&mut self, request: StreamRequest) -> Result<ConnectionId, StreamError> {
        let kind = self.kind();
        if !matches!(
            kind,
            StateKind::Idle | StateKind::Completed | StateKind::Error
        ) {
            return Err(TransitionError::new(Action::Connect, kind).into());
        }
        request.validate()?;

        self.teardown();
        self.clear_epoch();
        self.last_connection += 1;
        let connection = self.last_connection;
        self.live_connection = Some(connection);

        info!(
            connection,
            since = request.range.since,
            until = ?request.range.until,
            instances = request.instances.len(),
            "opening log stream"
        );
        self.request = Some(request.clone());
        self.set_state(StreamState::Connecting);
        self.transport.open(connection, &request);
        self.transport_open = true;
        Ok(connection)
    }

    /// Applies one transport event. Events from any other epoch than the
    /// live one are discarded.
    pub fn handle(&mut self, message: TransportMessage) {
        if self.live_connection != Some(message.connection) {
            debug!(
                connection = message.connection,
                live = ?self.live_connection,
                "dropping event from stale connection"
            );
            return;
        }
        match message.event {
            TransportEvent::Connected => self.on_connected(),
            TransportEvent::Log(record) => {
                self.on_record(record);
            }
            TransportEvent::Completed => self.on_completed(),
            TransportEvent::Error(reason) => self.on_error(&reason),
        }
    }

    fn on_connected(&mut self) {
        if self.kind() != StateKind::Connecting {
            warn!(state = %self.kind(), "ignoring duplicate connected event");
            return;
        }
        if self.start_progress() {
            self.set_state(StreamState::WaitingForFirstLog);
        }
    }

    /// Appends one record in arrival order.
    pub fn on_record(&mut self, record: LogRecord) -> RecordOutcome {
        let kind = self.kind();
        if kind == StateKind::Connecting {
            // a transport may skip the explicit connected signal
            if !self.start_progress() {
                return self.reject(kind);
            }
        } else if !matches!(
            kind,
            StateKind::WaitingForFirstLog | StateKind::Running | StateKind::PausedByUser
        ) {
            return self.reject(kind);
        }

        let outcome = match self.progress.receive(1, Some(record.timestamp)) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "record refused by progress tracker");
                return self.reject(kind);
            }
        };

        let placed = if kind == StateKind::PausedByUser {
            if push_bounded(&mut self.pending, self.config.buffer_capacity, record).is_some() {
                self.buffer.skip(1);
            }
            RecordOutcome::Pending
        } else {
            self.buffer.push(record);
            RecordOutcome::Buffered
        };

        match outcome {
            ReceiveOutcome::Accepted => {
                let progress = self.progress.progress();
                let overflowing = self.progress.overflowing();
                let next = if kind == StateKind::PausedByUser {
                    StreamState::Paused {
                        reason: PauseReason::User,
                        progress,
                        overflowing,
                    }
                } else {
                    StreamState::Running {
                        progress,
                        overflowing,
                    }
                };
                self.set_state(next);
            }
            ReceiveOutcome::Overflowed => {
                self.flush_pending();
                warn!(
                    limit = self.config.overflow_limit,
                    "log stream overflowed, pausing until reset"
                );
                self.teardown();
                self.set_state(StreamState::Paused {
                    reason: PauseReason::Overflow,
                    progress: self.progress.progress(),
                    overflowing: true,
                });
                // parked records were just flushed into the buffer
                return RecordOutcome::Buffered;
            }
        }
        placed
    }

    fn on_completed(&mut self) {
        let kind = self.kind();
        if !self.state().is_connected() {
            debug!(state = %kind, "ignoring completion");
            return;
        }
        if kind == StateKind::Connecting && !self.start_progress() {
            return;
        }
        if let Err(err) = self.progress.complete() {
            warn!(error = %err, "ignoring completion");
            return;
        }
        self.flush_pending();
        info!(records = self.progress.progress().value, "log stream completed");
        self.teardown();
        self.set_state(StreamState::Completed {
            progress: self.progress.progress(),
            overflowing: self.progress.overflowing(),
        });
    }

    fn on_error(&mut self, reason: &str) {
        error!(reason, state = %self.kind(), "log stream failed");
        self.teardown();
        self.set_state(StreamState::Error);
    }

    /// User-level pause, only from `running`.
    pub fn pause(&mut self) -> Result<(), TransitionError> {
        let kind = self.kind();
        if kind != StateKind::Running {
            return Err(TransitionError::new(Action::Pause, kind));
        }
        self.progress.pause_by_user()?;
        debug!("log stream paused by user");
        self.set_state(StreamState::Paused {
            reason: PauseReason::User,
            progress: self.progress.progress(),
            overflowing: self.progress.overflowing(),
        });
        Ok(())
    }

    /// Resumes a user pause and appends the parked records. Overflow pauses
    /// need `reset()` and a new `connect()` instead.
    pub fn resume(&mut self) -> Result<(), TransitionError> {
        let kind = self.kind();
        if kind != StateKind::PausedByUser {
            return Err(TransitionError::new(Action::Resume, kind));
        }
        self.progress.resume()?;
        let flushed = self.flush_pending();
        debug!(flushed, "log stream resumed");
        self.set_state(StreamState::Running {
            progress: self.progress.progress(),
            overflowing: self.progress.overflowing(),
        });
        Ok(())
    }

    /// Closes the transport. A live stream returns to `idle`, keeping its
    /// records readable; terminal states are left as they are. Idempotent.
    pub fn disconnect(&mut self) {
        self.teardown();
        self.live_connection = None;
        if self.state().is_connected() {
            info!("log stream disconnected");
            self.flush_pending();
            self.set_state(StreamState::Idle);
        }
    }

    /// Closes the transport and forgets everything about the current epoch.
    pub fn reset(&mut self) {
        self.teardown();
        self.live_connection = None;
        self.clear_epoch();
        self.request = None;
        self.set_state(StreamState::Idle);
    }

    fn kind(&self) -> StateKind {
        self.state_tx.borrow().kind()
    }

    fn start_progress(&mut self) -> bool {
        let Some(range) = self.request.as_ref().map(|r| r.range) else {
            return false;
        };
        match self.progress.start(range) {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "progress tracker not idle on connect");
                false
            }
        }
    }

    fn reject(&mut self, kind: StateKind) -> RecordOutcome {
        self.rejected += 1;
        debug!(state = %kind, "rejecting record");
        RecordOutcome::Rejected
    }

    fn flush_pending(&mut self) -> usize {
        let count = self.pending.len();
        while let Some(record) = self.pending.pop_front() {
            self.buffer.push(record);
        }
        count
    }

    /// Closes the transport. The epoch stays live so late events are still
    /// matched and rejected by state.
    fn teardown(&mut self) {
        if self.transport_open {
            self.transport_open = false;
            self.transport.close();
        }
    }

    fn clear_epoch(&mut self) {
        self.buffer.clear();
        self.pending.clear();
        self.progress.reset();
        self.rejected = 0;
        debug_assert_eq!(self.progress.state(), ProgressState::Idle);
    }

    fn set_state(&mut self, next: StreamState) {
        self.state_tx.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            debug!(from = %current.kind(), to = %next.kind(), "stream state changed");
            *current = next;
            true
        });
    }
}

impl<T: Transport> Drop for LogStreamController<T> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::{LogStreamController, RecordOutcome, Transport};
    use crate::config::{StreamConfig, StreamRequest};
    use crate::errors::StreamError;
    use crate::selection::InstanceSelection;
    use cc_logs_core::proto::{
        ConnectionId, LogRecord, PauseReason, StateKind, StreamRange, StreamState,
        TransportEvent, TransportMessage,
    };
    use cc_logs_core::Action;

    #[derive(Default)]
    struct FakeTransport {
        opened: Vec<ConnectionId>,
        closes: usize,
        open: bool,
    }

    impl Transport for FakeTransport {
        fn open(&mut self, connection: ConnectionId, _request: &StreamRequest) {
            self.opened.push(connection);
            self.open = true;
        }

        fn close(&mut self) {
            self.closes += 1;
            self.open = false;
        }
    }

    const T0: i64 = 1_700_000_000_000;

    fn controller(overflow_limit: u64, buffer_capacity: usize) -> LogStreamController<FakeTransport> {
        LogStreamController::new(
            FakeTransport::default(),
            StreamConfig {
                overflow_limit,
                buffer_capacity,
            },
        )
        .expect("valid config")
    }

    fn record(n: u64) -> LogRecord {
        LogRecord::new(format!("id-{n}"), T0 + n as i64, format!("line {n}"))
    }

    fn connected(ctl: &mut LogStreamController<FakeTransport>, range: StreamRange) -> ConnectionId {
        let connection = ctl.connect(StreamRequest::new(range)).expect("connect");
        ctl.handle(TransportMessage::new(connection, TransportEvent::Connected));
        connection
    }

    fn push(ctl: &mut LogStreamController<FakeTransport>, connection: ConnectionId, n: u64) {
        ctl.handle(TransportMessage::new(
            connection,
            TransportEvent::Log(record(n)),
        ));
    }

    fn ids(ctl: &LogStreamController<FakeTransport>) -> Vec<String> {
        ctl.records().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn connect_walks_through_the_lifecycle() {
        let mut ctl = controller(100, 100);
        let mut rx = ctl.subscribe();
        assert_eq!(ctl.state(), StreamState::Idle);

        let connection = ctl.connect(StreamRequest::new(StreamRange::live(T0))).expect("connect");
        assert_eq!(ctl.state(), StreamState::Connecting);
        assert_eq!(ctl.transport().opened, vec![connection]);
        assert!(rx.has_changed().expect("sender alive"));
        rx.mark_unchanged();

        ctl.handle(TransportMessage::new(connection, TransportEvent::Connected));
        assert_eq!(ctl.state(), StreamState::WaitingForFirstLog);

        push(&mut ctl, connection, 0);
        assert_eq!(ctl.state().kind(), StateKind::Running);
        assert!(rx.has_changed().expect("sender alive"));
    }

    #[test]
    fn scenario_overflow_then_reset_and_reconnect() {
        let mut ctl = controller(10_000, 20_000);
        let connection = connected(&mut ctl, StreamRange::live(T0));
        for n in 0..3 {
            push(&mut ctl, connection, n);
        }
        let state = ctl.state();
        assert_eq!(state.kind(), StateKind::Running);
        assert_eq!(state.progress().map(|p| p.value), Some(3));

        for n in 3..10_003 {
            push(&mut ctl, connection, n);
        }
        let state = ctl.state();
        assert_eq!(state.kind(), StateKind::PausedByOverflow);
        assert!(state.is_overflowing());
        assert_eq!(state.progress().map(|p| p.value), Some(10_001));
        assert_eq!(ctl.records().len(), 10_001);
        assert_eq!(ctl.rejected(), 2);
        assert!(!ctl.transport().open);

        let err = ctl.resume().expect_err("resume after overflow");
        assert_eq!(err.action, Action::Resume);
        assert_eq!(ctl.state(), state);

        ctl.reset();
        assert_eq!(ctl.state(), StreamState::Idle);
        let connection = connected(&mut ctl, StreamRange::live(T0));
        assert_eq!(ctl.state(), StreamState::WaitingForFirstLog);
        push(&mut ctl, connection, 0);
        assert_eq!(ctl.state().progress().map(|p| p.value), Some(1));
        assert!(!ctl.state().is_overflowing());
    }

    #[test]
    fn records_keep_arrival_order_and_evict_oldest() {
        let mut ctl = controller(1_000, 3);
        let connection = connected(&mut ctl, StreamRange::live(T0));
        for n in [5, 1, 4, 2, 3] {
            push(&mut ctl, connection, n);
        }
        assert_eq!(ids(&ctl), ["id-4", "id-2", "id-3"]);
        assert_eq!(ctl.state().progress().map(|p| p.value), Some(5));

        let page = ctl.page(0);
        assert_eq!(page.skipped, 2);
        assert_eq!(page.next_cursor, 5);
    }

    #[test]
    fn user_pause_parks_records_until_resume() {
        let mut ctl = controller(1_000, 100);
        let connection = connected(&mut ctl, StreamRange::live(T0));
        push(&mut ctl, connection, 0);
        ctl.pause().expect("pause");
        assert!(ctl.pause().is_err());

        assert_eq!(ctl.on_record(record(1)), RecordOutcome::Pending);
        push(&mut ctl, connection, 2);
        assert_eq!(ids(&ctl), ["id-0"]);
        assert_eq!(ctl.pending_len(), 2);
        match ctl.state() {
            StreamState::Paused {
                reason: PauseReason::User,
                progress,
                ..
            } => assert_eq!(progress.value, 3),
            other => panic!("unexpected state {other:?}"),
        }
        assert!(ctl.transport().open);

        ctl.resume().expect("resume");
        assert_eq!(ids(&ctl), ["id-0", "id-1", "id-2"]);
        assert_eq!(ctl.pending_len(), 0);
        assert_eq!(ctl.state().kind(), StateKind::Running);
    }

    #[test]
    fn pending_queue_drops_oldest_beyond_buffer_capacity() {
        let mut ctl = controller(1_000, 3);
        let connection = connected(&mut ctl, StreamRange::live(T0));
        push(&mut ctl, connection, 0);
        let cursor = ctl.page(0).next_cursor;
        ctl.pause().expect("pause");
        for n in 1..=4 {
            push(&mut ctl, connection, n);
        }
        assert_eq!(ctl.pending_len(), 3);
        assert_eq!(ids(&ctl), ["id-0"]);

        ctl.resume().expect("resume");
        assert_eq!(ids(&ctl), ["id-2", "id-3", "id-4"]);
        assert_eq!(ctl.state().progress().map(|p| p.value), Some(5));

        // id-0 evicted from the buffer, id-1 dropped while parked
        let page = ctl.page(0);
        assert_eq!(page.skipped, 2);
        assert_eq!(page.next_cursor, 5);

        let page = ctl.page(cursor);
        assert_eq!(page.skipped, 1);
        assert_eq!(page.records.len(), 3);
    }

    #[test]
    fn overflow_while_paused_reports_the_record_as_buffered() {
        let mut ctl = controller(2, 100);
        let connection = connected(&mut ctl, StreamRange::live(T0));
        push(&mut ctl, connection, 0);
        ctl.pause().expect("pause");
        assert_eq!(ctl.on_record(record(1)), RecordOutcome::Pending);

        assert_eq!(ctl.on_record(record(2)), RecordOutcome::Buffered);
        assert_eq!(ctl.state().kind(), StateKind::PausedByOverflow);
        assert_eq!(ctl.pending_len(), 0);
        assert_eq!(ids(&ctl), ["id-0", "id-1", "id-2"]);
    }

    #[test]
    fn out_of_range_wire_timestamps_do_not_break_the_stream() {
        let mut ctl = controller(100, 100);
        let range = StreamRange::bounded(T0, T0 + 100_000);
        let connection = connected(&mut ctl, range);

        let early = LogRecord::new("min", i64::MIN, "early");
        assert_eq!(ctl.on_record(early), RecordOutcome::Buffered);
        assert_eq!(ctl.state().progress().and_then(|p| p.percent), Some(0.0));

        ctl.handle(TransportMessage::new(
            connection,
            TransportEvent::Log(LogRecord::new("max", i64::MAX, "late")),
        ));
        let progress = ctl.state().progress().expect("running");
        assert_eq!(progress.value, 2);
        assert_eq!(progress.percent, Some(100.0));
    }

    #[test]
    fn overflow_stays_set_through_pause_and_resume_attempts() {
        let mut ctl = controller(2, 100);
        let connection = connected(&mut ctl, StreamRange::live(T0));
        push(&mut ctl, connection, 0);
        ctl.pause().expect("pause");
        push(&mut ctl, connection, 1);
        push(&mut ctl, connection, 2);

        assert_eq!(ctl.state().kind(), StateKind::PausedByOverflow);
        assert_eq!(ids(&ctl), ["id-0", "id-1", "id-2"]);
        assert!(ctl.pause().is_err());
        assert!(ctl.resume().is_err());
        assert!(ctl.state().is_overflowing());
        assert_eq!(ctl.on_record(record(3)), RecordOutcome::Rejected);
    }

    #[test]
    fn bounded_range_completes_at_full_percent() {
        let mut ctl = controller(100, 100);
        let connection = connected(&mut ctl, StreamRange::bounded(T0, T0 + 10));
        push(&mut ctl, connection, 5);
        assert_eq!(ctl.state().progress().and_then(|p| p.percent), Some(50.0));

        ctl.handle(TransportMessage::new(connection, TransportEvent::Completed));
        match ctl.state() {
            StreamState::Completed {
                progress,
                overflowing,
            } => {
                assert_eq!(progress.value, 1);
                assert_eq!(progress.percent, Some(100.0));
                assert!(!overflowing);
            }
            other => panic!("unexpected state {other:?}"),
        }
        assert_eq!(ctl.transport().closes, 1);
        assert_eq!(ctl.on_record(record(6)), RecordOutcome::Rejected);
    }

    #[test]
    fn transport_error_is_terminal_until_reconnect() {
        let mut ctl = controller(100, 100);
        let connection = connected(&mut ctl, StreamRange::live(T0));
        push(&mut ctl, connection, 0);
        ctl.handle(TransportMessage::new(
            connection,
            TransportEvent::Error("connection reset".into()),
        ));
        assert_eq!(ctl.state(), StreamState::Error);
        assert!(ctl.resume().is_err());
        assert_eq!(ids(&ctl), ["id-0"]);

        let retry = ctl.connect(StreamRequest::new(StreamRange::live(T0))).expect("reconnect");
        assert_ne!(retry, connection);
        assert!(ctl.records().next().is_none());
    }

    #[test]
    fn late_completion_does_not_leave_error() {
        let mut ctl = controller(100, 100);
        let connection = connected(&mut ctl, StreamRange::live(T0));
        ctl.handle(TransportMessage::new(connection, TransportEvent::Error("boom".into())));
        ctl.handle(TransportMessage::new(connection, TransportEvent::Completed));
        assert_eq!(ctl.state(), StreamState::Error);
        assert_eq!(ctl.on_record(record(0)), RecordOutcome::Rejected);
    }

    #[test]
    fn stale_connection_events_are_ignored() {
        let mut ctl = controller(100, 100);
        let old = connected(&mut ctl, StreamRange::live(T0));
        ctl.reset();
        let new = ctl.connect(StreamRequest::new(StreamRange::live(T0))).expect("connect");

        push(&mut ctl, old, 0);
        ctl.handle(TransportMessage::new(old, TransportEvent::Error("late".into())));
        assert_eq!(ctl.state(), StreamState::Connecting);

        push(&mut ctl, new, 1);
        assert_eq!(ctl.state().kind(), StateKind::Running);
        assert_eq!(ids(&ctl), ["id-1"]);
    }

    #[test]
    fn connect_is_rejected_while_live() {
        let mut ctl = controller(100, 100);
        connected(&mut ctl, StreamRange::live(T0));
        let err = ctl
            .connect(StreamRequest::new(StreamRange::live(T0)))
            .expect_err("already connected");
        assert!(matches!(err, StreamError::Transition(_)));

        ctl.reset();
        let err = ctl
            .connect(StreamRequest::new(StreamRange::bounded(T0, T0)))
            .expect_err("inverted range");
        assert!(matches!(err, StreamError::Config(_)));
        assert_eq!(ctl.state(), StreamState::Idle);
    }

    #[test]
    fn disconnect_and_reset_are_idempotent() {
        let mut ctl = controller(100, 100);
        let connection = connected(&mut ctl, StreamRange::live(T0));
        push(&mut ctl, connection, 0);

        ctl.disconnect();
        ctl.disconnect();
        assert_eq!(ctl.state(), StreamState::Idle);
        assert_eq!(ctl.transport().closes, 1);
        assert_eq!(ids(&ctl), ["id-0"]);

        ctl.reset();
        ctl.reset();
        assert!(ctl.records().next().is_none());
        assert_eq!(ctl.transport().closes, 1);
    }

    #[test]
    fn records_before_connected_imply_connection() {
        let mut ctl = controller(100, 100);
        let connection = ctl.connect(StreamRequest::new(StreamRange::live(T0))).expect("connect");
        push(&mut ctl, connection, 0);
        assert_eq!(ctl.state().kind(), StateKind::Running);
        ctl.handle(TransportMessage::new(connection, TransportEvent::Connected));
        assert_eq!(ctl.state().kind(), StateKind::Running);
    }

    #[test]
    fn selection_filters_without_reordering() {
        let mut ctl = controller(100, 100);
        let connection = connected(&mut ctl, StreamRange::live(T0));
        for (n, instance) in [(0, "a"), (1, "b"), (2, "a")] {
            ctl.handle(TransportMessage::new(
                connection,
                TransportEvent::Log(record(n).with_metadata("instanceId", instance)),
            ));
        }
        let mut selection = InstanceSelection::all();
        selection.select("a");
        let ids: Vec<_> = ctl.filtered(&selection).map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["id-0", "id-2"]);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let result = LogStreamController::new(
            FakeTransport::default(),
            StreamConfig {
                overflow_limit: 10,
                buffer_capacity: 0,
            },
        );
        assert!(matches!(result, Err(StreamError::Config(_))));
    }
}
