use cc_logs_core::proto::{LogsProgressValue, PauseReason, StateKind, StreamRange, UnixMillis};
use cc_logs_core::{Action, TransitionError};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressState {
    Idle,
    Running,
    Paused(PauseReason),
    Completed,
}

impl ProgressState {
    fn kind(self) -> StateKind {
        match self {
            ProgressState::Idle => StateKind::Idle,
            ProgressState::Running => StateKind::Running,
            ProgressState::Paused(PauseReason::User) => StateKind::PausedByUser,
            ProgressState::Paused(PauseReason::Overflow) => StateKind::PausedByOverflow,
            ProgressState::Completed => StateKind::Completed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveOutcome {
    Accepted,
    /// This batch pushed the count past the limit; nothing more is accepted
    /// until `reset()`.
    Overflowed,
}

/// Counts received records for one connection and detects overflow.
#[derive(Debug, Clone)]
pub struct LoadingProgress {
    state: ProgressState,
    value: u64,
    percent: Option<f64>,
    overflowing: bool,
    overflow_limit: u64,
    range: Option<StreamRange>,
}

impl LoadingProgress {
    pub fn new(overflow_limit: u64) -> Self {
        Self {
            state: ProgressState::Idle,
            value: 0,
            percent: None,
            overflowing: false,
            overflow_limit,
            range: None,
        }
    }

    pub fn state(&self) -> ProgressState {
        self.state
    }

    pub fn overflowing(&self) -> bool {
        self.overflowing
    }

    pub fn progress(&self) -> LogsProgressValue {
        LogsProgressValue {
            value: self.value,
            percent: self.percent,
        }
    }

    pub fn start(&mut self, range: StreamRange) -> Result<(), TransitionError> {
        self.require(Action::Start, |s| s == ProgressState::Idle)?;
        self.state = ProgressState::Running;
        self.value = 0;
        self.overflowing = false;
        self.percent = range.is_bounded().then_some(0.0);
        self.range = Some(range);
        Ok(())
    }

    /// Counts `n` new records. `latest` is the timestamp of the newest one and
    /// moves `percent` forward on bounded ranges.
    pub fn receive(
        &mut self,
        n: u64,
        latest: Option<UnixMillis>,
    ) -> Result<ReceiveOutcome, TransitionError> {
        self.require(Action::Receive, |s| {
            matches!(
                s,
                ProgressState::Running | ProgressState::Paused(PauseReason::User)
            )
        })?;

        self.value += n;
        if let (Some(range), Some(at)) = (self.range, latest) {
            if let Some(percent) = range.percent_at(at) {
                self.percent = Some(self.percent.map_or(percent, |p| p.max(percent)));
            }
        }

        if self.value > self.overflow_limit {
            debug!(
                value = self.value,
                limit = self.overflow_limit,
                "loading progress overflowed"
            );
            self.overflowing = true;
            self.state = ProgressState::Paused(PauseReason::Overflow);
            return Ok(ReceiveOutcome::Overflowed);
        }
        Ok(ReceiveOutcome::Accepted)
    }

    pub fn pause_by_user(&mut self) -> Result<(), TransitionError> {
        self.require(Action::Pause, |s| s == ProgressState::Running)?;
        self.state = ProgressState::Paused(PauseReason::User);
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), TransitionError> {
        self.require(Action::Resume, |s| {
            s == ProgressState::Paused(PauseReason::User)
        })?;
        self.state = ProgressState::Running;
        Ok(())
    }

    pub fn complete(&mut self) -> Result<(), TransitionError> {
        self.require(Action::Complete, |s| {
            matches!(
                s,
                ProgressState::Running | ProgressState::Paused(PauseReason::User)
            )
        })?;
        self.state = ProgressState::Completed;
        if self.percent.is_some() {
            self.percent = Some(100.0);
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.overflow_limit);
    }

    fn require(
        &self,
        action: Action,
        allowed: impl Fn(ProgressState) -> bool,
    ) -> Result<(), TransitionError> {
        if allowed(self.state) {
            Ok(())
        } else {
            Err(TransitionError::new(action, self.state.kind()))
        }
    }
}
