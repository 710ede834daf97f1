use core::time::Duration;
use serde::{Deserialize, Serialize};

/// What the owner of a countdown should do once it runs out.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expiry {
    /// Timing out is a failure.
    Lose,
    /// Timing out moves the round to its next phase.
    NextPhase,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
enum RunState {
    Stopped,
    Running,
    Frozen,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The countdown is not running, nothing changed.
    Idle,
    Ticked(Duration),
    Expired(Expiry),
}

/// Remaining-time counter decremented by a fixed interval on each tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Countdown {
    duration: Duration,
    remaining: Duration,
    interval: Duration,
    expiry: Expiry,
    state: RunState,
}

impl Countdown {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);

    pub fn new() -> Self {
        Self {
            duration: Duration::ZERO,
            remaining: Duration::ZERO,
            interval: Self::DEFAULT_INTERVAL,
            expiry: Expiry::Lose,
            state: RunState::Stopped,
        }
    }

    pub fn start(&mut self, duration: Duration, interval: Duration, expiry: Expiry) {
        self.duration = duration;
        self.remaining = duration;
        self.interval = interval.max(Duration::from_millis(1));
        self.expiry = expiry;
        self.state = RunState::Running;
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !matches!(self.state, RunState::Running) {
            return TickOutcome::Idle;
        }

        self.remaining = self.remaining.saturating_sub(self.interval);
        if self.remaining.is_zero() {
            self.state = RunState::Stopped;
            TickOutcome::Expired(self.expiry)
        } else {
            TickOutcome::Ticked(self.remaining)
        }
    }

    /// Stops ticking without touching the remaining time.
    pub fn freeze(&mut self) {
        if matches!(self.state, RunState::Running) {
            self.state = RunState::Frozen;
        }
    }

    pub fn reset(&mut self) {
        self.remaining = self.duration;
        self.state = RunState::Stopped;
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, RunState::Running)
    }

    pub fn is_frozen(&self) -> bool {
        matches!(self.state, RunState::Frozen)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Elapsed share of the duration in `0.0..=1.0`, for a timer bar.
    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 0.0;
        }
        let elapsed = self.duration.saturating_sub(self.remaining);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new()
    }
}
