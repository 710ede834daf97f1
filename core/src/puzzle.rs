use core::time::Duration;
use rand::Rng;

use crate::*;

/// One timed segment of a round.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Phase {
    pub duration: Duration,
    pub interval: Duration,
    pub expiry: Expiry,
}

impl Phase {
    /// A phase that ends the round as lost when it runs out, ticking once per second.
    pub const fn timed(duration: Duration) -> Self {
        Self {
            duration,
            interval: Countdown::DEFAULT_INTERVAL,
            expiry: Expiry::Lose,
        }
    }

    pub const fn with_interval(self, interval: Duration) -> Self {
        Self { interval, ..self }
    }

    pub const fn then_next(self) -> Self {
        Self {
            expiry: Expiry::NextPhase,
            ..self
        }
    }
}

/// Outcome of applying a player action to a board.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    NoChange,
    Accepted,
    Won,
    Lost,
}

impl MoveOutcome {
    /// Whether this outcome could have caused an update to the board
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }

    pub const fn verdict(self) -> Option<Verdict> {
        match self {
            Self::Won => Some(Verdict::Won),
            Self::Lost => Some(Verdict::Lost),
            _ => None,
        }
    }
}

impl From<Verdict> for MoveOutcome {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Won => Self::Won,
            Verdict::Lost => Self::Lost,
        }
    }
}

/// Board state plus the rules that generate and mutate it.
pub trait Puzzle: Sized {
    type Config: Clone + Default + FromPayload;
    type Action;

    const KIND: MinigameKind;

    fn generate<R: Rng>(config: &Self::Config, rng: &mut R) -> Self;

    /// Timed phases of one round, in order.
    fn phases(config: &Self::Config) -> Vec<Phase>;

    /// Called whenever a phase starts, including the first one.
    fn begin_phase<R: Rng>(&mut self, _phase: usize, _rng: &mut R) {}

    fn apply<R: Rng>(&mut self, action: Self::Action, now: Timestamp, rng: &mut R)
    -> Result<MoveOutcome>;

    fn verdict(&self) -> Option<Verdict>;
}

/// Rejects moves once a board has reached a verdict.
pub(crate) fn check_open(verdict: Option<Verdict>) -> Result<()> {
    match verdict {
        Some(_) => Err(GameError::AlreadyEnded),
        None => Ok(()),
    }
}

pub(crate) fn seconds(secs: u32) -> Duration {
    Duration::from_secs(secs.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_terminal_outcomes_carry_a_verdict() {
        use MoveOutcome::*;

        assert_eq!(Won.verdict(), Some(Verdict::Won));
        assert_eq!(Lost.verdict(), Some(Verdict::Lost));
        assert_eq!(Accepted.verdict(), None);
        assert!(!NoChange.has_update());
        assert_eq!(MoveOutcome::from(Verdict::Lost), Lost);
    }

    #[test]
    fn phase_builders_keep_duration() {
        let phase = Phase::timed(seconds(12))
            .with_interval(Duration::from_millis(100))
            .then_next();

        assert_eq!(phase.duration, Duration::from_secs(12));
        assert_eq!(phase.interval, Duration::from_millis(100));
        assert_eq!(phase.expiry, Expiry::NextPhase);
    }
}
