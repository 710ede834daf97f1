use core::mem;
use core::time::Duration;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::*;

/// Tag carried by every timer, bumped whenever the status or the phase changes.
pub type Generation = u64;

/// Delay between a round ending and the automatic reset.
pub const RESET_DELAY: Duration = Duration::from_millis(3000);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerKind {
    CountdownTick,
    AutoReset,
}

/// Request to call [`Controller::fire`] with this value after `delay`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    pub kind: TimerKind,
    pub generation: Generation,
    pub delay: Duration,
}

/// What happens once a finished round has been shown for [`RESET_DELAY`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionMode {
    /// No host shell: start a fresh round.
    Standalone,
    /// Inside the host shell: report the result and go idle.
    Hosted,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReport {
    pub minigame: MinigameKind,
    pub success: bool,
}

/// Side-effect notifications, typically wired to sound playback.
pub trait Effects {
    fn on_win(&mut self) {}
    fn on_lose(&mut self) {}
    /// Any handled input, including the one that ends the round.
    fn on_key_press(&mut self) {}
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct NoEffects;

impl Effects for NoEffects {}

/// Wires player input, the countdown, and the round status of a single puzzle.
#[derive(Debug)]
pub struct Controller<P: Puzzle, E: Effects = NoEffects> {
    config: P::Config,
    mode: SessionMode,
    status: GameStatus,
    generation: Generation,
    countdown: Countdown,
    phases: Vec<Phase>,
    phase: usize,
    puzzle: Option<P>,
    rng: SmallRng,
    effects: E,
    timers: Vec<Timer>,
    reports: Vec<SessionReport>,
}

impl<P: Puzzle> Controller<P> {
    pub fn new(config: P::Config, mode: SessionMode, seed: u64) -> Self {
        Self::with_effects(config, mode, seed, NoEffects)
    }
}

impl<P: Puzzle, E: Effects> Controller<P, E> {
    pub fn with_effects(config: P::Config, mode: SessionMode, seed: u64, effects: E) -> Self {
        Self {
            config,
            mode,
            status: GameStatus::Idle,
            generation: 0,
            countdown: Countdown::new(),
            phases: Vec::new(),
            phase: 0,
            puzzle: None,
            rng: SmallRng::seed_from_u64(seed),
            effects,
            timers: Vec::new(),
            reports: Vec::new(),
        }
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn config(&self) -> &P::Config {
        &self.config
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    /// Index of the current phase within the round.
    pub fn phase(&self) -> usize {
        self.phase
    }

    /// Current board, `None` until the first round starts.
    pub fn puzzle(&self) -> Option<&P> {
        self.puzzle.as_ref()
    }

    pub fn effects(&self) -> &E {
        &self.effects
    }

    pub fn effects_mut(&mut self) -> &mut E {
        &mut self.effects
    }

    /// Timers scheduled since the last call.
    pub fn drain_timers(&mut self) -> Vec<Timer> {
        mem::take(&mut self.timers)
    }

    /// Results to hand over to the host shell since the last call.
    pub fn drain_reports(&mut self) -> Vec<SessionReport> {
        mem::take(&mut self.reports)
    }

    /// Starts a round from the idle or resetting state.
    pub fn start(&mut self) -> Result<()> {
        self.set_status(GameStatus::Running)
    }

    /// Replaces the configuration and restarts right away with a fresh board.
    pub fn configure(&mut self, config: P::Config) {
        self.config = config;
        self.change_status(GameStatus::Resetting);
        self.begin_round();
    }

    /// Handles a `playMinigame` request, ignoring requests for other minigames.
    pub fn handle_play(&mut self, minigame: MinigameKind, data: &Value) -> bool {
        if minigame != P::KIND {
            log::trace!("Ignoring play request for {minigame}, this is {}", P::KIND);
            return false;
        }
        self.configure(P::Config::from_payload(data));
        true
    }

    pub fn set_status(&mut self, status: GameStatus) -> Result<()> {
        if !self.status.can_transition_to(status) {
            return Err(GameError::InvalidTransition {
                from: self.status,
                to: status,
            });
        }

        match status {
            GameStatus::Running => self.begin_round(),
            GameStatus::Won => self.finish(Verdict::Won),
            GameStatus::Lost => self.finish(Verdict::Lost),
            GameStatus::Resetting => {
                self.countdown.freeze();
                self.change_status(GameStatus::Resetting);
                self.schedule(TimerKind::AutoReset, RESET_DELAY);
            }
            GameStatus::Idle => {
                self.countdown.freeze();
                self.change_status(GameStatus::Idle);
            }
        }
        Ok(())
    }

    /// Applies a player action; input is dropped unless the round is running.
    pub fn act(&mut self, action: P::Action, now: Timestamp) -> Result<MoveOutcome> {
        if !self.status.is_running() {
            log::trace!("Dropping input while {:?}", self.status);
            return Ok(MoveOutcome::NoChange);
        }
        let Some(puzzle) = self.puzzle.as_mut() else {
            return Ok(MoveOutcome::NoChange);
        };

        let outcome = puzzle.apply(action, now, &mut self.rng)?;
        if outcome.has_update() {
            self.effects.on_key_press();
        }
        if let Some(verdict) = outcome.verdict() {
            self.finish(verdict);
        }
        Ok(outcome)
    }

    /// Runs a timer previously handed out by [`Self::drain_timers`].
    pub fn fire(&mut self, timer: Timer) {
        if timer.generation != self.generation {
            log::trace!(
                "Dropping stale {:?} from generation {}, now at {}",
                timer.kind,
                timer.generation,
                self.generation
            );
            return;
        }

        match timer.kind {
            TimerKind::CountdownTick => self.tick(),
            TimerKind::AutoReset => self.auto_reset(),
        }
    }

    fn tick(&mut self) {
        match self.countdown.tick() {
            TickOutcome::Idle => {}
            TickOutcome::Ticked(remaining) => {
                log::trace!("{} remaining {:?}", P::KIND, remaining);
                self.schedule(TimerKind::CountdownTick, self.countdown.interval());
            }
            TickOutcome::Expired(Expiry::NextPhase) if self.phase + 1 < self.phases.len() => {
                self.phase += 1;
                self.generation += 1;
                log::debug!("{} entering phase {}", P::KIND, self.phase);
                self.start_phase();
            }
            TickOutcome::Expired(_) => {
                log::debug!("Lose: {} ran out of time", P::KIND);
                self.finish(Verdict::Lost);
            }
        }
    }

    fn auto_reset(&mut self) {
        let verdict = self.status.verdict();
        self.change_status(GameStatus::Resetting);

        match (self.mode, verdict) {
            (SessionMode::Standalone, _) | (SessionMode::Hosted, None) => self.begin_round(),
            (SessionMode::Hosted, Some(verdict)) => {
                let success = verdict.is_success();
                log::debug!("Reporting {} finished, success: {}", P::KIND, success);
                self.reports.push(SessionReport {
                    minigame: P::KIND,
                    success,
                });
                self.change_status(GameStatus::Idle);
            }
        }
    }

    fn begin_round(&mut self) {
        log::debug!("Reset game: {}", P::KIND);
        self.puzzle = Some(P::generate(&self.config, &mut self.rng));
        self.phases = P::phases(&self.config);
        self.phase = 0;
        self.change_status(GameStatus::Running);
        self.start_phase();
    }

    fn start_phase(&mut self) {
        if let Some(puzzle) = self.puzzle.as_mut() {
            puzzle.begin_phase(self.phase, &mut self.rng);
        }

        match self.phases.get(self.phase).copied() {
            Some(phase) => {
                self.countdown
                    .start(phase.duration, phase.interval, phase.expiry);
                self.schedule(TimerKind::CountdownTick, phase.interval);
            }
            None => self.countdown.reset(),
        }
    }

    fn finish(&mut self, verdict: Verdict) {
        if self.status.is_finished() {
            return;
        }

        match verdict {
            Verdict::Won => {
                log::debug!("Win: {}", P::KIND);
                self.effects.on_win();
            }
            Verdict::Lost => {
                log::debug!("Lose: {}", P::KIND);
                self.effects.on_lose();
            }
        }
        self.countdown.freeze();
        self.change_status(verdict.status());
        self.schedule(TimerKind::AutoReset, RESET_DELAY);
    }

    fn change_status(&mut self, status: GameStatus) {
        log::trace!("{} status {:?} -> {:?}", P::KIND, self.status, status);
        self.status = status;
        self.generation += 1;
    }

    fn schedule(&mut self, kind: TimerKind, delay: Duration) {
        self.timers.push(Timer {
            kind,
            generation: self.generation,
            delay,
        });
    }
}
