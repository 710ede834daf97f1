use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chopping::{Chopping, ChoppingAction};
use crate::color_picker::{ColorPicker, ColorPickerAction};
use crate::laptop_terminal::{LaptopTerminal, LaptopTerminalAction};
use crate::lockpick::{Lockpick, LockpickAction};
use crate::pincracker::{Pincracker, PincrackerAction};
use crate::roof_running::{RoofRunning, RoofRunningAction};
use crate::thermite::{Thermite, ThermiteAction};
use crate::word_memory::{WordMemory, WordMemoryAction};
use crate::*;

/// Player input for any minigame, tagged with the minigame it belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "minigame", content = "action", rename_all = "kebab-case")]
pub enum PlayerAction {
    Chopping(ChoppingAction),
    Pincracker(PincrackerAction),
    RoofRunning(RoofRunningAction),
    Lockpick(LockpickAction),
    Thermite(ThermiteAction),
    LaptopTerminal(LaptopTerminalAction),
    WordMemory(WordMemoryAction),
    ColorPicker(ColorPickerAction),
}

impl PlayerAction {
    pub const fn kind(&self) -> MinigameKind {
        match self {
            Self::Chopping(_) => MinigameKind::Chopping,
            Self::Pincracker(_) => MinigameKind::Pincracker,
            Self::RoofRunning(_) => MinigameKind::RoofRunning,
            Self::Lockpick(_) => MinigameKind::Lockpick,
            Self::Thermite(_) => MinigameKind::Thermite,
            Self::LaptopTerminal(_) => MinigameKind::LaptopTerminal,
            Self::WordMemory(_) => MinigameKind::WordMemory,
            Self::ColorPicker(_) => MinigameKind::ColorPicker,
        }
    }
}

/// A [`Controller`] for whichever minigame the host asked for.
#[derive(Debug)]
pub enum AnyController<E: Effects = NoEffects> {
    Chopping(Controller<Chopping, E>),
    Pincracker(Controller<Pincracker, E>),
    RoofRunning(Controller<RoofRunning, E>),
    Lockpick(Controller<Lockpick, E>),
    Thermite(Controller<Thermite, E>),
    LaptopTerminal(Controller<LaptopTerminal, E>),
    WordMemory(Controller<WordMemory, E>),
    ColorPicker(Controller<ColorPicker, E>),
}

/// Runs `$body` with `$c` bound to the inner controller, whatever its puzzle.
macro_rules! with_controller {
    ($self:expr, $c:ident => $body:expr) => {
        match $self {
            AnyController::Chopping($c) => $body,
            AnyController::Pincracker($c) => $body,
            AnyController::RoofRunning($c) => $body,
            AnyController::Lockpick($c) => $body,
            AnyController::Thermite($c) => $body,
            AnyController::LaptopTerminal($c) => $body,
            AnyController::WordMemory($c) => $body,
            AnyController::ColorPicker($c) => $body,
        }
    };
}

impl<E: Effects> AnyController<E> {
    /// Idle controller for `kind` with its default configuration.
    pub fn new(kind: MinigameKind, mode: SessionMode, seed: u64, effects: E) -> Self {
        fn build<P: Puzzle, E: Effects>(mode: SessionMode, seed: u64, effects: E) -> Controller<P, E> {
            Controller::with_effects(P::Config::default(), mode, seed, effects)
        }

        match kind {
            MinigameKind::Chopping => Self::Chopping(build(mode, seed, effects)),
            MinigameKind::Pincracker => Self::Pincracker(build(mode, seed, effects)),
            MinigameKind::RoofRunning => Self::RoofRunning(build(mode, seed, effects)),
            MinigameKind::Lockpick => Self::Lockpick(build(mode, seed, effects)),
            MinigameKind::Thermite => Self::Thermite(build(mode, seed, effects)),
            MinigameKind::LaptopTerminal => Self::LaptopTerminal(build(mode, seed, effects)),
            MinigameKind::WordMemory => Self::WordMemory(build(mode, seed, effects)),
            MinigameKind::ColorPicker => Self::ColorPicker(build(mode, seed, effects)),
        }
    }

    /// Controller for a `playMinigame` request, already running with the requested settings.
    pub fn for_play(kind: MinigameKind, data: &Value, mode: SessionMode, seed: u64, effects: E) -> Self {
        let mut controller = Self::new(kind, mode, seed, effects);
        controller.handle_play(kind, data);
        controller
    }

    pub fn kind(&self) -> MinigameKind {
        fn kind_of<P: Puzzle, E: Effects>(_: &Controller<P, E>) -> MinigameKind {
            P::KIND
        }
        with_controller!(self, c => kind_of(c))
    }

    pub fn status(&self) -> GameStatus {
        with_controller!(self, c => c.status())
    }

    pub fn generation(&self) -> Generation {
        with_controller!(self, c => c.generation())
    }

    pub fn countdown(&self) -> &Countdown {
        with_controller!(self, c => c.countdown())
    }

    pub fn phase(&self) -> usize {
        with_controller!(self, c => c.phase())
    }

    pub fn effects(&self) -> &E {
        with_controller!(self, c => c.effects())
    }

    pub fn effects_mut(&mut self) -> &mut E {
        with_controller!(self, c => c.effects_mut())
    }

    pub fn start(&mut self) -> Result<()> {
        with_controller!(self, c => c.start())
    }

    pub fn set_status(&mut self, status: GameStatus) -> Result<()> {
        with_controller!(self, c => c.set_status(status))
    }

    pub fn handle_play(&mut self, minigame: MinigameKind, data: &Value) -> bool {
        with_controller!(self, c => c.handle_play(minigame, data))
    }

    /// Forwards `action` to the controller, rejecting actions meant for another minigame.
    pub fn act(&mut self, action: PlayerAction, now: Timestamp) -> Result<MoveOutcome> {
        match (self, action) {
            (Self::Chopping(c), PlayerAction::Chopping(a)) => c.act(a, now),
            (Self::Pincracker(c), PlayerAction::Pincracker(a)) => c.act(a, now),
            (Self::RoofRunning(c), PlayerAction::RoofRunning(a)) => c.act(a, now),
            (Self::Lockpick(c), PlayerAction::Lockpick(a)) => c.act(a, now),
            (Self::Thermite(c), PlayerAction::Thermite(a)) => c.act(a, now),
            (Self::LaptopTerminal(c), PlayerAction::LaptopTerminal(a)) => c.act(a, now),
            (Self::WordMemory(c), PlayerAction::WordMemory(a)) => c.act(a, now),
            (Self::ColorPicker(c), PlayerAction::ColorPicker(a)) => c.act(a, now),
            (controller, action) => {
                log::warn!("Rejecting {} input for {}", action.kind(), controller.kind());
                Err(GameError::ActionMismatch(controller.kind()))
            }
        }
    }

    pub fn fire(&mut self, timer: Timer) {
        with_controller!(self, c => c.fire(timer))
    }

    pub fn drain_timers(&mut self) -> Vec<Timer> {
        with_controller!(self, c => c.drain_timers())
    }

    pub fn drain_reports(&mut self) -> Vec<SessionReport> {
        with_controller!(self, c => c.drain_reports())
    }

    /// Current board as JSON for a renderer, `null` before the first round.
    pub fn board(&self) -> serde_json::Result<Value> {
        fn to_json<P: Puzzle + Serialize, E: Effects>(c: &Controller<P, E>) -> serde_json::Result<Value> {
            serde_json::to_value(c.puzzle())
        }
        with_controller!(self, c => to_json(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lockpick::LockpickConfig;
    use serde_json::json;

    #[test]
    fn actions_use_tagged_representation() {
        let action: PlayerAction = serde_json::from_value(json!({
            "minigame": "roof-running",
            "action": { "Click": [1, 2] },
        }))
        .unwrap();

        assert_eq!(action, PlayerAction::RoofRunning(RoofRunningAction::Click((1, 2))));
        assert_eq!(action.kind(), MinigameKind::RoofRunning);

        let unit: PlayerAction =
            serde_json::from_value(json!({ "minigame": "word-memory", "action": "Seen" })).unwrap();
        assert_eq!(unit, PlayerAction::WordMemory(WordMemoryAction::Seen));
    }

    #[test]
    fn play_request_starts_requested_minigame() {
        for kind in MinigameKind::ALL {
            let controller = AnyController::for_play(kind, &json!({}), SessionMode::Hosted, 1, NoEffects);

            assert_eq!(controller.kind(), kind);
            assert_eq!(controller.status(), GameStatus::Running);
            assert_ne!(controller.board().unwrap(), Value::Null);
        }
    }

    #[test]
    fn payload_reaches_the_puzzle() {
        let controller = AnyController::for_play(
            MinigameKind::Lockpick,
            &json!({ "levels": 2, "timer": 12 }),
            SessionMode::Standalone,
            2,
            NoEffects,
        );

        let AnyController::Lockpick(inner) = &controller else {
            panic!("expected lockpick, got {}", controller.kind());
        };
        assert_eq!(inner.config(), &LockpickConfig::new("Lockpick", 2, 12, Default::default()));
        assert_eq!(inner.puzzle().unwrap().rings().len(), 2);
    }

    #[test]
    fn mismatched_action_is_rejected() {
        let mut controller =
            AnyController::for_play(MinigameKind::Chopping, &json!({}), SessionMode::Hosted, 3, NoEffects);

        assert_eq!(
            controller.act(PlayerAction::Lockpick(LockpickAction::Unlock), 0),
            Err(GameError::ActionMismatch(MinigameKind::Chopping))
        );
        assert_eq!(controller.status(), GameStatus::Running);
    }

    #[test]
    fn idle_controller_has_no_board() {
        let controller = AnyController::new(MinigameKind::Thermite, SessionMode::Hosted, 4, NoEffects);

        assert_eq!(controller.status(), GameStatus::Idle);
        assert_eq!(controller.board().unwrap(), Value::Null);
        assert_eq!(controller.countdown().duration(), core::time::Duration::ZERO);
    }
}
