use serde::{Deserialize, Serialize};

use crate::*;

/// Lifecycle of a round, shared by every minigame.
///
/// Valid transitions:
/// - Idle -> Running
/// - Resetting -> Running
/// - Running -> Lost
/// - Running -> Won
/// - any -> Resetting
/// - any -> Idle
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum GameStatus {
    #[default]
    Idle = 0,
    Running = 1,
    Lost = 2,
    Won = 3,
    Resetting = 4,
}

impl GameStatus {
    /// Only a running round accepts player input.
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }

    pub const fn verdict(self) -> Option<Verdict> {
        match self {
            Self::Won => Some(Verdict::Won),
            Self::Lost => Some(Verdict::Lost),
            _ => None,
        }
    }

    pub const fn can_transition_to(self, next: GameStatus) -> bool {
        use GameStatus::*;
        match (self, next) {
            (_, Idle) => true,
            (_, Resetting) => true,
            (Idle | Resetting, Running) => true,
            (Running, Lost | Won) => true,
            _ => false,
        }
    }
}

impl From<GameStatus> for u8 {
    fn from(status: GameStatus) -> Self {
        status as u8
    }
}

impl TryFrom<u8> for GameStatus {
    type Error = GameError;

    fn try_from(code: u8) -> Result<Self> {
        use GameStatus::*;
        match code {
            0 => Ok(Idle),
            1 => Ok(Running),
            2 => Ok(Lost),
            3 => Ok(Won),
            4 => Ok(Resetting),
            _ => Err(GameError::UnknownStatus(code)),
        }
    }
}

/// Terminal outcome of a round.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Won,
    Lost,
}

impl Verdict {
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Won)
    }

    pub const fn status(self) -> GameStatus {
        match self {
            Self::Won => GameStatus::Won,
            Self::Lost => GameStatus::Lost,
        }
    }
}
