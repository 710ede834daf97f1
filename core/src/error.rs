use thiserror::Error;

use crate::{GameStatus, MinigameKind};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Board shape does not match declared size")]
    InvalidBoardShape,
    #[error("Round already ended, no new moves are accepted")]
    AlreadyEnded,
    #[error("Unknown game status {0}")]
    UnknownStatus(u8),
    #[error("Cannot go from {from:?} to {to:?}")]
    InvalidTransition { from: GameStatus, to: GameStatus },
    #[error("Unknown minigame {0:?}")]
    UnknownMinigame(String),
    #[error("Action does not belong to {0}")]
    ActionMismatch(MinigameKind),
}

pub type Result<T> = core::result::Result<T, GameError>;
