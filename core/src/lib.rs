//! Rules engine for a suite of timed hacking minigames.
//!
//! Every minigame is a [`Puzzle`]: a generator for a random board plus an evaluator that turns
//! player actions into [`MoveOutcome`]s. A [`Controller`] runs one puzzle through the shared
//! round lifecycle ([`GameStatus`]) and its [`Countdown`], and [`AnyController`] picks the
//! puzzle from a host `playMinigame` request.

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

pub use config::*;
pub use controller::*;
pub use countdown::*;
pub use dispatch::*;
pub use error::*;
pub use minigame::*;
pub use puzzle::*;
pub use status::*;
pub use types::*;

mod config;
mod controller;
mod countdown;
mod dispatch;
mod error;
mod minigame;
mod puzzle;
mod status;
mod types;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MinigameKind {
    Chopping,
    Pincracker,
    RoofRunning,
    Lockpick,
    Thermite,
    LaptopTerminal,
    WordMemory,
    ColorPicker,
}

impl MinigameKind {
    pub const ALL: [MinigameKind; 8] = [
        Self::Chopping,
        Self::Pincracker,
        Self::RoofRunning,
        Self::Lockpick,
        Self::Thermite,
        Self::LaptopTerminal,
        Self::WordMemory,
        Self::ColorPicker,
    ];

    /// Name used by the host shell and for routing.
    pub const fn name(self) -> &'static str {
        use MinigameKind::*;
        match self {
            Chopping => "chopping",
            Pincracker => "pincracker",
            RoofRunning => "roof-running",
            Lockpick => "lockpick",
            Thermite => "thermite",
            LaptopTerminal => "laptop-terminal",
            WordMemory => "word-memory",
            ColorPicker => "color-picker",
        }
    }
}

impl fmt::Display for MinigameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MinigameKind {
    type Err = GameError;

    fn from_str(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| GameError::UnknownMinigame(name.to_owned()))
    }
}
