//! Burn through a grid of charged cells by hopping between cells the last one attacks.
//!
//! Every cell carries a piece whose distance `d` decides which cells it attacks: those whose row
//! and column are congruent to its own modulo `d` and at most `d` away on both axes. Clicking a
//! highlighted cell drains its charge and highlights exactly the cells it attacks. Draining a
//! half-charged cell is a kill worth a point, and three kills in quick succession form a combo
//! worth a bonus that doubles with every combo.

use ndarray::Array2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::puzzle::{check_open, seconds};
use crate::*;

/// Longest gap between two kills that keeps a streak going, in milliseconds.
pub const COMBO_WINDOW: Timestamp = 1000;

/// Kills in a streak needed for a combo.
pub const COMBO_LENGTH: u32 = 3;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PieceType {
    Short,
    Medium,
    Long,
}

impl PieceType {
    pub const ALL: [PieceType; 3] = [Self::Short, Self::Medium, Self::Long];

    pub const fn distance(self) -> u8 {
        match self {
            Self::Short => 1,
            Self::Medium => 2,
            Self::Long => 3,
        }
    }

    fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Charge {
    Full,
    Half,
    Empty,
}

impl Charge {
    pub const fn drained(self) -> Self {
        match self {
            Self::Full => Self::Half,
            Self::Half | Self::Empty => Self::Empty,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub piece: PieceType,
    pub charge: Charge,
    pub highlighted: bool,
}

impl Cell {
    pub const fn new(piece: PieceType) -> Self {
        Self {
            piece,
            charge: Charge::Full,
            highlighted: true,
        }
    }

    pub const fn is_empty(&self) -> bool {
        matches!(self.charge, Charge::Empty)
    }
}

/// Whether `piece` at `attacker` attacks `target`.
pub fn attacks(piece: PieceType, attacker: Coord2, target: Coord2) -> bool {
    let distance = piece.distance();
    let congruent = |a: Coord, b: Coord| a % distance == b % distance && a.abs_diff(b) <= distance;
    congruent(attacker.0, target.0) && congruent(attacker.1, target.1)
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    #[default]
    Sewer,
    Vault,
}

impl Preset {
    pub fn config(self) -> ThermiteConfig {
        match self {
            Self::Sewer => ThermiteConfig::new(24, 6, 6, 60),
            Self::Vault => ThermiteConfig::new(28, 6, 6, 60),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThermiteConfig {
    pub target_score: u32,
    pub rows: Coord,
    pub columns: Coord,
    /// Seconds.
    pub timer: u32,
}

impl ThermiteConfig {
    pub const MAX_SIDE: u32 = 16;

    pub fn new(target_score: u32, rows: u32, columns: u32, timer: u32) -> Self {
        Self {
            target_score: target_score.max(1),
            rows: rows.clamp(1, Self::MAX_SIDE) as Coord,
            columns: columns.clamp(1, Self::MAX_SIDE) as Coord,
            timer: timer.clamp(1, 600),
        }
    }
}

impl Default for ThermiteConfig {
    fn default() -> Self {
        Preset::default().config()
    }
}

impl FromPayload for ThermiteConfig {
    /// A `preset` picks the baseline; explicit fields override it.
    fn from_payload(payload: &Value) -> Self {
        let payload = Payload::new(payload);
        let base = payload.choice("preset", Preset::default()).config();
        Self::new(
            payload.count("targetScore", base.target_score),
            payload.count("rows", base.rows.into()),
            payload.count("columns", base.columns.into()),
            payload.count("timer", base.timer),
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThermiteAction {
    Click(Coord2),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Thermite {
    grid: Array2<Cell>,
    target_score: u32,
    score: u32,
    combo: u32,
    total_combos: u32,
    last_kill: Option<Timestamp>,
    combo_notice: bool,
    /// Set when a click attacked nothing.
    out_of_moves: bool,
    verdict: Option<Verdict>,
}

impl Thermite {
    pub fn from_grid(grid: Array2<Cell>, target_score: u32) -> Self {
        Self {
            grid,
            target_score,
            score: 0,
            combo: 0,
            total_combos: 0,
            last_kill: None,
            combo_notice: false,
            out_of_moves: false,
            verdict: None,
        }
    }

    pub fn grid(&self) -> &Array2<Cell> {
        &self.grid
    }

    pub fn cell_at(&self, coords: Coord2) -> Cell {
        self.grid[coords.to_nd_index()]
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn target_score(&self) -> u32 {
        self.target_score
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn total_combos(&self) -> u32 {
        self.total_combos
    }

    /// Whether the last move completed a combo.
    pub fn combo_notice(&self) -> bool {
        self.combo_notice
    }

    pub fn out_of_moves(&self) -> bool {
        self.out_of_moves
    }

    pub fn click<R: Rng>(&mut self, coords: Coord2, now: Timestamp, rng: &mut R) -> Result<MoveOutcome> {
        check_open(self.verdict)?;
        if !in_bounds(&self.grid, coords) {
            return Err(GameError::InvalidCoords);
        }

        let clicked = self.cell_at(coords);
        if !clicked.highlighted || clicked.is_empty() {
            return Ok(MoveOutcome::NoChange);
        }
        self.combo_notice = false;

        let piece = clicked.piece;
        let mut attacked = 0;
        for ((row, col), cell) in self.grid.indexed_iter_mut() {
            let target = (row as Coord, col as Coord);
            if target == coords || cell.is_empty() {
                continue;
            }
            cell.highlighted = attacks(piece, coords, target);
            attacked += usize::from(cell.highlighted);
        }

        if attacked == 0 {
            log::debug!("Lose: Out of moves after clicking {coords:?}");
            self.out_of_moves = true;
            self.verdict = Some(Verdict::Lost);
            return Ok(MoveOutcome::Lost);
        }

        if clicked.charge == Charge::Half {
            self.kill(now);
            if self.score >= self.target_score {
                log::debug!("Win: Reached {} of {} points", self.score, self.target_score);
                self.verdict = Some(Verdict::Won);
                return Ok(MoveOutcome::Won);
            }
        } else {
            self.combo = 0;
        }

        let cell = &mut self.grid[coords.to_nd_index()];
        cell.charge = clicked.charge.drained();
        cell.piece = PieceType::random(rng);
        cell.highlighted = false;

        Ok(MoveOutcome::Accepted)
    }

    fn kill(&mut self, now: Timestamp) {
        self.score += 1;

        let in_window = self
            .last_kill
            .is_some_and(|last| now.saturating_sub(last) <= COMBO_WINDOW);
        self.combo = if self.combo == 0 || in_window {
            self.combo + 1
        } else {
            0
        };
        self.last_kill = Some(now);

        if self.combo >= COMBO_LENGTH {
            let bonus = 2u32.saturating_pow(self.total_combos);
            log::debug!("Combo #{}: +{} points", self.total_combos + 1, bonus);
            self.score = self.score.saturating_add(bonus);
            self.combo = 0;
            self.total_combos += 1;
            self.combo_notice = true;
        }
    }
}

impl Puzzle for Thermite {
    type Config = ThermiteConfig;
    type Action = ThermiteAction;

    const KIND: MinigameKind = MinigameKind::Thermite;

    fn generate<R: Rng>(config: &Self::Config, rng: &mut R) -> Self {
        log::debug!("Generating new {}x{} board", config.rows, config.columns);
        let size = (config.rows, config.columns).to_nd_index();
        let grid = Array2::from_shape_simple_fn(size, || Cell::new(PieceType::random(rng)));
        Self::from_grid(grid, config.target_score)
    }

    fn phases(config: &Self::Config) -> Vec<Phase> {
        vec![Phase::timed(seconds(config.timer))]
    }

    fn apply<R: Rng>(
        &mut self,
        action: Self::Action,
        now: Timestamp,
        rng: &mut R,
    ) -> Result<MoveOutcome> {
        match action {
            ThermiteAction::Click(coords) => self.click(coords, now, rng),
        }
    }

    fn verdict(&self) -> Option<Verdict> {
        self.verdict
    }
}
