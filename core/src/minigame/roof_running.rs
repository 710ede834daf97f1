//! Clear the grid by removing groups of two or more same-colored tiles.
//!
//! Removed tiles leave holes that the tiles above fall into, and emptied columns are closed by
//! shifting the remaining columns to the left.

use std::collections::{BTreeSet, VecDeque};

use ndarray::Array2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::puzzle::{check_open, seconds};
use crate::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Square {
    #[default]
    Empty,
    Red,
    Green,
    Blue,
}

impl Square {
    pub const COLORS: [Square; 3] = [Self::Red, Self::Green, Self::Blue];

    pub const fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoofRunningConfig {
    pub rows: Coord,
    pub columns: Coord,
    /// Seconds.
    pub timer: u32,
}

impl RoofRunningConfig {
    pub const MAX_SIDE: u32 = 32;

    pub fn new(rows: u32, columns: u32, timer: u32) -> Self {
        Self {
            rows: rows.clamp(1, Self::MAX_SIDE) as Coord,
            columns: columns.clamp(1, Self::MAX_SIDE) as Coord,
            timer: timer.clamp(1, 600),
        }
    }
}

impl Default for RoofRunningConfig {
    fn default() -> Self {
        Self::new(8, 11, 25)
    }
}

impl FromPayload for RoofRunningConfig {
    fn from_payload(payload: &Value) -> Self {
        let payload = Payload::new(payload);
        let default = Self::default();
        Self::new(
            payload.count("rows", default.rows.into()),
            payload.count("columns", default.columns.into()),
            payload.count("timer", default.timer),
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoofRunningAction {
    Click(Coord2),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoofRunning {
    grid: Array2<Square>,
    verdict: Option<Verdict>,
}

impl RoofRunning {
    pub fn from_grid(grid: Array2<Square>) -> Self {
        Self {
            grid,
            verdict: None,
        }
    }

    pub fn grid(&self) -> &Array2<Square> {
        &self.grid
    }

    pub fn size(&self) -> Coord2 {
        grid_size(&self.grid)
    }

    pub fn square_at(&self, coords: Coord2) -> Square {
        self.grid[coords.to_nd_index()]
    }

    /// Same-colored tiles connected to `coords`, including itself. Empty tiles have no cluster.
    pub fn cluster_at(&self, coords: Coord2) -> Result<Vec<Coord2>> {
        if !in_bounds(&self.grid, coords) {
            return Err(GameError::InvalidCoords);
        }

        let color = self.square_at(coords);
        if color.is_empty() {
            return Ok(Vec::new());
        }

        let mut visited = BTreeSet::from([coords]);
        let mut to_visit = VecDeque::from([coords]);
        while let Some(visit_coords) = to_visit.pop_front() {
            for neighbor in self.grid.iter_neighbors(visit_coords) {
                if self.square_at(neighbor) == color && visited.insert(neighbor) {
                    to_visit.push_back(neighbor);
                }
            }
        }
        log::trace!("Cluster of {:?} at {:?}: {} tiles", color, coords, visited.len());

        Ok(visited.into_iter().collect())
    }

    pub fn click(&mut self, coords: Coord2) -> Result<MoveOutcome> {
        check_open(self.verdict)?;

        let cluster = self.cluster_at(coords)?;
        if cluster.len() < 2 {
            return Ok(MoveOutcome::NoChange);
        }

        for pos in cluster {
            self.grid[pos.to_nd_index()] = Square::Empty;
        }
        apply_gravity(&mut self.grid);
        shift_left(&mut self.grid);

        Ok(self.check_status())
    }

    fn check_status(&mut self) -> MoveOutcome {
        if self.grid.iter().all(|square| square.is_empty()) {
            log::debug!("Win: All tiles cleared");
            self.verdict = Some(Verdict::Won);
            return MoveOutcome::Won;
        }

        for color in Square::COLORS {
            if self.grid.iter().filter(|&&square| square == color).count() == 1 {
                log::debug!("Lose: Unsolvable, 1 {color:?} tile remaining");
                self.verdict = Some(Verdict::Lost);
                return MoveOutcome::Lost;
            }
        }

        MoveOutcome::Accepted
    }
}

/// Drops tiles to the bottom of their column, keeping their order.
pub fn apply_gravity(grid: &mut Array2<Square>) {
    for mut column in grid.columns_mut() {
        let filled: Vec<Square> = column.iter().copied().filter(|s| !s.is_empty()).collect();
        let gap = column.len() - filled.len();
        for (row, square) in column.iter_mut().enumerate() {
            *square = if row < gap {
                Square::Empty
            } else {
                filled[row - gap]
            };
        }
    }
}

/// Removes empty columns by moving the others to the left, keeping their order.
pub fn shift_left(grid: &mut Array2<Square>) {
    let (rows, columns) = grid.dim();
    let kept: Vec<usize> = (0..columns)
        .filter(|&column| grid.column(column).iter().any(|s| !s.is_empty()))
        .collect();
    if kept.len() == columns {
        return;
    }

    let mut shifted = Array2::from_elem((rows, columns), Square::Empty);
    for (target, &source) in kept.iter().enumerate() {
        shifted.column_mut(target).assign(&grid.column(source));
    }
    *grid = shifted;
}

impl Puzzle for RoofRunning {
    type Config = RoofRunningConfig;
    type Action = RoofRunningAction;

    const KIND: MinigameKind = MinigameKind::RoofRunning;

    fn generate<R: Rng>(config: &Self::Config, rng: &mut R) -> Self {
        log::debug!("Generating new {}x{} board", config.rows, config.columns);
        let size = (config.rows, config.columns).to_nd_index();
        let grid = Array2::from_shape_simple_fn(size, || {
            Square::COLORS[rng.random_range(0..Square::COLORS.len())]
        });
        Self::from_grid(grid)
    }

    fn phases(config: &Self::Config) -> Vec<Phase> {
        vec![Phase::timed(seconds(config.timer))]
    }

    fn apply<R: Rng>(
        &mut self,
        action: Self::Action,
        _now: Timestamp,
        _rng: &mut R,
    ) -> Result<MoveOutcome> {
        match action {
            RoofRunningAction::Click(coords) => self.click(coords),
        }
    }

    fn verdict(&self) -> Option<Verdict> {
        self.verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use Square::*;

    #[test]
    fn single_tile_click_is_a_no_op() {
        let grid = array![[Red, Green], [Blue, Red]];
        let mut board = RoofRunning::from_grid(grid.clone());

        assert_eq!(board.click((0, 0)).unwrap(), MoveOutcome::NoChange);
        assert_eq!(board.grid(), &grid);
    }

    #[test]
    fn cluster_follows_orthogonal_same_color_tiles() {
        let board = RoofRunning::from_grid(array![
            [Red, Red, Blue],
            [Green, Red, Red],
            [Red, Blue, Red],
        ]);

        let cluster = board.cluster_at((0, 0)).unwrap();

        assert_eq!(cluster, vec![(0, 0), (0, 1), (1, 1), (1, 2), (2, 2)]);
        assert_eq!(board.cluster_at((3, 0)), Err(GameError::InvalidCoords));
    }

    #[test]
    fn removal_applies_gravity_then_left_shift() {
        let mut board = RoofRunning::from_grid(array![
            [Green, Blue, Blue],
            [Red, Green, Blue],
            [Red, Green, Green],
        ]);

        // clearing the red pair empties column 0 below green
        assert_eq!(board.click((1, 0)).unwrap(), MoveOutcome::Accepted);
        assert_eq!(
            board.grid(),
            &array![[Empty, Blue, Blue], [Empty, Green, Blue], [Green, Green, Green]]
        );

        // clearing the blue group leaves column 2 with a single green
        assert_eq!(board.click((0, 1)).unwrap(), MoveOutcome::Accepted);
        assert_eq!(
            board.grid(),
            &array![[Empty, Empty, Empty], [Empty, Green, Empty], [Green, Green, Green]]
        );
    }

    #[test]
    fn emptied_column_is_closed() {
        let mut grid = array![[Red, Blue], [Red, Blue]];
        grid[(0, 0)] = Empty;
        grid[(1, 0)] = Empty;

        shift_left(&mut grid);

        assert_eq!(grid, array![[Blue, Empty], [Blue, Empty]]);
    }

    #[test]
    fn clearing_everything_wins() {
        let mut board = RoofRunning::from_grid(array![[Red, Red], [Blue, Blue]]);

        assert_eq!(board.click((0, 0)).unwrap(), MoveOutcome::Accepted);
        assert_eq!(board.click((1, 1)).unwrap(), MoveOutcome::Won);
        assert_eq!(board.click((1, 1)), Err(GameError::AlreadyEnded));
    }

    #[test]
    fn lone_color_tile_loses() {
        let mut board = RoofRunning::from_grid(array![[Red, Red, Red], [Blue, Blue, Green]]);

        assert_eq!(board.click((1, 0)).unwrap(), MoveOutcome::Lost);
        assert_eq!(board.verdict(), Some(Verdict::Lost));
    }

    #[test]
    fn random_play_never_leaves_an_undetected_lone_tile() {
        for seed in 0..40 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut board = RoofRunning::generate(&RoofRunningConfig::new(6, 7, 25), &mut rng);

            for _ in 0..200 {
                let coords = (rng.random_range(0..6), rng.random_range(0..7));
                let outcome = board.click(coords).unwrap();
                if outcome.verdict().is_some() {
                    break;
                }
                if outcome == MoveOutcome::Accepted {
                    for color in Square::COLORS {
                        let count = board.grid().iter().filter(|&&s| s == color).count();
                        assert_ne!(count, 1, "seed {seed}: lone {color:?} went unnoticed");
                    }
                }
            }
        }
    }
}
