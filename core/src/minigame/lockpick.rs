//! Rotate each ring of the lock until every ball sitting in a slot matches the slot color.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::puzzle::{check_open, seconds};
use crate::*;

/// Number of angular positions around a ring, 30 degrees apart.
pub const POSITIONS: u8 = 12;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RingColor {
    Red,
    Yellow,
    Blue,
}

impl RingColor {
    pub const ALL: [RingColor; 3] = [Self::Red, Self::Yellow, Self::Blue];
}

/// How ball and slot positions are picked.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Balls and slots are prefixes of one shuffle of the positions.
    #[default]
    Normal,
    /// Balls and slots come from two independent shuffles.
    Hard,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ring {
    colors: Vec<RingColor>,
    balls: Vec<u8>,
    slots: Vec<u8>,
    rotation: u8,
}

impl Ring {
    /// Builds a ring from explicit positions, reducing everything modulo [`POSITIONS`].
    /// `colors` must hold exactly one color per position.
    pub fn new(
        colors: Vec<RingColor>,
        balls: Vec<u8>,
        slots: Vec<u8>,
        rotation: i32,
    ) -> Result<Self> {
        if colors.len() != usize::from(POSITIONS) {
            return Err(GameError::InvalidBoardShape);
        }
        let reduce = |list: Vec<u8>| list.into_iter().map(|p| p % POSITIONS).collect();
        Ok(Self {
            colors,
            balls: reduce(balls),
            slots: reduce(slots),
            rotation: wrap(rotation),
        })
    }

    pub fn generate<R: Rng>(difficulty: Difficulty, rng: &mut R) -> Self {
        let colors = (0..POSITIONS)
            .map(|_| RingColor::ALL[rng.random_range(0..RingColor::ALL.len())])
            .collect();
        let ball_count = rng.random_range(5..=usize::from(POSITIONS));
        let slot_count = rng.random_range(4..usize::from(POSITIONS) - 4);

        let mut positions: Vec<u8> = (0..POSITIONS).collect();
        positions.shuffle(rng);
        let (balls, slots) = match difficulty {
            Difficulty::Normal => (
                positions[..ball_count].to_vec(),
                positions[..slot_count].to_vec(),
            ),
            Difficulty::Hard => {
                let mut other: Vec<u8> = (0..POSITIONS).collect();
                other.shuffle(rng);
                (positions[..ball_count].to_vec(), other[..slot_count].to_vec())
            }
        };
        let rotation = rng.random_range(0..POSITIONS);

        Self {
            colors,
            balls,
            slots,
            rotation,
        }
    }

    pub fn colors(&self) -> &[RingColor] {
        &self.colors
    }

    pub fn balls(&self) -> &[u8] {
        &self.balls
    }

    pub fn slots(&self) -> &[u8] {
        &self.slots
    }

    pub fn rotation(&self) -> u8 {
        self.rotation
    }

    pub fn rotate(&mut self, steps: i32) {
        self.rotation = wrap(i32::from(self.rotation) + steps);
    }

    /// Position of the ball currently sitting over `slot`, if any.
    pub fn ball_under(&self, slot: u8) -> Option<u8> {
        let position = wrap(i32::from(slot) - i32::from(self.rotation));
        self.balls.contains(&position).then_some(position)
    }

    pub fn color_at(&self, position: u8) -> Option<RingColor> {
        self.colors.get(usize::from(position)).copied()
    }

    /// First slot whose ball has a different color, if any.
    pub fn first_mismatch(&self) -> Option<(u8, u8)> {
        self.slots.iter().find_map(|&slot| {
            let ball = self.ball_under(slot)?;
            (self.color_at(ball) != self.color_at(slot)).then_some((slot, ball))
        })
    }
}

fn wrap(position: i32) -> u8 {
    position.rem_euclid(POSITIONS.into()) as u8
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockpickConfig {
    pub title: String,
    pub levels: u32,
    /// Seconds.
    pub timer: u32,
    pub difficulty: Difficulty,
}

impl LockpickConfig {
    pub const MAX_LEVELS: u32 = 16;

    pub fn new(title: impl Into<String>, levels: u32, timer: u32, difficulty: Difficulty) -> Self {
        Self {
            title: title.into(),
            levels: levels.clamp(1, Self::MAX_LEVELS),
            timer: timer.clamp(1, 600),
            difficulty,
        }
    }
}

impl Default for LockpickConfig {
    fn default() -> Self {
        Self::new("Lockpick", 5, 30, Difficulty::Normal)
    }
}

impl FromPayload for LockpickConfig {
    fn from_payload(payload: &Value) -> Self {
        let payload = Payload::new(payload);
        let default = Self::default();
        Self::new(
            payload.text("title", &default.title),
            payload.count("levels", default.levels),
            payload.count("timer", default.timer),
            payload.choice("difficulty", default.difficulty),
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockpickAction {
    RotateLeft,
    RotateRight,
    Unlock,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lockpick {
    title: String,
    rings: Vec<Ring>,
    level: usize,
    verdict: Option<Verdict>,
}

impl Lockpick {
    pub fn from_rings(title: impl Into<String>, rings: Vec<Ring>) -> Self {
        Self {
            title: title.into(),
            rings,
            level: 0,
            verdict: None,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    /// Index of the ring being picked.
    pub fn level(&self) -> usize {
        self.level
    }

    pub fn active_ring(&self) -> Option<&Ring> {
        self.rings.get(self.level)
    }

    pub fn rotate(&mut self, steps: i32) -> Result<MoveOutcome> {
        check_open(self.verdict)?;
        let Some(ring) = self.rings.get_mut(self.level) else {
            return Ok(MoveOutcome::NoChange);
        };
        ring.rotate(steps);
        Ok(MoveOutcome::Accepted)
    }

    /// Checks the active ring; a single mismatch loses the whole lock.
    pub fn unlock(&mut self) -> Result<MoveOutcome> {
        check_open(self.verdict)?;
        let Some(ring) = self.rings.get(self.level) else {
            return Ok(MoveOutcome::NoChange);
        };

        if let Some((slot, ball)) = ring.first_mismatch() {
            log::debug!(
                "Lose: Mismatch on level {} with rotation {}. Slot {} ({:?}) does not match ball {} ({:?})",
                self.level,
                ring.rotation(),
                slot,
                ring.color_at(slot),
                ball,
                ring.color_at(ball),
            );
            self.verdict = Some(Verdict::Lost);
            return Ok(MoveOutcome::Lost);
        }

        if self.level + 1 >= self.rings.len() {
            log::debug!("Win: All levels completed");
            self.verdict = Some(Verdict::Won);
            Ok(MoveOutcome::Won)
        } else {
            self.level += 1;
            Ok(MoveOutcome::Accepted)
        }
    }
}

impl Puzzle for Lockpick {
    type Config = LockpickConfig;
    type Action = LockpickAction;

    const KIND: MinigameKind = MinigameKind::Lockpick;

    fn generate<R: Rng>(config: &Self::Config, rng: &mut R) -> Self {
        let rings = (0..config.levels)
            .map(|_| Ring::generate(config.difficulty, rng))
            .collect();
        Self::from_rings(config.title.clone(), rings)
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
            LockpickAction::RotateLeft => self.rotate(-1),
            LockpickAction::RotateRight => self.rotate(1),
            LockpickAction::Unlock => self.unlock(),
        }
    }

    fn verdict(&self) -> Option<Verdict> {
        self.verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use RingColor::*;

    fn all_red() -> Vec<RingColor> {
        vec![Red; usize::from(POSITIONS)]
    }

    #[test]
    fn single_matching_ring_wins() {
        let ring = Ring::new(all_red(), vec![0], vec![0], 0).unwrap();
        let mut lock = Lockpick::from_rings("Lockpick", vec![ring]);

        assert_eq!(lock.unlock().unwrap(), MoveOutcome::Won);
        assert_eq!(lock.verdict(), Some(Verdict::Won));
    }

    #[test]
    fn mismatch_loses_whole_lock() {
        let mut colors = all_red();
        colors[3] = Blue;
        // ball at 3 sits over slot 4 with rotation 1
        let ring = Ring::new(colors, vec![3], vec![4], 1).unwrap();
        let mut lock = Lockpick::from_rings("Lockpick", vec![ring.clone(), ring]);

        assert_eq!(lock.unlock().unwrap(), MoveOutcome::Lost);
        assert_eq!(lock.level(), 0);
        assert_eq!(lock.rotate(1), Err(GameError::AlreadyEnded));
    }

    #[test]
    fn rotating_away_clears_mismatch_and_advances() {
        let mut colors = all_red();
        colors[3] = Blue;
        let ring = Ring::new(colors, vec![3], vec![4], 1).unwrap();
        let mut lock = Lockpick::from_rings("Lockpick", vec![ring.clone(), ring]);

        lock.rotate(-1).unwrap();
        assert_eq!(lock.active_ring().unwrap().rotation(), 0);
        assert_eq!(lock.unlock().unwrap(), MoveOutcome::Accepted);

        // the next ring keeps its own stored rotation
        assert_eq!(lock.level(), 1);
        assert_eq!(lock.active_ring().unwrap().rotation(), 1);
    }

    #[test]
    fn rotation_wraps_around() {
        let mut ring = Ring::new(all_red(), vec![], vec![], -1).unwrap();
        assert_eq!(ring.rotation(), 11);

        ring.rotate(2);
        assert_eq!(ring.rotation(), 1);
        ring.rotate(-14);
        assert_eq!(ring.rotation(), 11);
    }

    #[test]
    fn unlock_matches_color_rule_for_random_rings() {
        for seed in 0..500 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let difficulty = if seed % 2 == 0 {
                Difficulty::Normal
            } else {
                Difficulty::Hard
            };
            let ring = Ring::generate(difficulty, &mut rng);

            let expected = ring.slots().iter().all(|&slot| {
                let ball = (i32::from(slot) - i32::from(ring.rotation())).rem_euclid(12) as u8;
                !ring.balls().contains(&ball)
                    || ring.colors()[usize::from(slot)] == ring.colors()[usize::from(ball)]
            });

            let mut lock = Lockpick::from_rings("Lockpick", vec![ring]);
            let outcome = lock.unlock().unwrap();

            assert_eq!(outcome == MoveOutcome::Won, expected, "seed {seed}");
        }
    }

    fn assert_counts(ring: &Ring) {
        assert_eq!(ring.colors().len(), 12);
        assert!((5..=12).contains(&ring.balls().len()));
        assert!((4..8).contains(&ring.slots().len()));
        assert!(ring.rotation() < 12);
    }

    fn is_prefix_pair(a: &[u8], b: &[u8]) -> bool {
        let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
        long.starts_with(short)
    }

    #[test]
    fn generated_rings_respect_counts() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut more_slots_than_balls = false;
        for _ in 0..200 {
            let ring = Ring::generate(Difficulty::Normal, &mut rng);

            assert_counts(&ring);
            // both come from the same shuffle
            assert!(is_prefix_pair(ring.balls(), ring.slots()));
            more_slots_than_balls |= ring.slots().len() > ring.balls().len();
        }
        assert!(more_slots_than_balls);
    }

    #[test]
    fn hard_rings_draw_slots_independently() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut independent = false;
        for _ in 0..200 {
            let ring = Ring::generate(Difficulty::Hard, &mut rng);

            assert_counts(&ring);
            let mut slots = ring.slots().to_vec();
            slots.sort_unstable();
            slots.dedup();
            assert_eq!(slots.len(), ring.slots().len());
            independent |= !is_prefix_pair(ring.balls(), ring.slots());
        }
        assert!(independent);
    }

    #[test]
    fn ring_needs_one_color_per_position() {
        assert_eq!(
            Ring::new(vec![Red], vec![5], vec![5], 0),
            Err(GameError::InvalidBoardShape)
        );
        assert_eq!(
            Ring::new(vec![Red; 13], vec![], vec![], 0),
            Err(GameError::InvalidBoardShape)
        );
    }

    #[test]
    fn payload_reads_difficulty_and_title() {
        let config = LockpickConfig::from_payload(&serde_json::json!({
            "title": "Laundromat",
            "levels": 3,
            "difficulty": "hard",
        }));

        assert_eq!(config, LockpickConfig::new("Laundromat", 3, 30, Difficulty::Hard));
    }
}
