//! Tell whether each shown word has been shown before.
//!
//! The pool holds half as many words as there are rounds and words are drawn with replacement,
//! so repeats are guaranteed.
//!
//! The win check runs after counting an answer, so exactly `rounds` correct answers win. There is
//! no extra answer past the last round.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::puzzle::{check_open, seconds};
use crate::*;

pub const DICTIONARY: &[&str] = &[
    "able", "acid", "actor", "adult", "agent", "alarm", "album", "alley", "amber", "angle",
    "apple", "arrow", "audio", "badge", "baker", "basin", "beach", "bench", "berry", "blade",
    "blank", "board", "bonus", "brain", "brick", "bridge", "brush", "cabin", "cable", "camel",
    "candle", "canvas", "carpet", "castle", "cat", "chain", "chalk", "cherry", "circle", "cliff",
    "cloud", "coast", "cobra", "copper", "coral", "cotton", "crane", "crown", "dance", "desert",
    "diary", "dinner", "dragon", "drum", "eagle", "earth", "engine", "fabric", "feather", "fence",
    "field", "flame", "forest", "frame", "garden", "ghost", "giant", "glass", "globe", "grape",
    "harbor", "hammer", "honey", "horse", "island", "jacket", "jelly", "jungle", "kettle", "knife",
    "ladder", "lemon", "letter", "lizard", "magnet", "marble", "meadow", "mirror", "monkey",
    "motor", "needle", "night", "ocean", "orange", "paper", "pencil", "pepper", "piano", "pillow",
    "planet", "pocket", "puzzle", "rabbit", "radio", "river", "rocket", "saddle", "salad",
    "shadow", "silver", "spider", "stone", "sugar", "summer", "table", "tiger", "timber",
    "tower", "train", "valley", "velvet", "violin", "wagon", "window", "winter", "wolf", "zebra",
];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordMemoryConfig {
    pub rounds: u32,
    /// Seconds.
    pub duration: u32,
}

impl WordMemoryConfig {
    pub fn new(rounds: u32, duration: u32) -> Self {
        Self {
            rounds: rounds.max(1),
            duration: duration.clamp(1, 600),
        }
    }

    /// Distinct words to draw from.
    pub fn pool_size(&self) -> usize {
        (self.rounds as usize / 2).clamp(1, DICTIONARY.len())
    }
}

impl Default for WordMemoryConfig {
    fn default() -> Self {
        Self::new(25, 25)
    }
}

impl FromPayload for WordMemoryConfig {
    /// The round count and duration are fixed, so the payload is not read.
    fn from_payload(_payload: &Value) -> Self {
        Self::default()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WordMemoryAction {
    Seen,
    New,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WordMemory {
    pool: Vec<String>,
    seen: Vec<String>,
    current: String,
    round: u32,
    rounds: u32,
    verdict: Option<Verdict>,
}

impl WordMemory {
    /// Starts with `first` on screen; `pool` must not be empty.
    pub fn new(pool: Vec<String>, first: String, rounds: u32) -> Self {
        Self {
            pool,
            seen: Vec::new(),
            current: first,
            round: 0,
            rounds,
            verdict: None,
        }
    }

    pub fn current_word(&self) -> &str {
        &self.current
    }

    /// Words shown in earlier rounds, in order.
    pub fn seen_words(&self) -> &[String] {
        &self.seen
    }

    pub fn pool(&self) -> &[String] {
        &self.pool
    }

    /// Rounds answered correctly so far.
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn answer<R: Rng>(&mut self, action: WordMemoryAction, rng: &mut R) -> Result<MoveOutcome> {
        check_open(self.verdict)?;

        let was_seen = self.seen.contains(&self.current);
        let claimed_seen = matches!(action, WordMemoryAction::Seen);
        if was_seen != claimed_seen {
            log::debug!(
                "Lose: {:?} was {} (seen {:?})",
                self.current,
                if was_seen { "already seen" } else { "not seen yet" },
                self.seen
            );
            self.verdict = Some(Verdict::Lost);
            return Ok(MoveOutcome::Lost);
        }

        self.round += 1;
        if self.round >= self.rounds {
            log::debug!("Win: All rounds completed");
            self.verdict = Some(Verdict::Won);
            return Ok(MoveOutcome::Won);
        }

        let next = self.pool.choose(rng).cloned().unwrap_or_default();
        let shown = core::mem::replace(&mut self.current, next);
        self.seen.push(shown);
        Ok(MoveOutcome::Accepted)
    }
}

impl Puzzle for WordMemory {
    type Config = WordMemoryConfig;
    type Action = WordMemoryAction;

    const KIND: MinigameKind = MinigameKind::WordMemory;

    fn generate<R: Rng>(config: &Self::Config, rng: &mut R) -> Self {
        let pool: Vec<String> = DICTIONARY
            .choose_multiple(rng, config.pool_size())
            .map(|&word| word.to_owned())
            .collect();
        let first = pool.choose(rng).cloned().unwrap_or_default();
        log::debug!("Word pool: {pool:?}");
        Self::new(pool, first, config.rounds)
    }

    fn phases(config: &Self::Config) -> Vec<Phase> {
        vec![Phase::timed(seconds(config.duration))]
    }

    fn apply<R: Rng>(
        &mut self,
        action: Self::Action,
        _now: Timestamp,
        rng: &mut R,
    ) -> Result<MoveOutcome> {
        self.answer(action, rng)
    }

    fn verdict(&self) -> Option<Verdict> {
        self.verdict
    }
}
