//! Type the highlighted letters in order before the timer runs out.

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::puzzle::{check_open, seconds};
use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Letter {
    Q,
    W,
    E,
    R,
    A,
    S,
    D,
}

impl Letter {
    pub const ALL: [Letter; 7] = [
        Self::Q,
        Self::W,
        Self::E,
        Self::R,
        Self::A,
        Self::S,
        Self::D,
    ];

    pub const fn as_char(self) -> char {
        use Letter::*;
        match self {
            Q => 'Q',
            W => 'W',
            E => 'E',
            R => 'R',
            A => 'A',
            S => 'S',
            D => 'D',
        }
    }

    /// Case-insensitive comparison against a pressed key.
    pub fn matches_key(self, key: char) -> bool {
        key.to_ascii_uppercase() == self.as_char()
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LetterState {
    #[default]
    Pending,
    Done,
    Fail,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoppingConfig {
    pub letters: u32,
    /// Seconds.
    pub timer: u32,
}

impl ChoppingConfig {
    pub const MAX_LETTERS: u32 = 64;

    pub fn new(letters: u32, timer: u32) -> Self {
        Self {
            letters: letters.clamp(1, Self::MAX_LETTERS),
            timer: timer.clamp(1, 600),
        }
    }
}

impl Default for ChoppingConfig {
    fn default() -> Self {
        Self::new(15, 7)
    }
}

impl FromPayload for ChoppingConfig {
    fn from_payload(payload: &Value) -> Self {
        let payload = Payload::new(payload);
        let default = Self::default();
        Self::new(
            payload.count("letters", default.letters),
            payload.count("timer", default.timer),
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChoppingAction {
    Key(char),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chopping {
    letters: Vec<Letter>,
    states: Vec<LetterState>,
    active: usize,
    verdict: Option<Verdict>,
}

impl Chopping {
    pub fn from_letters(letters: Vec<Letter>) -> Self {
        let states = vec![LetterState::Pending; letters.len()];
        Self {
            letters,
            states,
            active: 0,
            verdict: None,
        }
    }

    pub fn letters(&self) -> &[Letter] {
        &self.letters
    }

    pub fn states(&self) -> &[LetterState] {
        &self.states
    }

    /// Index of the letter waiting for a key press.
    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn press(&mut self, key: char) -> Result<MoveOutcome> {
        check_open(self.verdict)?;

        let Some(&letter) = self.letters.get(self.active) else {
            return Ok(MoveOutcome::NoChange);
        };

        if letter.matches_key(key) {
            self.states[self.active] = LetterState::Done;
            self.active += 1;
        } else {
            self.states[self.active] = LetterState::Fail;
        }
        log::trace!("Key {key:?} against {letter:?}, cursor at {}", self.active);

        Ok(self.check_status())
    }

    fn check_status(&mut self) -> MoveOutcome {
        // the cursor only moves on success, so a done last letter means all are done
        if self.states.last() == Some(&LetterState::Done) {
            log::debug!("Win: All letters pressed successfully");
            self.verdict = Some(Verdict::Won);
            return MoveOutcome::Won;
        }

        if self.states.get(self.active) == Some(&LetterState::Fail) {
            log::debug!("Lose: Letter {:?} failed", self.letters[self.active]);
            self.verdict = Some(Verdict::Lost);
            return MoveOutcome::Lost;
        }

        MoveOutcome::Accepted
    }
}

impl Puzzle for Chopping {
    type Config = ChoppingConfig;
    type Action = ChoppingAction;

    const KIND: MinigameKind = MinigameKind::Chopping;

    fn generate<R: Rng>(config: &Self::Config, rng: &mut R) -> Self {
        log::debug!("Resetting board with {} letters", config.letters);
        let letters = (0..config.letters)
            .map(|_| Letter::ALL[rng.random_range(0..Letter::ALL.len())])
            .collect();
        Self::from_letters(letters)
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
            ChoppingAction::Key(key) => self.press(key),
        }
    }

    fn verdict(&self) -> Option<Verdict> {
        self.verdict
    }
}
