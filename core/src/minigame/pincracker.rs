//! Guess a pin of distinct digits, with per-digit feedback after each attempt.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::puzzle::{check_open, seconds};
use crate::*;

/// Feedback for one digit of a submitted guess.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DigitMark {
    /// Right digit in the right place.
    Correct,
    /// Digit is in the pin, somewhere else.
    Misplaced,
    Absent,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PincrackerConfig {
    pub pin_length: u32,
    /// Seconds.
    pub timer: u32,
}

impl PincrackerConfig {
    pub fn new(pin_length: u32, timer: u32) -> Self {
        Self {
            // digits never repeat
            pin_length: pin_length.clamp(1, 10),
            timer: timer.clamp(1, 600),
        }
    }
}

impl Default for PincrackerConfig {
    fn default() -> Self {
        Self::new(4, 20)
    }
}

impl FromPayload for PincrackerConfig {
    fn from_payload(payload: &Value) -> Self {
        let payload = Payload::new(payload);
        let default = Self::default();
        Self::new(
            payload.count("pinLength", default.pin_length),
            payload.count("timer", default.timer),
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PincrackerAction {
    Digit(u8),
    Backspace,
    Submit,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pincracker {
    pin: Vec<u8>,
    entry: Vec<u8>,
    /// Marks of the last submitted guess, kept until the next submission.
    marks: Vec<DigitMark>,
    last_guess: Vec<u8>,
    attempts: u32,
    verdict: Option<Verdict>,
}

impl Pincracker {
    pub fn from_pin(pin: Vec<u8>) -> Self {
        Self {
            pin,
            entry: Vec::new(),
            marks: Vec::new(),
            last_guess: Vec::new(),
            attempts: 0,
            verdict: None,
        }
    }

    pub fn pin_length(&self) -> usize {
        self.pin.len()
    }

    pub fn entry(&self) -> &[u8] {
        &self.entry
    }

    pub fn marks(&self) -> &[DigitMark] {
        &self.marks
    }

    pub fn last_guess(&self) -> &[u8] {
        &self.last_guess
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn type_digit(&mut self, digit: u8) -> Result<MoveOutcome> {
        check_open(self.verdict)?;
        if digit > 9 || self.entry.len() >= self.pin.len() {
            return Ok(MoveOutcome::NoChange);
        }
        self.entry.push(digit);
        Ok(MoveOutcome::Accepted)
    }

    pub fn backspace(&mut self) -> Result<MoveOutcome> {
        check_open(self.verdict)?;
        Ok(match self.entry.pop() {
            Some(_) => MoveOutcome::Accepted,
            None => MoveOutcome::NoChange,
        })
    }

    /// Checks a full entry against the pin; an incomplete entry is ignored.
    pub fn submit(&mut self) -> Result<MoveOutcome> {
        check_open(self.verdict)?;
        if self.entry.len() < self.pin.len() {
            log::trace!("Incomplete pin");
            return Ok(MoveOutcome::NoChange);
        }

        let guess = core::mem::take(&mut self.entry);
        self.marks = mark_guess(&self.pin, &guess);
        self.attempts += 1;
        self.last_guess = guess;

        if self.marks.iter().all(|&mark| mark == DigitMark::Correct) {
            log::debug!("Win: Pin cracked after {} attempts", self.attempts);
            self.verdict = Some(Verdict::Won);
            Ok(MoveOutcome::Won)
        } else {
            Ok(MoveOutcome::Accepted)
        }
    }
}

pub fn mark_guess(pin: &[u8], guess: &[u8]) -> Vec<DigitMark> {
    guess
        .iter()
        .enumerate()
        .map(|(i, digit)| {
            if pin.get(i) == Some(digit) {
                DigitMark::Correct
            } else if pin.contains(digit) {
                DigitMark::Misplaced
            } else {
                DigitMark::Absent
            }
        })
        .collect()
}

impl Puzzle for Pincracker {
    type Config = PincrackerConfig;
    type Action = PincrackerAction;

    const KIND: MinigameKind = MinigameKind::Pincracker;

    fn generate<R: Rng>(config: &Self::Config, rng: &mut R) -> Self {
        let mut digits: Vec<u8> = (0..10).collect();
        digits.shuffle(rng);
        digits.truncate(config.pin_length as usize);
        Self::from_pin(digits)
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
            PincrackerAction::Digit(digit) => self.type_digit(digit),
            PincrackerAction::Backspace => self.backspace(),
            PincrackerAction::Submit => self.submit(),
        }
    }

    fn verdict(&self) -> Option<Verdict> {
        self.verdict
    }
}
