//! Memorize colored sequences of shapes, then answer questions about them from memory.

use core::time::Duration;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::puzzle::{check_open, seconds};
use crate::*;

/// Countdown granularity for both phases.
pub const TICK: Duration = Duration::from_millis(100);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Square,
    Circle,
    Triangle,
}

impl Shape {
    pub const ALL: [Shape; 3] = [Self::Square, Self::Circle, Self::Triangle];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Square => "square",
            Self::Circle => "circle",
            Self::Triangle => "triangle",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceColor {
    Red,
    Blue,
    Yellow,
    Purple,
    Orange,
    Green,
}

impl SequenceColor {
    pub const ALL: [SequenceColor; 6] = [
        Self::Red,
        Self::Blue,
        Self::Yellow,
        Self::Purple,
        Self::Orange,
        Self::Green,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Yellow => "yellow",
            Self::Purple => "purple",
            Self::Orange => "orange",
            Self::Green => "green",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    pub color: SequenceColor,
    pub shapes: Vec<Shape>,
}

impl Sequence {
    pub fn unique_shapes(&self) -> usize {
        Shape::ALL.iter().filter(|&shape| self.shapes.contains(shape)).count()
    }
}

/// What a question asks about a sequence.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Subject {
    /// Shape at a column.
    Shape(usize),
    Color,
    UniqueShapes,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub sequence: usize,
    pub subject: Subject,
}

impl Query {
    /// Every question that can be asked about `rows` sequences of `columns` shapes.
    pub fn all(rows: usize, columns: usize) -> Vec<Query> {
        (0..rows)
            .flat_map(|sequence| {
                (0..columns)
                    .map(Subject::Shape)
                    .chain([Subject::Color, Subject::UniqueShapes])
                    .map(move |subject| Query { sequence, subject })
            })
            .collect()
    }

    pub fn prompt(&self) -> String {
        let number = self.sequence + 1;
        match self.subject {
            Subject::Shape(column) => format!("Sequence {number} Shape {}", column + 1),
            Subject::Color => format!("Sequence {number} Color"),
            Subject::UniqueShapes => format!("Sequence {number} # of unique shapes"),
        }
    }

    /// Expected answer, or `None` when the query does not fit the sequences.
    pub fn expected(&self, sequences: &[Sequence]) -> Option<String> {
        let sequence = sequences.get(self.sequence)?;
        Some(match self.subject {
            Subject::Shape(column) => sequence.shapes.get(column)?.name().to_owned(),
            Subject::Color => sequence.color.name().to_owned(),
            Subject::UniqueShapes => number_to_words(sequence.unique_shapes()),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub prompt: String,
    pub expected: String,
}

/// English spelling of `num`; numbers past 99 stay as digits.
pub fn number_to_words(num: usize) -> String {
    const ONES: [&str; 20] = [
        "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
        "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen",
        "eighteen", "nineteen",
    ];
    const TENS: [&str; 10] = [
        "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
    ];

    match num {
        0..20 => ONES[num].to_owned(),
        20..100 if num % 10 == 0 => TENS[num / 10].to_owned(),
        20..100 => format!("{}-{}", TENS[num / 10], ONES[num % 10]),
        _ => num.to_string(),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminalStage {
    /// Sequences are on screen, answers are ignored.
    View,
    Answer,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaptopTerminalConfig {
    pub rows: u32,
    pub columns: u32,
    /// Seconds.
    pub view_time: u32,
    /// Seconds.
    pub type_time: u32,
    pub answers_needed: u32,
}

impl LaptopTerminalConfig {
    pub const MAX_SIDE: u32 = 8;

    pub fn new(rows: u32, columns: u32, view_time: u32, type_time: u32, answers_needed: u32) -> Self {
        let rows = rows.clamp(1, Self::MAX_SIDE);
        let columns = columns.clamp(1, Self::MAX_SIDE);
        Self {
            rows,
            columns,
            view_time: view_time.clamp(1, 600),
            type_time: type_time.clamp(1, 600),
            // one question per shape, plus color and unique count per row
            answers_needed: answers_needed.clamp(1, rows * (columns + 2)),
        }
    }
}

impl Default for LaptopTerminalConfig {
    fn default() -> Self {
        Self::new(4, 2, 12, 30, 3)
    }
}

impl FromPayload for LaptopTerminalConfig {
    fn from_payload(payload: &Value) -> Self {
        let payload = Payload::new(payload);
        let default = Self::default();
        Self::new(
            payload.count("rows", default.rows),
            payload.count("columns", default.columns),
            payload.count("viewTime", default.view_time),
            payload.count("typeTime", default.type_time),
            payload.count("answersNeeded", default.answers_needed),
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaptopTerminalAction {
    Answer(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaptopTerminal {
    sequences: Vec<Sequence>,
    questions: Vec<Question>,
    /// Submitted answers, lower-cased, in question order.
    answers: Vec<String>,
    stage: TerminalStage,
    verdict: Option<Verdict>,
}

impl LaptopTerminal {
    pub fn from_parts(sequences: Vec<Sequence>, queries: &[Query]) -> Self {
        let questions = queries
            .iter()
            .filter_map(|query| {
                let expected = query.expected(&sequences)?;
                Some(Question {
                    prompt: query.prompt(),
                    expected,
                })
            })
            .collect();
        Self {
            sequences,
            questions,
            answers: Vec::new(),
            stage: TerminalStage::View,
            verdict: None,
        }
    }

    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn stage(&self) -> TerminalStage {
        self.stage
    }

    /// Question waiting for an answer, if the answer stage has started.
    pub fn current_question(&self) -> Option<&Question> {
        match self.stage {
            TerminalStage::View => None,
            TerminalStage::Answer => self.questions.get(self.answers.len()),
        }
    }

    pub fn answer(&mut self, text: &str) -> Result<MoveOutcome> {
        check_open(self.verdict)?;
        let Some(question) = self.current_question() else {
            log::trace!("No question to answer");
            return Ok(MoveOutcome::NoChange);
        };

        let answer = text.to_lowercase();
        let correct = answer == question.expected;
        if !correct {
            log::debug!(
                "Lose: {:?} expected {:?}, got {:?}",
                question.prompt,
                question.expected,
                answer
            );
        }
        self.answers.push(answer);

        if !correct {
            self.verdict = Some(Verdict::Lost);
            Ok(MoveOutcome::Lost)
        } else if self.answers.len() == self.questions.len() {
            log::debug!("Win: All {} questions answered", self.questions.len());
            self.verdict = Some(Verdict::Won);
            Ok(MoveOutcome::Won)
        } else {
            Ok(MoveOutcome::Accepted)
        }
    }
}

impl Puzzle for LaptopTerminal {
    type Config = LaptopTerminalConfig;
    type Action = LaptopTerminalAction;

    const KIND: MinigameKind = MinigameKind::LaptopTerminal;

    fn generate<R: Rng>(config: &Self::Config, rng: &mut R) -> Self {
        let (rows, columns) = (config.rows as usize, config.columns as usize);
        let sequences = (0..rows)
            .map(|_| Sequence {
                color: SequenceColor::ALL[rng.random_range(0..SequenceColor::ALL.len())],
                shapes: (0..columns)
                    .map(|_| Shape::ALL[rng.random_range(0..Shape::ALL.len())])
                    .collect(),
            })
            .collect();

        let mut queries = Query::all(rows, columns);
        queries.shuffle(rng);
        queries.truncate(config.answers_needed as usize);

        Self::from_parts(sequences, &queries)
    }

    fn phases(config: &Self::Config) -> Vec<Phase> {
        vec![
            Phase::timed(seconds(config.view_time))
                .with_interval(TICK)
                .then_next(),
            Phase::timed(seconds(config.type_time)).with_interval(TICK),
        ]
    }

    fn begin_phase<R: Rng>(&mut self, phase: usize, _rng: &mut R) {
        self.stage = if phase == 0 {
            TerminalStage::View
        } else {
            TerminalStage::Answer
        };
    }

    fn apply<R: Rng>(
        &mut self,
        action: Self::Action,
        _now: Timestamp,
        _rng: &mut R,
    ) -> Result<MoveOutcome> {
        match action {
            LaptopTerminalAction::Answer(text) => self.answer(&text),
        }
    }

    fn verdict(&self) -> Option<Verdict> {
        self.verdict
    }
}
