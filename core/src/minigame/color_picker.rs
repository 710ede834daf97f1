//! Memorize which color each icon was shown in, then name the color of the icons one by one.

use core::fmt;
use core::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::puzzle::{check_open, seconds};
use crate::*;

/// Times the icon set is redrawn before it settles, so a renderer can animate the shuffle.
pub const SHUFFLE_ROUNDS: usize = 5;

/// Delay between two shuffle rounds when animated.
pub const SHUFFLE_STEP: Duration = Duration::from_millis(500);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Icon {
    Server,
    Bug,
    PowerOff,
    Bomb,
    Folder,
    Wifi,
    Gamepad,
    Gears,
    Laptop,
    Cloud,
    Link,
}

impl Icon {
    pub const ALL: [Icon; 11] = [
        Self::Server,
        Self::Bug,
        Self::PowerOff,
        Self::Bomb,
        Self::Folder,
        Self::Wifi,
        Self::Gamepad,
        Self::Gears,
        Self::Laptop,
        Self::Cloud,
        Self::Link,
    ];
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NamedColor {
    pub name: &'static str,
    pub hex: &'static str,
}

impl fmt::Display for NamedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

pub const COLORS: [NamedColor; 10] = [
    NamedColor { name: "red", hex: "#CA3521" },
    NamedColor { name: "blue", hex: "#0C66E4" },
    NamedColor { name: "cyan", hex: "cyan" },
    NamedColor { name: "green", hex: "#6A9A23" },
    NamedColor { name: "orange", hex: "#D97008" },
    NamedColor { name: "purple", hex: "#6E5DC6" },
    NamedColor { name: "yellow", hex: "#F5CD47" },
    NamedColor { name: "pink", hex: "#DA62AC" },
    NamedColor { name: "white", hex: "white" },
    NamedColor { name: "gray", hex: "gray" },
];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ColoredIcon {
    pub icon: Icon,
    pub color: NamedColor,
}

impl ColoredIcon {
    /// Whether the two pairs share an icon, a color name or a color value.
    pub fn clashes_with(&self, other: &ColoredIcon) -> bool {
        self.icon == other.icon
            || self.color.name == other.color.name
            || self.color.hex == other.color.hex
    }
}

/// Draws `count` pairs with no shared icon or color, retrying clashing draws.
///
/// `count` must not exceed the number of colors, otherwise no valid set exists.
pub fn draw_icon_set<R: Rng>(count: usize, rng: &mut R) -> Vec<ColoredIcon> {
    let count = count.min(COLORS.len());
    let mut set: Vec<ColoredIcon> = Vec::with_capacity(count);
    while set.len() < count {
        let candidate = ColoredIcon {
            icon: Icon::ALL[rng.random_range(0..Icon::ALL.len())],
            color: COLORS[rng.random_range(0..COLORS.len())],
        };
        if !set.iter().any(|chosen| chosen.clashes_with(&candidate)) {
            set.push(candidate);
        }
    }
    set
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPickerConfig {
    pub icons: u32,
    /// Seconds for naming the colors.
    pub type_time: u32,
    /// Seconds to memorize the icons.
    pub view_time: u32,
}

impl ColorPickerConfig {
    pub fn new(icons: u32, type_time: u32, view_time: u32) -> Self {
        Self {
            icons: icons.clamp(1, COLORS.len() as u32),
            type_time: type_time.clamp(1, 600),
            view_time: view_time.clamp(1, 600),
        }
    }
}

impl Default for ColorPickerConfig {
    fn default() -> Self {
        Self::new(3, 7, 6)
    }
}

impl FromPayload for ColorPickerConfig {
    fn from_payload(payload: &Value) -> Self {
        let payload = Payload::new(payload);
        let default = Self::default();
        Self::new(
            payload.count("icons", default.icons),
            payload.count("typeTime", default.type_time),
            payload.count("viewTime", default.view_time),
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorPickerAction {
    Answer(String),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ColorPicker {
    /// Every shuffle round in order; the last one is the set to remember.
    shuffles: Vec<Vec<ColoredIcon>>,
    /// Icons not asked yet.
    remaining: Vec<ColoredIcon>,
    /// Icon being asked, `None` while viewing.
    current: Option<ColoredIcon>,
    verdict: Option<Verdict>,
}

impl ColorPicker {
    pub fn from_shuffles(shuffles: Vec<Vec<ColoredIcon>>) -> Self {
        let remaining = shuffles.last().cloned().unwrap_or_default();
        Self {
            shuffles,
            remaining,
            current: None,
            verdict: None,
        }
    }

    pub fn shuffles(&self) -> &[Vec<ColoredIcon>] {
        &self.shuffles
    }

    /// Icons the player has to remember.
    pub fn icons(&self) -> &[ColoredIcon] {
        self.shuffles.last().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn current(&self) -> Option<ColoredIcon> {
        self.current
    }

    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    /// Moves a random remaining icon out of the pool and asks for it.
    pub fn ask_next<R: Rng>(&mut self, rng: &mut R) {
        self.current = if self.remaining.is_empty() {
            None
        } else {
            Some(self.remaining.swap_remove(rng.random_range(0..self.remaining.len())))
        };
    }

    pub fn answer<R: Rng>(&mut self, text: &str, rng: &mut R) -> Result<MoveOutcome> {
        check_open(self.verdict)?;
        let Some(current) = self.current else {
            log::trace!("Answer while viewing");
            return Ok(MoveOutcome::NoChange);
        };

        if !current.color.name.eq_ignore_ascii_case(text.trim()) {
            log::debug!("Lose: {:?} was {}, got {:?}", current.icon, current.color, text);
            self.verdict = Some(Verdict::Lost);
            return Ok(MoveOutcome::Lost);
        }

        if self.remaining.is_empty() {
            log::debug!("Win: All icons named");
            self.verdict = Some(Verdict::Won);
            return Ok(MoveOutcome::Won);
        }
        self.ask_next(rng);
        Ok(MoveOutcome::Accepted)
    }
}

impl Puzzle for ColorPicker {
    type Config = ColorPickerConfig;
    type Action = ColorPickerAction;

    const KIND: MinigameKind = MinigameKind::ColorPicker;

    fn generate<R: Rng>(config: &Self::Config, rng: &mut R) -> Self {
        let shuffles = (0..SHUFFLE_ROUNDS)
            .map(|_| draw_icon_set(config.icons as usize, rng))
            .collect();
        Self::from_shuffles(shuffles)
    }

    /// The view phase covers the shuffle animation too.
    fn phases(config: &Self::Config) -> Vec<Phase> {
        let shuffle = SHUFFLE_STEP * SHUFFLE_ROUNDS as u32;
        vec![
            Phase::timed(seconds(config.view_time) + shuffle)
                .with_interval(SHUFFLE_STEP)
                .then_next(),
            Phase::timed(seconds(config.type_time)),
        ]
    }

    fn begin_phase<R: Rng>(&mut self, phase: usize, rng: &mut R) {
        if phase == 1 {
            self.ask_next(rng);
        }
    }

    fn apply<R: Rng>(
        &mut self,
        action: Self::Action,
        _now: Timestamp,
        rng: &mut R,
    ) -> Result<MoveOutcome> {
        match action {
            ColorPickerAction::Answer(text) => self.answer(&text, rng),
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

    fn pair(icon: Icon, color: usize) -> ColoredIcon {
        ColoredIcon {
            icon,
            color: COLORS[color],
        }
    }

    #[test]
    fn icon_sets_never_share_icons_or_colors() {
        let mut rng = SmallRng::seed_from_u64(1);
        for count in 1..=10 {
            let set = draw_icon_set(count, &mut rng);
            assert_eq!(set.len(), count);
            for (i, a) in set.iter().enumerate() {
                for b in &set[i + 1..] {
                    assert!(!a.clashes_with(b), "{a:?} clashes with {b:?}");
                }
            }
        }
        // more than the palette allows is capped
        assert_eq!(draw_icon_set(11, &mut rng).len(), 10);
    }

    #[test]
    fn generated_board_keeps_every_shuffle() {
        let mut rng = SmallRng::seed_from_u64(2);
        let board = ColorPicker::generate(&ColorPickerConfig::default(), &mut rng);

        assert_eq!(board.shuffles().len(), SHUFFLE_ROUNDS);
        assert_eq!(board.icons().len(), 3);
        assert_eq!(board.remaining(), 3);
        assert_eq!(board.current(), None);
    }

    #[test]
    fn answers_while_viewing_are_ignored() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut board = ColorPicker::from_shuffles(vec![vec![pair(Icon::Bug, 0)]]);

        assert_eq!(board.answer("red", &mut rng).unwrap(), MoveOutcome::NoChange);
        assert_eq!(board.verdict(), None);
    }

    #[test]
    fn naming_every_icon_wins() {
        let mut rng = SmallRng::seed_from_u64(4);
        let mut board =
            ColorPicker::from_shuffles(vec![vec![pair(Icon::Bug, 0), pair(Icon::Wifi, 1)]]);
        board.begin_phase(1, &mut rng);

        let first = board.current().unwrap();
        let shouted = first.color.name.to_uppercase();
        assert_eq!(board.answer(&shouted, &mut rng).unwrap(), MoveOutcome::Accepted);

        let second = board.current().unwrap();
        assert_ne!(second.icon, first.icon);
        assert_eq!(board.answer(second.color.name, &mut rng).unwrap(), MoveOutcome::Won);
    }

    #[test]
    fn wrong_color_loses() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut board = ColorPicker::from_shuffles(vec![vec![pair(Icon::Bomb, 3)]]);
        board.begin_phase(1, &mut rng);

        assert_eq!(board.answer("blue", &mut rng).unwrap(), MoveOutcome::Lost);
        assert_eq!(board.answer("green", &mut rng), Err(GameError::AlreadyEnded));
    }

    #[test]
    fn view_phase_leads_into_typing_phase() {
        let phases = ColorPicker::phases(&ColorPickerConfig::new(3, 7, 6));

        assert_eq!(phases.len(), 2);
        assert_eq!(phases[0].expiry, Expiry::NextPhase);
        assert_eq!(phases[0].duration, Duration::from_millis(8500));
        assert_eq!(phases[1].duration, Duration::from_secs(7));
        assert_eq!(phases[1].expiry, Expiry::Lose);
    }
}
