use core::time::Duration;
use std::io::Write;

use anyhow::Result;
use minihack_core::{AnyController, Effects, MinigameKind, PlayerAction, SessionMode, Timer};
use minihack_protocol::{Inbound, Outbound, PlayMinigame, Sound, StatusUpdate};
use web_time::Instant;

/// Sounds requested by the controller since the last flush.
#[derive(Debug, Default)]
pub struct SoundQueue {
    sounds: Vec<Sound>,
}

impl Effects for SoundQueue {
    fn on_win(&mut self) {
        self.sounds.push(Sound::Success);
    }

    fn on_lose(&mut self) {
        self.sounds.push(Sound::Failed);
    }

    fn on_key_press(&mut self) {
        self.sounds.push(Sound::KeyPress);
    }
}

/// Pending controller timers keyed by their deadline.
#[derive(Debug, Default)]
pub struct TimerQueue {
    entries: Vec<(Instant, Timer)>,
}

impl TimerQueue {
    pub fn schedule(&mut self, now: Instant, timer: Timer) {
        self.entries.push((now + timer.delay, timer));
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().map(|(deadline, _)| *deadline).min()
    }

    /// Removes and returns timers due at `now`, earliest first.
    pub fn pop_due(&mut self, now: Instant) -> Vec<Timer> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.entries.drain(..).partition(|(deadline, _)| *deadline <= now);
        self.entries = pending;
        due.sort_by_key(|(deadline, _)| *deadline);
        due.into_iter().map(|(_, timer)| timer).collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Headless host shell: turns inbound lines into controller calls and controller state into
/// outbound lines.
#[derive(Debug)]
pub struct Session<W: Write> {
    controller: Option<AnyController<SoundQueue>>,
    mode: SessionMode,
    seed: u64,
    rounds_started: u64,
    timers: TimerQueue,
    started_at: Instant,
    out: W,
}

impl<W: Write> Session<W> {
    pub fn new(mode: SessionMode, seed: u64, out: W) -> Self {
        Self {
            controller: None,
            mode,
            seed,
            rounds_started: 0,
            timers: TimerQueue::default(),
            started_at: Instant::now(),
            out,
        }
    }

    pub fn controller(&self) -> Option<&AnyController<SoundQueue>> {
        self.controller.as_ref()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Handles one inbound line. Malformed lines are logged and skipped.
    pub fn handle_line(&mut self, line: &str) -> Result<()> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }

        match Inbound::parse(line) {
            Ok(inbound) => self.handle(inbound),
            Err(err) => {
                log::warn!("Ignoring malformed message {line:?}: {err}");
                Ok(())
            }
        }
    }

    pub fn handle(&mut self, inbound: Inbound) -> Result<()> {
        match inbound {
            Inbound::PlayMinigame(play) => self.play(play),
            Inbound::NavigateMinigame(nav) => {
                log::info!("Host navigated to {}", nav.minigame);
                Ok(())
            }
            Inbound::Input(data) => self.input(data),
        }
    }

    /// Starts `kind` with default settings, as if the host had asked for it.
    pub fn play_default(&mut self, kind: MinigameKind) -> Result<()> {
        self.play(PlayMinigame {
            minigame: kind.name().to_owned(),
            data: serde_json::Value::Null,
        })
    }

    fn play(&mut self, play: PlayMinigame) -> Result<()> {
        let kind: MinigameKind = match play.minigame.parse() {
            Ok(kind) => kind,
            Err(err) => {
                log::warn!("{err}");
                return Ok(());
            }
        };

        if let Some(controller) = self.controller.as_mut().filter(|c| c.kind() == kind) {
            controller.handle_play(kind, &play.data);
        } else {
            self.timers.clear();
            let seed = self.seed.wrapping_add(self.rounds_started);
            self.rounds_started += 1;
            log::debug!("Starting {kind} with seed {seed}");
            self.controller = Some(AnyController::for_play(
                kind,
                &play.data,
                self.mode,
                seed,
                SoundQueue::default(),
            ));
        }
        self.sync()
    }

    fn input(&mut self, data: serde_json::Value) -> Result<()> {
        let action: PlayerAction = match serde_json::from_value(data) {
            Ok(action) => action,
            Err(err) => {
                log::warn!("Ignoring malformed input: {err}");
                return Ok(());
            }
        };
        let now = self.elapsed_ms();
        let Some(controller) = self.controller.as_mut() else {
            log::trace!("Dropping input, no minigame selected");
            return Ok(());
        };

        match controller.act(action, now) {
            Ok(outcome) if !outcome.has_update() => Ok(()),
            Ok(_) => self.sync(),
            Err(err) => {
                log::warn!("Input rejected: {err}");
                Ok(())
            }
        }
    }

    /// Fires every timer due at `now`.
    pub fn fire_due(&mut self, now: Instant) -> Result<()> {
        let due = self.timers.pop_due(now);
        if due.is_empty() {
            return Ok(());
        }
        if let Some(controller) = self.controller.as_mut() {
            for timer in due {
                controller.fire(timer);
            }
        }
        self.sync()
    }

    /// Moves controller output into the timer queue and onto the wire.
    fn sync(&mut self) -> Result<()> {
        let now = Instant::now();
        let Some(controller) = self.controller.as_mut() else {
            return Ok(());
        };

        for timer in controller.drain_timers() {
            self.timers.schedule(now, timer);
        }
        let sounds = core::mem::take(&mut controller.effects_mut().sounds);
        let reports = controller.drain_reports();

        let countdown = controller.countdown();
        let update = StatusUpdate {
            minigame: controller.kind().name().to_owned(),
            status: controller.status().into(),
            phase: controller.phase(),
            remaining_ms: countdown.remaining().as_millis().try_into().unwrap_or(u64::MAX),
            progress: countdown.progress(),
            board: controller.board()?,
        };

        for sound in sounds {
            self.send(&Outbound::Effect { sound })?;
        }
        self.send(&Outbound::Status(update))?;
        for report in reports {
            log::info!("{} finished, success: {}", report.minigame, report.success);
            self.send(&Outbound::finished(report.success))?;
        }
        Ok(())
    }

    fn send(&mut self, message: &Outbound) -> Result<()> {
        writeln!(self.out, "{}", message.to_line()?)?;
        self.out.flush()?;
        Ok(())
    }

    fn elapsed_ms(&self) -> u64 {
        let elapsed: Duration = self.started_at.elapsed();
        elapsed.as_millis().try_into().unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minihack_core::{GameStatus, TimerKind};
    use serde_json::{Value, json};

    fn lines(out: &[u8]) -> Vec<Value> {
        std::str::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    fn session() -> Session<Vec<u8>> {
        Session::new(SessionMode::Hosted, 7, Vec::new())
    }

    #[test]
    fn play_request_starts_round_and_reports_status() {
        let mut session = session();

        session
            .handle_line(r#"{"action":"playMinigame","data":{"minigame":"chopping","data":{"letters":4}}}"#)
            .unwrap();

        let controller = session.controller().unwrap();
        assert_eq!(controller.kind(), MinigameKind::Chopping);
        assert_eq!(controller.status(), GameStatus::Running);
        assert_eq!(session.timers.len(), 1);

        let sent = lines(&session.out);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["action"], "status");
        assert_eq!(sent[0]["data"]["status"], 1);
        assert_eq!(sent[0]["data"]["board"]["letters"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn unknown_minigame_and_garbage_are_ignored() {
        let mut session = session();

        session
            .handle_line(r#"{"action":"playMinigame","data":{"minigame":"minesweeper"}}"#)
            .unwrap();
        session.handle_line("{{{").unwrap();
        session.handle_line("").unwrap();

        assert!(session.controller().is_none());
        assert!(session.out.is_empty());
    }

    #[test]
    fn input_for_running_round_emits_sound_and_status() {
        let mut session = session();
        session.play_default(MinigameKind::WordMemory).unwrap();
        session.out.clear();

        session
            .handle_line(r#"{"action":"input","data":{"minigame":"word-memory","action":"New"}}"#)
            .unwrap();

        let sent = lines(&session.out);
        assert_eq!(sent[0], json!({ "action": "effect", "data": { "sound": "keyPress" } }));
        assert_eq!(sent[1]["data"]["board"]["round"], 1);
    }

    #[test]
    fn hosted_loss_reports_finished_after_reset_delay() {
        let mut session = session();
        session.play_default(MinigameKind::WordMemory).unwrap();
        // nothing has been seen yet, so claiming so loses
        session
            .handle_line(r#"{"action":"input","data":{"minigame":"word-memory","action":"Seen"}}"#)
            .unwrap();
        assert_eq!(session.controller().unwrap().status(), GameStatus::Lost);

        // the stale countdown tick is due first and must not get in the way
        assert!(session.next_deadline().is_some());
        session.fire_due(Instant::now() + Duration::from_secs(5)).unwrap();

        let sent = lines(&session.out);
        assert_eq!(
            sent.last().unwrap(),
            &json!({ "action": "finishedMinigame", "data": { "result": false } })
        );
        assert_eq!(session.controller().unwrap().status(), GameStatus::Idle);
        assert_eq!(session.next_deadline(), None);
    }

    #[test]
    fn switching_minigame_drops_old_timers() {
        let mut session = session();
        session.play_default(MinigameKind::Chopping).unwrap();
        session.play_default(MinigameKind::Lockpick).unwrap();

        assert_eq!(session.timers.len(), 1);
        assert_eq!(session.controller().unwrap().kind(), MinigameKind::Lockpick);
    }

    #[test]
    fn timer_queue_pops_in_deadline_order() {
        let start = Instant::now();
        let timer = |kind, ms| Timer {
            kind,
            generation: 0,
            delay: Duration::from_millis(ms),
        };
        let mut queue = TimerQueue::default();
        queue.schedule(start, timer(TimerKind::AutoReset, 3000));
        queue.schedule(start, timer(TimerKind::CountdownTick, 1000));

        assert_eq!(queue.next_deadline(), Some(start + Duration::from_millis(1000)));
        assert!(queue.pop_due(start).is_empty());

        let due = queue.pop_due(start + Duration::from_secs(5));
        assert_eq!(
            due.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![TimerKind::CountdownTick, TimerKind::AutoReset]
        );
        assert_eq!(queue.len(), 0);
    }
}
