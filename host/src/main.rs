use std::io::{self, BufRead};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use minihack_core::{MinigameKind, SessionMode};
use web_time::Instant;

mod session;

use session::Session;

/// Headless shell for the hacking minigames, speaking JSON lines on stdin and stdout.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Restart rounds automatically instead of reporting results to a host
    #[arg(long)]
    standalone: bool,

    /// Start this minigame right away with default settings
    #[arg(short, long)]
    minigame: Option<MinigameKind>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .format_timestamp_millis()
        .init();

    let seed = args.seed.unwrap_or_else(rand::random);
    let mode = if args.standalone {
        SessionMode::Standalone
    } else {
        SessionMode::Hosted
    };
    log::debug!("seed: {seed}, mode: {mode:?}");

    let (lines_tx, lines_rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if lines_tx.send(line).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    log::error!("Could not read stdin: {err}");
                    break;
                }
            }
        }
    });

    let mut session = Session::new(mode, seed, io::stdout().lock());
    if let Some(kind) = args.minigame {
        session.play_default(kind)?;
    }

    loop {
        let received = match session.next_deadline() {
            Some(deadline) => {
                lines_rx.recv_timeout(deadline.saturating_duration_since(Instant::now()))
            }
            None => lines_rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(line) => session.handle_line(&line).context("Could not emit update")?,
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                log::debug!("Input closed, shutting down");
                break;
            }
        }
        session
            .fire_due(Instant::now())
            .context("Could not emit update")?;
    }

    Ok(())
}
