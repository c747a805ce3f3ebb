//! Command-line runner.
//!
//! Usage:
//!   rust-set [OPTIONS]
//!
//! Options:
//!   -c, --config     TOML configuration file (defaults apply when omitted)
//!       --humans     Override the number of human players
//!       --computers  Override the number of computer players
//!   -s, --seed       Override the RNG seed
//!   -r, --run-for    Stop the game after this many seconds
//!       --hints      Log every legal claim whenever cards are dealt
//!
//! Human players type `<player> <slot>` lines on stdin. Set `RUST_LOG` to
//! control log output (default `info`).

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rust_set::{ClassicSet, Game, GameConfig, PlayerHandle, PlayerId, PlayerMap, Slot, TracingDisplay};

#[derive(Parser, Debug)]
#[command(author, version, about = "Real-time Set card game engine")]
struct Args {
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    humans: Option<usize>,

    #[arg(long)]
    computers: Option<usize>,

    #[arg(short, long)]
    seed: Option<u64>,

    #[arg(short, long)]
    run_for: Option<u64>,

    #[arg(long)]
    hints: bool,
}

fn load_config(args: &Args) -> anyhow::Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(humans) = args.humans {
        config.human_players = humans;
    }
    if let Some(computers) = args.computers {
        config.computer_players = computers;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.hints {
        config.hints = true;
    }
    config.validate()?;
    Ok(config)
}

/// Parse a `<player> <slot>` input line.
fn parse_press(line: &str) -> Option<(PlayerId, Slot)> {
    let mut parts = line.split_whitespace();
    let player = parts.next()?.parse().ok()?;
    let slot = parts.next()?.parse().ok()?;
    parts.next().is_none().then_some((PlayerId(player), Slot(slot)))
}

/// Feed stdin presses to the game until stdin closes.
fn forward_stdin(players: PlayerMap<PlayerHandle>) -> std::io::Result<()> {
    thread::Builder::new().name("stdin".into()).spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            match parse_press(&line) {
                Some((player, slot)) => {
                    let delivered = players.get(player).is_some_and(|handle| handle.key_pressed(slot));
                    if !delivered {
                        warn!(%player, "press not delivered");
                    }
                }
                None if line.trim().is_empty() => {}
                None => warn!(input = %line.trim(), "expected `<player> <slot>`"),
            }
        }
    })?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_config(&args).context("invalid configuration")?;
    let oracle = ClassicSet::from_config(&config)?;
    let names = (0..config.player_count())
        .map(|i| config.player_name(PlayerId(i as u8)))
        .collect();

    info!(
        humans = config.human_players,
        computers = config.computer_players,
        seed = config.seed,
        "starting game"
    );

    let humans = config.human_players;
    let game = Game::start(
        config,
        Arc::new(oracle),
        Arc::new(TracingDisplay::with_names(names)),
    )?;

    if humans > 0 {
        forward_stdin(game.players().clone()).context("failed to start input thread")?;
    }

    if let Some(secs) = args.run_for {
        let deadline = Instant::now() + Duration::from_secs(secs);
        while !game.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(50));
        }
        game.terminate();
    }

    let outcome = game.join()?;

    for (player, score) in outcome.scores.iter() {
        println!("{player}: {score}");
    }
    let winners: Vec<String> = outcome.winners.iter().map(ToString::to_string).collect();
    println!("winners: {}", winners.join(", "));
    Ok(())
}
