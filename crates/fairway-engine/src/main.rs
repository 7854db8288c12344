//! Driver binary for the Fairway simulation.
//!
//! Wires configuration, the roster, and a [`SimulationContext`] to either a
//! real-time console session or a fast-forward run.
//!
//! # Startup Sequence
//!
//! 1. Parse command-line arguments
//! 2. Load configuration from `fairway-config.yaml` (defaults if absent)
//! 3. Initialize structured logging (tracing)
//! 4. Build the context from a save file, a roster file, or built-in names
//! 5. Fast-forward to the end, or run the interactive tick loop
//!
//! In the interactive loop the virtual clock advances by
//! `tick_interval_ms * speed` on every driver tick while stdin commands are
//! applied between ticks. With `pause_on_turn` set the clock holds while the
//! human's score is outstanding.

mod commands;
mod console;
mod error;

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use fairway_core::SimulationContext;
use fairway_core::config::SimulationConfig;
use fairway_core::rng::SimRng;
use fairway_core::roster::{RosterEntry, fallback_roster, load_roster};
use fairway_core::runner::{self, RunOptions, TickCallback};
use fairway_core::score::GaussianResolver;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::commands::{Command, CommandError, HELP};
use crate::console::{ConsoleCallback, render_leaderboard, render_pending, render_status};
use crate::error::EngineError;

/// Leaderboard rows printed at the end of each round.
const BOARD_ROWS: usize = 10;

/// Mixed into the world seed for the fallback roster draw so it does not
/// share a stream with the simulation.
const ROSTER_SEED_SALT: u64 = 0x5EED_F00D;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "fairway", about = "Darts-golf tournament simulator")]
struct Args {
    /// Configuration file.
    #[arg(long, default_value = "fairway-config.yaml")]
    config: PathBuf,

    /// Roster file (`name,skill` per line); overrides `roster.path`.
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Resume from a save file.
    #[arg(long)]
    load: Option<PathBuf>,

    /// Auto-play the whole tournament and print the final standings.
    #[arg(long)]
    fast: bool,

    /// Override the world seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Start with manual play enabled.
    #[arg(long)]
    manual: bool,
}

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, the roster, a save file, or the
/// simulation itself fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 1. Load configuration.
    let mut config = load_config(&args.config)?;
    if let Some(seed) = args.seed {
        config.world.seed = seed;
    }
    if args.manual {
        config.session.manual_mode = true;
    }

    // 2. Initialize structured logging. Console output owns stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        config_found = args.config.exists(),
        stations = config.course.holes.len(),
        "fairway starting"
    );

    // 3. Build the simulation.
    let mut ctx = build_context(&args, &config)?;

    // 4. Run.
    if args.fast {
        run_fast(&mut ctx, &config)?;
    } else {
        run_interactive(&mut ctx, &config).await?;
    }

    info!(
        round = ctx.round_number(),
        now = ctx.now(),
        complete = ctx.is_tournament_complete(),
        "fairway shutdown complete"
    );
    Ok(())
}

/// Load the simulation configuration, falling back to defaults when the
/// file does not exist.
fn load_config(path: &Path) -> Result<SimulationConfig, EngineError> {
    if path.exists() {
        Ok(SimulationConfig::from_file(path)?)
    } else {
        Ok(SimulationConfig::default())
    }
}

/// Build a context from `--load`, or start a new tournament.
fn build_context(args: &Args, config: &SimulationConfig) -> Result<SimulationContext, EngineError> {
    let resolver = Box::new(GaussianResolver::from_config(&config.scoring));

    if let Some(path) = &args.load {
        let json = std::fs::read_to_string(path)?;
        let ctx = SimulationContext::import(&json, resolver)?;
        info!(
            path = %path.display(),
            round = ctx.round_number(),
            now = ctx.now(),
            "Save file loaded"
        );
        return Ok(ctx);
    }

    let entries = load_entries(args, config)?;
    info!(opponents = entries.len(), "Roster ready");
    Ok(SimulationContext::from_config(config, &entries)?)
}

/// Roster entries from `--roster`, `roster.path`, or the built-in pool.
///
/// An explicit `--roster` that fails is an error. A configured path that
/// fails is logged and replaced by built-in names.
fn load_entries(args: &Args, config: &SimulationConfig) -> Result<Vec<RosterEntry>, EngineError> {
    if let Some(path) = &args.roster {
        return Ok(load_roster(path)?);
    }

    if let Some(path) = &config.roster.path {
        match load_roster(Path::new(path)) {
            Ok(entries) => return Ok(entries),
            Err(e) => warn!(path = %path, error = %e, "Roster file unusable, using built-in names"),
        }
    }

    let mut rng = SimRng::from_seed(config.world.seed ^ ROSTER_SEED_SALT);
    Ok(fallback_roster(
        &config.roster,
        &config.session.human_name,
        &mut rng,
    ))
}

/// Auto-play the remaining tournament and print the standings.
fn run_fast(ctx: &mut SimulationContext, config: &SimulationConfig) -> Result<(), EngineError> {
    let _ = ctx.set_manual_mode(false);

    let options = RunOptions {
        step: config.driver.fast_forward_step_secs,
        max_steps: config.driver.max_steps,
        pause_on_turn: false,
        stop_at_round_end: false,
    };
    let mut callback = ConsoleCallback::new(BOARD_ROWS);
    let result = runner::fast_forward(ctx, options, &mut callback)?;
    info!(reason = ?result.reason, steps = result.steps, "Fast-forward finished");

    println!("Final standings:");
    print!("{}", render_leaderboard(&ctx.leaderboard(), usize::MAX));
    println!("Session board:");
    print!(
        "{}",
        render_leaderboard(ctx.session_board().rows(), ctx.params().session_board_size)
    );
    Ok(())
}

/// Real-time loop: advance on every driver tick, apply stdin commands
/// between ticks.
async fn run_interactive(
    ctx: &mut SimulationContext,
    config: &SimulationConfig,
) -> Result<(), EngineError> {
    let interval = Duration::from_millis(config.driver.tick_interval_ms.max(1));
    let dt = interval.as_secs_f64() * config.driver.speed;
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut callback = ConsoleCallback::new(BOARD_ROWS);
    let mut paused = false;

    println!(
        "{} - round {}. Type `help` for commands.",
        config.world.name,
        ctx.round_number()
    );
    announce_restart(ctx);
    if let Some(turn) = ctx.pending_turn() {
        println!("{}", render_pending(&turn));
    }

    info!(dt, tick_interval_ms = config.driver.tick_interval_ms, "Entering tick loop");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let hold = paused
                    || ctx.is_tournament_complete()
                    || (config.driver.pause_on_turn && ctx.pending_turn().is_some());
                if hold {
                    continue;
                }
                let summary = ctx.advance(dt)?;
                callback.on_tick(&summary, ctx);
                announce_restart(ctx);
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("stdin closed");
                    break;
                };
                match commands::parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => execute(ctx, &command, config, &mut paused, &mut callback)?,
                    Err(CommandError::Empty) => {}
                    Err(e) => println!("{e}"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }
    Ok(())
}

/// Apply one console command.
fn execute(
    ctx: &mut SimulationContext,
    command: &Command,
    config: &SimulationConfig,
    paused: &mut bool,
    callback: &mut ConsoleCallback,
) -> Result<(), EngineError> {
    match command {
        Command::Score(strokes) => {
            let Some(turn) = ctx.pending_turn() else {
                println!("No hole is waiting for your score.");
                return Ok(());
            };
            match ctx.submit_human_score(turn.pairing, *strokes) {
                Ok(_) => println!(
                    "Recorded {strokes} on hole {}.",
                    u32::from(turn.station).saturating_add(1)
                ),
                Err(e) => println!("{e}"),
            }
        }
        Command::Board => print!("{}", render_leaderboard(&ctx.leaderboard(), usize::MAX)),
        Command::Status => print!("{}", render_status(ctx)),
        Command::Session => print!(
            "{}",
            render_leaderboard(ctx.session_board().rows(), ctx.params().session_board_size)
        ),
        Command::Save(path) => {
            let json = ctx.export()?;
            std::fs::write(path, json)?;
            info!(path = %path.display(), round = ctx.round_number(), "Game saved");
            println!("Saved to {}.", path.display());
        }
        Command::Manual(enabled) => {
            if ctx.set_manual_mode(*enabled).is_some() {
                println!("Your pending hole was auto-played.");
            }
            println!("Manual play {}.", if *enabled { "on" } else { "off" });
        }
        Command::Pause => {
            *paused = true;
            println!("Paused.");
        }
        Command::Resume => {
            *paused = false;
            println!("Resumed.");
        }
        Command::Skip => {
            let options = RunOptions {
                step: config.driver.fast_forward_step_secs,
                max_steps: config.driver.max_steps,
                pause_on_turn: true,
                stop_at_round_end: true,
            };
            let result = runner::fast_forward(ctx, options, callback)?;
            println!("Skipped {} steps ({:?}).", result.steps, result.reason);
            announce_restart(ctx);
        }
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
    Ok(())
}

/// Print the new round number once after a round restart.
fn announce_restart(ctx: &mut SimulationContext) {
    if ctx.take_round_restarted() {
        println!("Round {} is teeing off.", ctx.round_number());
    }
}
