//! # Skirmish Sim
//!
//! Loads a JSON battle package, hands the party to the AI, and plays the
//! battle to its end, printing the combat log as it grows.
//!
//! ```text
//! skirmish demos/crypt.json --seed 7
//! skirmish demos/crypt.json --verbose --events
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use skirmish_core::{BattlePackage, BattleSession};
use tracing::{debug, info, Level};

// =============================================================================
// CLI Arguments
// =============================================================================

#[derive(Debug, Parser)]
#[command(name = "skirmish")]
#[command(version)]
#[command(about = "Play a Skirmish battle package to completion on autopilot", long_about = None)]
struct Args {
    /// Battle package to load (JSON)
    package: PathBuf,

    /// Override the package's dice seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Emit debug diagnostics on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Print combat events as JSON lines after each log line batch
    #[arg(long)]
    events: bool,

    /// Give up after this many `advance` calls
    #[arg(long, default_value = "500")]
    max_advances: u32,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut package = BattlePackage::load(&args.package)
        .with_context(|| format!("failed to load battle package {}", args.package.display()))?;
    package.config.autopilot_players = true;
    if let Some(seed) = args.seed {
        package.config.seed = Some(seed);
    }

    let mut session = package.start().context("failed to set up the battle")?;
    info!(
        combatants = session.arena().len(),
        seed = ?session.config().seed,
        "battle loaded"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut printed = Printed::default();
    printed.flush(&session, &mut out, args.events)?;

    let mut advances = 0;
    while session.outcome().is_none() {
        if advances >= args.max_advances {
            bail!("no outcome after {} advances (round {})", advances, session.round());
        }
        let steps = session.take_playback();
        debug!(steps = steps.len(), "playback drained");
        session.advance();
        advances += 1;
        printed.flush(&session, &mut out, args.events)?;
    }

    if let Some(outcome) = session.outcome() {
        writeln!(out, "\n{outcome} after {} round(s)", session.round())?;
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// How much of the session log has been written out.
#[derive(Debug, Default)]
struct Printed {
    lines: usize,
    events: usize,
}

impl Printed {
    fn flush(&mut self, session: &BattleSession, out: &mut impl Write, events: bool) -> Result<()> {
        let log = session.log();
        for line in &log.lines()[self.lines..] {
            writeln!(out, "{line}")?;
        }
        self.lines = log.lines().len();

        if events {
            for event in &log.events()[self.events..] {
                writeln!(out, "  {}", serde_json::to_string(event)?)?;
            }
        }
        self.events = log.events().len();
        Ok(())
    }
}
