//! Vela CLI
//!
//! Replays scripted page scenarios against a headless page and prints the
//! page runtime's state after every step.
//!
//! ```text
//! vela replay demos/landing.toml --config demos/page.toml -v
//! vela check demos/landing.toml
//! ```

mod replay;
mod scenario;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::scenario::Scenario;

/// Replay scripted scenarios against the Vela page runtime
#[derive(Parser, Debug)]
#[command(name = "vela")]
#[command(about = "Replay scripted scenarios against the Vela page runtime")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a scenario and print a JSON snapshot per step
    Replay {
        /// Scenario file
        scenario: PathBuf,

        /// Page config (page.toml), overriding the scenario's own
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Validate a scenario and its config without running it
    Check {
        /// Scenario file
        scenario: PathBuf,

        /// Page config (page.toml), overriding the scenario's own
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    // RUST_LOG wins unless -v was given
    let filter = if verbose == 0 {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Replay { scenario, config } => cmd_replay(&scenario, config.as_deref()),
        Commands::Check { scenario, config } => cmd_check(&scenario, config.as_deref()),
    }
}

fn cmd_replay(path: &Path, config: Option<&Path>) -> Result<()> {
    let scenario = Scenario::load(path)?;
    let config = scenario.page_config(config)?;
    tracing::info!(
        scenario = %path.display(),
        steps = scenario.steps.len(),
        "replaying"
    );

    let reports = replay::replay(&scenario, &config)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for report in &reports {
        let line = serde_json::to_string(report).context("Failed to serialize snapshot")?;
        writeln!(out, "{line}")?;
    }
    Ok(())
}

fn cmd_check(path: &Path, config: Option<&Path>) -> Result<()> {
    let scenario = Scenario::load(path)?;
    let config = scenario.page_config(config)?;
    let (elements, steps) = replay::check(&scenario, &config)?;
    println!(
        "{}: ok ({} elements, {} steps)",
        path.display(),
        elements,
        steps
    );
    Ok(())
}
