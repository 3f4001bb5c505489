//! Immune system battle runner.
//!
//! # Usage
//!
//! ```bash
//! # Fight the built-in sample with no boost
//! cargo run -p immune_headless -- fight
//!
//! # Fight a roster file with a boost for side A
//! cargo run -p immune_headless -- fight --input input.txt --boost 42 --side a
//!
//! # Sides can also be named after their army
//! cargo run -p immune_headless -- search --side infection
//!
//! # Minimum boost search, parallel windows of 128 boosts
//! cargo run -p immune_headless -- search --input input.txt --parallel --window 128
//!
//! # Determinism check
//! cargo run -p immune_headless -- verify --runs 5
//!
//! # Parse and validate only
//! cargo run -p immune_headless -- validate --input scenario.ron
//! ```
//!
//! Results go to stdout (text, or JSON with `--json`); logs go to stderr.

use std::fmt::Display;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use immune_core::battle::{Boost, Side};
use immune_core::error::GameError;
use immune_core::scenario::Scenario;
use immune_headless::{
    batch::{parallel_search, BatchError},
    config::{ConfigError, SimConfig},
    report::{to_json, SearchReport},
    runner,
    scenario_loader::{load_or_sample, ScenarioError},
};

#[derive(Parser)]
#[command(name = "immune_headless")]
#[command(about = "Immune system battle simulator and boost search")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Roster file (.ron for RON, anything else for text); defaults to the built-in sample
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,

    /// RON config file; flags override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fight a single battle
    Fight {
        /// Attack bonus for the boosted side
        #[arg(short, long, default_value = "0")]
        boost: u32,

        /// Side receiving the boost (a, b or an army name)
        #[arg(short, long)]
        side: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Find the minimum boost that wins
    Search {
        /// First boost tried
        #[arg(long)]
        floor: Option<u32>,

        /// Last boost tried
        #[arg(long)]
        ceiling: Option<u32>,

        /// Side receiving the boost (a, b or an army name)
        #[arg(short, long)]
        side: Option<String>,

        /// Evaluate boosts in parallel windows
        #[arg(short, long)]
        parallel: bool,

        /// Boosts per parallel window
        #[arg(short, long)]
        window: Option<u32>,

        /// Worker threads for the parallel search (0 = auto)
        #[arg(short, long)]
        threads: Option<u32>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Verify determinism by fighting the same battle multiple times
    Verify {
        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,

        /// Attack bonus for the boosted side
        #[arg(short, long, default_value = "0")]
        boost: u32,

        /// Side receiving the boost (a, b or an army name)
        #[arg(short, long)]
        side: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Parse and validate the roster only
    Validate {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Batch(#[from] BatchError),
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("Failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Non-determinism detected")]
    VerifyFailed,
}

fn main() {
    let cli = Cli::parse();

    // Logs to stderr; stdout carries results
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    if let Err(e) = run(cli) {
        tracing::error!(error = %e, "Command failed");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading config");
            SimConfig::load(path)?
        }
        None => SimConfig::default(),
    };
    let scenario = load_or_sample(cli.input.as_deref())?;
    let pick_side = |token: Option<String>| -> Result<Side, CliError> {
        match token {
            Some(token) => Ok(scenario.resolve_side(&token)?),
            None => Ok(config.boosted_side),
        }
    };

    match cli.command {
        Commands::Fight { boost, side, json } => {
            cmd_fight(&scenario, Boost::new(pick_side(side)?, boost), json)
        }
        Commands::Search {
            floor,
            ceiling,
            side,
            parallel,
            window,
            threads,
            json,
        } => {
            let mut config = config.with_side(pick_side(side)?);
            if let Some(floor) = floor {
                config = config.with_floor(floor);
            }
            if let Some(ceiling) = ceiling {
                config = config.with_ceiling(ceiling);
            }
            if let Some(window) = window {
                config = config.with_window(window);
            }
            if let Some(threads) = threads {
                config = config.with_threads(threads);
            }
            config.validate()?;
            cmd_search(&scenario, &config, parallel, json)
        }
        Commands::Verify {
            runs,
            boost,
            side,
            json,
        } => cmd_verify(
            &scenario,
            Boost::new(pick_side(side)?, boost),
            runs,
            json,
        ),
        Commands::Validate { json } => emit(&runner::validate(&scenario), json),
    }
}

/// Fight a single battle
fn cmd_fight(scenario: &Scenario, boost: Boost, json: bool) -> Result<(), CliError> {
    let report = runner::run_battle(scenario, boost)?;
    emit(&report, json)
}

/// Run the minimum boost search
fn cmd_search(
    scenario: &Scenario,
    config: &SimConfig,
    parallel: bool,
    json: bool,
) -> Result<(), CliError> {
    tracing::info!(
        side = %config.boosted_side,
        floor = config.floor,
        ceiling = config.ceiling,
        parallel,
        window = config.window,
        threads = config.threads,
        "Search configuration"
    );

    let army = scenario.army(config.boosted_side).name.clone();
    let report = if parallel {
        let found = parallel_search(scenario, config)?;
        SearchReport::new(config.boosted_side, army, &found.result)
            .with_battles_fought(found.battles_fought)
    } else {
        let result = config.search().run(scenario)?;
        SearchReport::new(config.boosted_side, army, &result)
    };
    emit(&report, json)
}

/// Verify determinism
fn cmd_verify(scenario: &Scenario, boost: Boost, runs: u32, json: bool) -> Result<(), CliError> {
    tracing::info!(runs, side = %boost.side, boost = boost.amount, "Verifying determinism");
    let report = runner::verify(scenario, boost, runs)?;
    emit(&report, json)?;
    if report.passed() {
        Ok(())
    } else {
        Err(CliError::VerifyFailed)
    }
}

fn emit<T: Serialize + Display>(report: &T, json: bool) -> Result<(), CliError> {
    if json {
        println!("{}", to_json(report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}
