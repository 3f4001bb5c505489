//! Command-line runner for immune system battles.
//!
//! Loads rosters from text or RON files, fights single battles, searches for
//! the minimum winning boost (linearly or in parallel windows with rayon) and
//! checks determinism through state hashes and bincode snapshots.
//!
//! # Example
//!
//! ```bash
//! # Fight the built-in sample
//! cargo run -p immune_headless -- fight
//!
//! # Minimum boost for the immune system, in parallel
//! cargo run -p immune_headless -- search --input input.txt --parallel
//!
//! # Determinism check
//! cargo run -p immune_headless -- verify --runs 5 --boost 1570
//! ```

pub mod batch;
pub mod config;
pub mod report;
pub mod runner;
pub mod scenario_loader;

pub use batch::{parallel_search, BatchError, ParallelSearch};
pub use config::{ConfigError, SimConfig};
pub use report::{BattleReport, SearchReport, ValidateReport, VerifyReport};
pub use runner::{run_battle, verify};
pub use scenario_loader::{load, load_or_sample, ScenarioError};
