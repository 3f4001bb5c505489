//! Parallel boost search.
//!
//! Trials share nothing but the immutable [`Scenario`], so a window of
//! consecutive boosts can be fought on rayon workers at once. Windows are
//! scanned in order and each window's outcomes are inspected in boost order,
//! so the answer is always the one the linear search would give, even though
//! victory is not monotonic in the boost.

use std::time::Instant;

use immune_core::battle::{Boost, Outcome};
use immune_core::boost::{run_trial, BoostResult};
use immune_core::error::GameError;
use immune_core::scenario::Scenario;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{ConfigError, SimConfig};

/// Error during a parallel search.
#[derive(Error, Debug)]
pub enum BatchError {
    /// The search itself failed.
    #[error(transparent)]
    Game(#[from] GameError),
    /// The settings were rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The worker pool could not be built.
    #[error("Failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result of a parallel search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelSearch {
    /// Same answer the linear search gives, `trials` included.
    pub result: BoostResult,
    /// Battles actually fought, including the rest of the final window.
    pub battles_fought: u64,
    /// Windows evaluated.
    pub windows: u32,
}

/// Run the boost search described by `config` in parallel windows.
///
/// Uses a dedicated pool when `config.threads` is nonzero, otherwise the
/// global rayon pool.
pub fn parallel_search(scenario: &Scenario, config: &SimConfig) -> Result<ParallelSearch, BatchError> {
    config.validate()?;

    if config.threads > 0 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads as usize)
            .build()?;
        pool.install(|| search_windows(scenario, config))
    } else {
        search_windows(scenario, config)
    }
}

fn search_windows(scenario: &Scenario, config: &SimConfig) -> Result<ParallelSearch, BatchError> {
    let search = config.search();
    search.check_winnable(scenario)?;

    let start_time = Instant::now();
    let mut battles_fought = 0u64;
    let mut windows = 0u32;
    let mut start = search.floor;

    while start <= search.ceiling {
        let end = start
            .saturating_add(config.window.saturating_sub(1))
            .min(search.ceiling);
        windows += 1;

        let outcomes: Vec<(u32, Result<Outcome, GameError>)> = (start..=end)
            .into_par_iter()
            .map(|amount| (amount, run_trial(scenario, Boost::new(search.side, amount))))
            .collect();
        battles_fought += outcomes.len() as u64;
        debug!(start, end, windows, "Window evaluated");

        for (amount, outcome) in outcomes {
            let outcome = outcome?;
            if search.is_win(&outcome) {
                let result = BoostResult {
                    boost: amount,
                    outcome,
                    trials: u64::from(amount - search.floor) + 1,
                };
                info!(
                    boost = amount,
                    battles_fought,
                    windows,
                    elapsed_ms = start_time.elapsed().as_millis() as u64,
                    %outcome,
                    "Found minimum boost"
                );
                return Ok(ParallelSearch {
                    result,
                    battles_fought,
                    windows,
                });
            }
        }

        match end.checked_add(1) {
            Some(next) => start = next,
            None => break,
        }
    }

    Err(GameError::BoostNotFound {
        side: search.side,
        floor: search.floor,
        ceiling: search.ceiling,
    }
    .into())
}
