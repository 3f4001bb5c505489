//! Minimum boost search.
//!
//! Finds the smallest attack bonus that lets one side win. Each trial builds
//! a fresh [`Battle`] from the untouched [`Scenario`], so trials are
//! independent. A draw counts as a loss for the boosted side.
//!
//! Victory is not monotonic in the boost (a larger bonus can turn a win into
//! a stalemate), so the search is linear.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::battle::{Battle, Boost, Outcome, Side};
use crate::damage::DamageTypeSet;
use crate::error::{GameError, Result};
use crate::scenario::Scenario;

/// Highest boost tried unless configured otherwise.
pub const DEFAULT_BOOST_CEILING: u32 = 65_536;

/// Parameters of a boost search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoostSearch {
    /// Side receiving the boost.
    pub side: Side,
    /// First boost tried.
    pub floor: u32,
    /// Last boost tried, inclusive.
    pub ceiling: u32,
}

impl Default for BoostSearch {
    fn default() -> Self {
        Self::new(Side::A)
    }
}

/// Result of a successful search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoostResult {
    /// Smallest winning boost.
    pub boost: u32,
    /// Outcome of the battle at that boost.
    pub outcome: Outcome,
    /// Battles fought to find it.
    pub trials: u64,
}

impl BoostSearch {
    /// Search from zero up to [`DEFAULT_BOOST_CEILING`] for `side`.
    #[must_use]
    pub const fn new(side: Side) -> Self {
        Self {
            side,
            floor: 0,
            ceiling: DEFAULT_BOOST_CEILING,
        }
    }

    /// Builder method to set the first boost tried.
    #[must_use]
    pub const fn with_floor(mut self, floor: u32) -> Self {
        self.floor = floor;
        self
    }

    /// Builder method to set the last boost tried.
    #[must_use]
    pub const fn with_ceiling(mut self, ceiling: u32) -> Self {
        self.ceiling = ceiling;
        self
    }

    /// Fail fast when no boost can ever win.
    ///
    /// The boosted side cannot win if some opposing group is immune to every
    /// attack type it fields.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Unwinnable`].
    pub fn check_winnable(&self, scenario: &Scenario) -> Result<()> {
        let attack_types: DamageTypeSet = scenario
            .army(self.side)
            .groups
            .iter()
            .filter(|g| g.units > 0)
            .map(|g| g.attack_type)
            .collect();

        let blocked = scenario
            .army(self.side.opponent())
            .groups
            .iter()
            .filter(|g| g.units > 0)
            .any(|g| attack_types.is_subset(g.immunities));

        if blocked {
            return Err(GameError::Unwinnable { side: self.side });
        }
        Ok(())
    }

    /// Whether `outcome` counts as a win for the boosted side.
    #[must_use]
    pub fn is_win(&self, outcome: &Outcome) -> bool {
        outcome.is_victory_for(self.side)
    }

    /// Run the linear search.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Unwinnable`] when no boost can win, or
    /// [`GameError::BoostNotFound`] when the range holds no winning boost.
    pub fn run(&self, scenario: &Scenario) -> Result<BoostResult> {
        self.check_winnable(scenario)?;

        let mut trials = 0;
        for amount in self.floor..=self.ceiling {
            trials += 1;
            let outcome = run_trial(scenario, Boost::new(self.side, amount))?;
            debug!(boost = amount, %outcome, "Boost trial");
            if self.is_win(&outcome) {
                info!(boost = amount, trials, %outcome, "Found minimum boost");
                return Ok(BoostResult {
                    boost: amount,
                    outcome,
                    trials,
                });
            }
        }

        Err(GameError::BoostNotFound {
            side: self.side,
            floor: self.floor,
            ceiling: self.ceiling,
        })
    }
}

/// Fight one complete battle with `boost`.
///
/// # Errors
///
/// Returns an error if the scenario fails validation.
pub fn run_trial(scenario: &Scenario, boost: Boost) -> Result<Outcome> {
    Ok(Battle::new(scenario, boost)?.run())
}
