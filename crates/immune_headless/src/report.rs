//! Serializable command results.
//!
//! Every report prints as human-readable text through `Display`, or as JSON
//! through [`to_json`] when the CLI gets `--json`.

use std::fmt;

use immune_core::battle::{Battle, Outcome, Side};
use immune_core::boost::BoostResult;
use serde::{Deserialize, Serialize};

/// Pretty-printed JSON for any report.
pub fn to_json<T: Serialize>(report: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// Final state of one army.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmyReport {
    /// Army name from the roster.
    pub name: String,
    /// Which side it fought on.
    pub side: Side,
    /// Units left.
    pub remaining_units: u64,
    /// Groups still alive.
    pub groups_left: usize,
}

/// Result of a single battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleReport {
    /// Side that received the boost.
    pub boosted_side: Side,
    /// Boost amount.
    pub boost: u32,
    /// How it ended.
    pub outcome: Outcome,
    /// Rounds fought.
    pub rounds: u32,
    /// Both armies, in roster order.
    pub armies: Vec<ArmyReport>,
    /// Hash of the final battle state.
    pub state_hash: u64,
}

impl BattleReport {
    /// Summarize a resolved battle.
    ///
    /// Returns `None` while the battle is still in progress.
    pub fn from_battle(battle: &Battle) -> Option<Self> {
        let outcome = battle.outcome()?;
        let boost = battle.boost();
        let armies = Side::ALL
            .iter()
            .map(|&side| ArmyReport {
                name: battle.army_name(side).to_string(),
                side,
                remaining_units: battle.units(side),
                groups_left: battle.roster(side).len(),
            })
            .collect();
        Some(Self {
            boosted_side: boost.side,
            boost: boost.amount,
            outcome,
            rounds: battle.round(),
            armies,
            state_hash: battle.state_hash(),
        })
    }
}

impl fmt::Display for BattleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Boost {} to side {}: {} after {} rounds",
            self.boost, self.boosted_side, self.outcome, self.rounds
        )?;
        for army in &self.armies {
            writeln!(
                f,
                "  {} ({}): {} units in {} groups",
                army.name, army.side, army.remaining_units, army.groups_left
            )?;
        }
        write!(f, "  state hash: {:016x}", self.state_hash)
    }
}

/// Result of a minimum boost search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchReport {
    /// Side receiving the boost.
    pub side: Side,
    /// Name of that side's army.
    pub army: String,
    /// Smallest winning boost.
    pub boost: u32,
    /// Units the boosted side has left at that boost.
    pub remaining_units: u64,
    /// Boosts tried in order before the answer, the answer included.
    pub trials: u64,
    /// Battles actually fought, when the search ran in parallel.
    pub battles_fought: Option<u64>,
}

impl SearchReport {
    /// Build a report for `army` from a search result.
    pub fn new(side: Side, army: impl Into<String>, result: &BoostResult) -> Self {
        Self {
            side,
            army: army.into(),
            boost: result.boost,
            remaining_units: result.outcome.remaining_units(),
            trials: result.trials,
            battles_fought: None,
        }
    }

    /// Record how many battles the parallel search fought.
    pub fn with_battles_fought(mut self, battles: u64) -> Self {
        self.battles_fought = Some(battles);
        self
    }
}

impl fmt::Display for SearchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Minimum boost for {} (side {}): {}",
            self.army, self.side, self.boost
        )?;
        writeln!(f, "  remaining units: {}", self.remaining_units)?;
        write!(f, "  trials: {}", self.trials)?;
        if let Some(battles) = self.battles_fought {
            write!(f, " ({battles} battles fought)")?;
        }
        Ok(())
    }
}

/// Result of a determinism check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyReport {
    /// Independent runs compared.
    pub runs: u32,
    /// Rounds in each run.
    pub rounds: u32,
    /// Final state hash of each run.
    pub final_hashes: Vec<u64>,
    /// First round where any run diverged from the first.
    pub first_divergence: Option<u32>,
    /// Whether a battle restored from a mid-fight snapshot finished identically.
    pub snapshot_matches: bool,
}

impl VerifyReport {
    /// Whether every check passed.
    pub fn passed(&self) -> bool {
        self.first_divergence.is_none() && self.snapshot_matches
    }
}

impl fmt::Display for VerifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.passed() {
            writeln!(
                f,
                "PASS: All {} runs produced identical results over {} rounds",
                self.runs, self.rounds
            )?;
        } else {
            writeln!(f, "FAIL: Non-determinism detected!")?;
            if let Some(round) = self.first_divergence {
                writeln!(f, "  first divergence at round {round}")?;
            }
            if !self.snapshot_matches {
                writeln!(f, "  snapshot restore diverged")?;
            }
        }
        match self.final_hashes.first() {
            Some(hash) => write!(f, "  final hash: {hash:016x}"),
            None => write!(f, "  no runs"),
        }
    }
}

/// Result of validating a roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateReport {
    /// Per-army name, group count and total units.
    pub armies: Vec<(String, usize, u64)>,
}

impl fmt::Display for ValidateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OK")?;
        for (name, groups, units) in &self.armies {
            write!(f, "\n  {name}: {groups} groups, {units} units")?;
        }
        Ok(())
    }
}
