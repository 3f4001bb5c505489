//! Battle execution for the CLI.

use immune_core::battle::{Battle, Boost, Side};
use immune_core::error::{GameError, Result};
use immune_core::scenario::Scenario;
use tracing::{debug, info, warn};

use crate::report::{BattleReport, ValidateReport, VerifyReport};

/// Fight one battle to the end, logging each round.
pub fn run_battle(scenario: &Scenario, boost: Boost) -> Result<BattleReport> {
    let mut battle = Battle::new(scenario, boost)?;
    info!(
        side = %boost.side,
        boost = boost.amount,
        units_a = battle.units(Side::A),
        units_b = battle.units(Side::B),
        "Starting battle"
    );

    while !battle.is_resolved() {
        let report = battle.fight();
        debug!(
            round = report.round,
            strikes = report.strikes.len(),
            units_killed = report.units_killed,
            "Round"
        );
    }

    BattleReport::from_battle(&battle)
        .ok_or_else(|| GameError::InvalidState("battle ended unresolved".to_string()))
}

/// Per-round state hashes of one full battle, the starting state first.
pub fn round_hashes(scenario: &Scenario, boost: Boost) -> Result<Vec<u64>> {
    let mut battle = Battle::new(scenario, boost)?;
    let mut hashes = vec![battle.state_hash()];
    while !battle.is_resolved() {
        battle.fight();
        hashes.push(battle.state_hash());
    }
    Ok(hashes)
}

/// Fight the same battle `runs` times and compare hashes round by round.
///
/// Also snapshots a fresh battle halfway through, restores it from bincode
/// and checks that it finishes on the same hash.
pub fn verify(scenario: &Scenario, boost: Boost, runs: u32) -> Result<VerifyReport> {
    let runs = runs.max(1);
    let reference = round_hashes(scenario, boost)?;
    let mut final_hashes = vec![last_hash(&reference)?];
    let mut first_divergence = None;

    for run in 1..runs {
        let hashes = round_hashes(scenario, boost)?;
        final_hashes.push(last_hash(&hashes)?);
        if let Some(round) = divergence(&reference, &hashes) {
            warn!(run, round, "Run diverged");
            first_divergence = Some(first_divergence.map_or(round, |r: u32| r.min(round)));
        }
    }

    let snapshot_matches = snapshot_round_trip(scenario, boost)? == last_hash(&reference)?;
    let rounds = u32::try_from(reference.len() - 1).unwrap_or(u32::MAX);
    debug!(runs, rounds, snapshot_matches, "Verification complete");

    Ok(VerifyReport {
        runs,
        rounds,
        final_hashes,
        first_divergence,
        snapshot_matches,
    })
}

/// Parse-level checks only: the scenario already validated on load.
pub fn validate(scenario: &Scenario) -> ValidateReport {
    ValidateReport {
        armies: scenario
            .armies
            .iter()
            .map(|army| (army.name.clone(), army.groups.len(), army.total_units()))
            .collect(),
    }
}

fn last_hash(hashes: &[u64]) -> Result<u64> {
    hashes
        .last()
        .copied()
        .ok_or_else(|| GameError::InvalidState("no state recorded".to_string()))
}

fn divergence(reference: &[u64], other: &[u64]) -> Option<u32> {
    let len = reference.len().max(other.len());
    (0..len)
        .find(|&i| reference.get(i) != other.get(i))
        .map(|i| u32::try_from(i).unwrap_or(u32::MAX))
}

fn snapshot_round_trip(scenario: &Scenario, boost: Boost) -> Result<u64> {
    let rounds = {
        let mut probe = Battle::new(scenario, boost)?;
        probe.run();
        probe.round()
    };

    let mut battle = Battle::new(scenario, boost)?;
    for _ in 0..rounds / 2 {
        battle.fight();
    }
    let bytes = battle.serialize()?;
    let mut restored = Battle::deserialize(&bytes)?;
    restored.run();
    Ok(restored.state_hash())
}
