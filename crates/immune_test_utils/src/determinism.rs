//! Determinism testing utilities.
//!
//! Provides a harness for verifying that battles produce identical results
//! given identical inputs.
//!
//! # Testing Strategy
//!
//! Sources of non-determinism a battle could pick up:
//!
//! - **Unstable sorts on tied keys**: selection and attack order both end
//!   with a group id comparison, so no two groups ever compare equal.
//!
//! - **HashMap iteration order**: targets live in a `BTreeMap`.
//!
//! - **Floating-point math**: all damage math is integer.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Single rounds replay identically
//! 2. **Property tests**: Random rosters still produce deterministic outputs
//! 3. **Parallel tests**: Running N battles on separate threads all match

use std::thread;

use immune_core::battle::Battle;

/// Upper bound on rounds for harness loops. Battles resolve long before this.
pub const MAX_ROUNDS: u32 = 100_000;

/// Run a battle twice to resolution and compare every round's state hash.
#[must_use]
pub fn verify_battle_determinism<F>(setup_fn: F) -> bool
where
    F: Fn() -> Battle,
{
    round_hashes(&mut setup_fn()) == round_hashes(&mut setup_fn())
}

/// Fight `battle` to resolution, recording the state hash after every round.
///
/// The first entry is the hash before any round is fought.
pub fn round_hashes(battle: &mut Battle) -> Vec<u64> {
    let mut hashes = vec![battle.state_hash()];
    while !battle.is_resolved() && battle.round() < MAX_ROUNDS {
        battle.fight();
        hashes.push(battle.state_hash());
    }
    hashes
}

/// Result of parallel battle runs.
#[derive(Debug, Clone)]
pub struct ParallelBattleResult {
    /// Final state hash from each battle.
    pub hashes: Vec<u64>,
    /// Number of battles run.
    pub num_battles: usize,
}

impl ParallelBattleResult {
    /// Check if all battles produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all battles matched.
    ///
    /// # Panics
    ///
    /// Panics if battles produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel battles diverged!\n\
                 Battles: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_battles,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run N battles to resolution on scoped threads and collect final hashes.
///
/// # Panics
///
/// Panics if a battle thread panics.
pub fn run_parallel_battles_scoped<F>(setup_fn: F, num_battles: usize) -> ParallelBattleResult
where
    F: Fn() -> Battle + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_battles)
            .map(|_| {
                s.spawn(|| {
                    let mut battle = setup_fn();
                    battle.run();
                    battle.state_hash()
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    ParallelBattleResult {
        hashes,
        num_battles,
    }
}

/// Compare two battle runs round-by-round, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs match, `Some(round)` if they diverge at that round.
pub fn find_first_divergence<F>(setup_fn: F) -> Option<u32>
where
    F: Fn() -> Battle,
{
    let mut first = setup_fn();
    let mut second = setup_fn();

    if first.state_hash() != second.state_hash() {
        return Some(0);
    }

    while !(first.is_resolved() && second.is_resolved()) && first.round() < MAX_ROUNDS {
        first.fight();
        second.fight();

        if first.state_hash() != second.state_hash() {
            return Some(first.round());
        }
    }

    None
}

/// Verify that a snapshot taken after `rounds` rounds resumes identically.
pub fn verify_serialization_determinism<F>(setup_fn: F, rounds: u32) -> bool
where
    F: Fn() -> Battle,
{
    let mut battle = setup_fn();
    for _ in 0..rounds {
        battle.fight();
    }

    let Ok(bytes) = battle.serialize() else {
        return false;
    };
    let Ok(mut restored) = Battle::deserialize(&bytes) else {
        return false;
    };

    restored.state_hash() == battle.state_hash() && restored.run() == battle.run()
}

/// Proptest strategies for battle testing.
///
/// These strategies generate random but valid rosters. Unit counts and
/// damage stay small so generated battles resolve quickly.
pub mod strategies {
    use immune_core::damage::{DamageType, DamageTypeSet};
    use immune_core::group::GroupSpec;
    use immune_core::scenario::{ArmySpec, Scenario};
    use proptest::prelude::*;

    /// Generate any damage type.
    pub fn arb_damage_type() -> impl Strategy<Value = DamageType> {
        prop::sample::select(DamageType::ALL.to_vec())
    }

    /// Generate any damage type set.
    pub fn arb_damage_set() -> impl Strategy<Value = DamageTypeSet> {
        prop::collection::vec(arb_damage_type(), 0..=DamageType::ALL.len())
            .prop_map(|kinds| kinds.into_iter().collect())
    }

    /// Generate disjoint (weaknesses, immunities) pairs.
    pub fn arb_modifiers() -> impl Strategy<Value = (DamageTypeSet, DamageTypeSet)> {
        prop::collection::vec(0u8..3, DamageType::ALL.len()).prop_map(|choices| {
            let mut weak = DamageTypeSet::new();
            let mut immune = DamageTypeSet::new();
            for (kind, choice) in DamageType::ALL.into_iter().zip(choices) {
                match choice {
                    1 => weak.insert(kind),
                    2 => immune.insert(kind),
                    _ => {}
                }
            }
            (weak, immune)
        })
    }

    /// Generate a valid group.
    pub fn arb_group_spec() -> impl Strategy<Value = GroupSpec> {
        (
            1u32..500,
            1u32..2000,
            arb_damage_type(),
            1u32..200,
            1u32..50,
            arb_modifiers(),
        )
            .prop_map(|(units, hp, kind, damage, initiative, (weak, immune))| {
                GroupSpec::new(units, hp, kind, damage, initiative)
                    .with_weaknesses(weak)
                    .with_immunities(immune)
            })
    }

    /// Generate an army of 1 to `max_groups` groups.
    pub fn arb_army(name: &'static str, max_groups: usize) -> impl Strategy<Value = ArmySpec> {
        prop::collection::vec(arb_group_spec(), 1..=max_groups).prop_map(move |groups| ArmySpec {
            name: name.to_string(),
            groups,
        })
    }

    /// Generate a two-army scenario.
    pub fn arb_scenario(max_groups: usize) -> impl Strategy<Value = Scenario> {
        (arb_army("Left", max_groups), arb_army("Right", max_groups))
            .prop_map(|(a, b)| Scenario { armies: [a, b] })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{challenge_scenario, stalemate_scenario};
    use immune_core::battle::{Boost, Outcome, Side};
    use immune_core::scenario::Scenario;
    use proptest::prelude::*;

    fn sample_battle() -> Battle {
        Battle::new(&Scenario::sample(), Boost::NONE).unwrap()
    }

    fn challenge_battle() -> Battle {
        Battle::new(&challenge_scenario(), Boost::new(Side::A, 40)).unwrap()
    }

    #[test]
    fn test_sample_battle_determinism() {
        assert!(verify_battle_determinism(sample_battle));
    }

    #[test]
    fn test_challenge_battle_determinism() {
        assert!(verify_battle_determinism(challenge_battle));
    }

    #[test]
    fn test_find_divergence_on_deterministic_battle() {
        assert!(find_first_divergence(challenge_battle).is_none());
    }

    #[test]
    fn test_round_hashes_end_at_resolution() {
        let mut battle = sample_battle();
        let hashes = round_hashes(&mut battle);
        assert!(battle.is_resolved());
        assert_eq!(hashes.len(), battle.round() as usize + 1);
    }

    #[test]
    fn test_stalemate_resolves_in_one_round() {
        let mut battle = Battle::new(&stalemate_scenario(), Boost::NONE).unwrap();
        let hashes = round_hashes(&mut battle);
        assert_eq!(hashes.len(), 2);
        assert_eq!(
            battle.outcome(),
            Some(Outcome::Draw {
                remaining_units: [70, 40]
            })
        );
    }

    // =========================================================================
    // Serialization round-trip tests
    // =========================================================================

    #[test]
    fn test_serialization_before_first_round() {
        assert!(verify_serialization_determinism(sample_battle, 0));
    }

    #[test]
    fn test_serialization_mid_battle() {
        assert!(verify_serialization_determinism(challenge_battle, 25));
    }

    // =========================================================================
    // Parallel determinism tests
    // =========================================================================

    #[test]
    fn test_parallel_challenge_battles() {
        let result = run_parallel_battles_scoped(challenge_battle, 4);
        result.assert_deterministic();
    }

    // =========================================================================
    // Property-based tests using proptest
    // =========================================================================

    proptest! {
        /// Random rosters replay identically round by round.
        #[test]
        fn prop_random_battles_are_deterministic(
            scenario in strategies::arb_scenario(4),
            boost in 0u32..50,
        ) {
            let setup = || Battle::new(&scenario, Boost::new(Side::A, boost)).unwrap();
            prop_assert!(verify_battle_determinism(setup));
        }

        /// Generated modifier sets never overlap.
        #[test]
        fn prop_modifiers_are_disjoint((weak, immune) in strategies::arb_modifiers()) {
            prop_assert!(weak.is_disjoint(immune));
        }

        /// Generated scenarios pass validation.
        #[test]
        fn prop_generated_scenarios_are_valid(scenario in strategies::arb_scenario(5)) {
            prop_assert!(scenario.validate().is_ok());
        }
    }
}
