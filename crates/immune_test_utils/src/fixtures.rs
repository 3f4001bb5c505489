//! Test fixtures and helpers.
//!
//! Pre-built rosters and shorthand builders for consistent testing.

use immune_core::damage::{DamageType, DamageTypeSet};
use immune_core::group::GroupSpec;
use immune_core::scenario::{ArmySpec, Scenario};

/// A full-size roster with ten groups per army.
pub const CHALLENGE_INPUT: &str = "\
Immune System:
698 units each with 10286 hit points with an attack that does 133 fire damage at initiative 9
6846 units each with 2773 hit points (weak to slashing, cold) with an attack that does 4 slashing damage at initiative 14
105 units each with 6988 hit points (weak to bludgeoning; immune to radiation) with an attack that does 616 radiation damage at initiative 17
5615 units each with 7914 hit points (weak to bludgeoning) with an attack that does 13 radiation damage at initiative 20
1021 units each with 10433 hit points (weak to cold; immune to slashing, bludgeoning) with an attack that does 86 bludgeoning damage at initiative 12
6099 units each with 11578 hit points with an attack that does 15 bludgeoning damage at initiative 13
82 units each with 1930 hit points (weak to bludgeoning; immune to cold) with an attack that does 179 bludgeoning damage at initiative 5
2223 units each with 9442 hit points (immune to bludgeoning) with an attack that does 38 cold damage at initiative 19
140 units each with 7594 hit points (weak to radiation) with an attack that does 452 fire damage at initiative 8
3057 units each with 3871 hit points (weak to bludgeoning) with an attack that does 11 radiation damage at initiative 16

Infection:
263 units each with 48098 hit points (immune to radiation; weak to slashing) with an attack that does 293 bludgeoning damage at initiative 2
111 units each with 9893 hit points (immune to slashing) with an attack that does 171 fire damage at initiative 18
2790 units each with 36205 hit points with an attack that does 25 cold damage at initiative 4
3325 units each with 46479 hit points (weak to slashing) with an attack that does 27 radiation damage at initiative 1
3593 units each with 6461 hit points (weak to fire, slashing) with an attack that does 3 radiation damage at initiative 15
2925 units each with 13553 hit points (weak to cold, bludgeoning; immune to fire) with an attack that does 8 cold damage at initiative 10
262 units each with 43260 hit points (weak to cold) with an attack that does 327 radiation damage at initiative 6
4228 units each with 24924 hit points (weak to radiation, fire; immune to cold, bludgeoning) with an attack that does 11 cold damage at initiative 11
689 units each with 42315 hit points (weak to cold, slashing) with an attack that does 116 fire damage at initiative 7
2649 units each with 37977 hit points (weak to radiation) with an attack that does 24 cold damage at initiative 3
";

/// Parse [`CHALLENGE_INPUT`].
///
/// # Panics
///
/// Panics if the embedded roster fails to parse.
#[must_use]
pub fn challenge_scenario() -> Scenario {
    Scenario::parse(CHALLENGE_INPUT).expect("challenge roster parses")
}

/// Shorthand for a group with no modifiers.
#[must_use]
pub fn group(
    units: u32,
    hit_points: u32,
    attack_type: DamageType,
    attack_damage: u32,
    initiative: u32,
) -> GroupSpec {
    GroupSpec::new(units, hit_points, attack_type, attack_damage, initiative)
}

/// Build a damage type set from a slice.
#[must_use]
pub fn types(kinds: &[DamageType]) -> DamageTypeSet {
    kinds.iter().copied().collect()
}

/// Two armies immune to everything: resolves as a draw in one round.
#[must_use]
pub fn stalemate_scenario() -> Scenario {
    let all = types(&DamageType::ALL);
    Scenario {
        armies: [
            ArmySpec::new("Left")
                .with_group(group(50, 10, DamageType::Fire, 10, 1).with_immunities(all))
                .with_group(group(20, 10, DamageType::Cold, 10, 3).with_immunities(all)),
            ArmySpec::new("Right")
                .with_group(group(40, 10, DamageType::Slashing, 10, 2).with_immunities(all)),
        ],
    }
}
