//! Battle scenarios: the two opposing armies before any fighting.
//!
//! A [`Scenario`] is immutable source data. Every [`Battle`](crate::battle::Battle)
//! builds its own live groups from it, which lets the boost search rerun the
//! same scenario many times.
//!
//! Scenarios come from the roster text grammar (see [`crate::parse`]) or from
//! RON data files.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::battle::Side;
use crate::damage::{DamageType, DamageTypeSet};
use crate::error::{GameError, Result};
use crate::group::GroupSpec;
use crate::parse::parse_scenario;

/// The public example rosters in roster text form.
pub const SAMPLE_INPUT: &str = "\
Immune System:
17 units each with 5390 hit points (weak to radiation, bludgeoning) with an attack that does 4507 fire damage at initiative 2
989 units each with 1274 hit points (immune to fire; weak to bludgeoning, slashing) with an attack that does 25 slashing damage at initiative 3

Infection:
801 units each with 4706 hit points (weak to radiation) with an attack that does 116 bludgeoning damage at initiative 1
4485 units each with 2961 hit points (immune to radiation; weak to fire, cold) with an attack that does 12 slashing damage at initiative 4
";

/// One army as listed in the roster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArmySpec {
    /// Army name from the roster header.
    pub name: String,
    /// Groups in roster order.
    pub groups: Vec<GroupSpec>,
}

impl ArmySpec {
    /// Create an army with no groups.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            groups: Vec::new(),
        }
    }

    /// Builder method to add a group.
    #[must_use]
    pub fn with_group(mut self, group: GroupSpec) -> Self {
        self.groups.push(group);
        self
    }

    /// Sum of units over all groups.
    #[must_use]
    pub fn total_units(&self) -> u64 {
        self.groups.iter().map(|g| u64::from(g.units)).sum()
    }
}

/// Two opposing armies. Side A is the first army in the roster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scenario {
    /// Armies indexed by [`Side::index`]. Written as a RON tuple.
    pub armies: [ArmySpec; 2],
}

impl Scenario {
    /// Create a scenario, validating every group.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidGroup`] if any group breaks an invariant.
    pub fn new(a: ArmySpec, b: ArmySpec) -> Result<Self> {
        let scenario = Self { armies: [a, b] };
        scenario.validate()?;
        Ok(scenario)
    }

    /// Check every group's invariants.
    ///
    /// # Errors
    ///
    /// Returns the first group error, prefixed with the army name.
    pub fn validate(&self) -> Result<()> {
        for army in &self.armies {
            for (index, group) in army.groups.iter().enumerate() {
                group.validate().map_err(|e| {
                    GameError::InvalidGroup(format!("{} group {}: {e}", army.name, index + 1))
                })?;
            }
        }
        Ok(())
    }

    /// Army fighting on `side`.
    #[must_use]
    pub fn army(&self, side: Side) -> &ArmySpec {
        &self.armies[side.index()]
    }

    /// Side whose army has the given name, if any.
    #[must_use]
    pub fn side_named(&self, name: &str) -> Option<Side> {
        Side::ALL
            .into_iter()
            .find(|side| self.army(*side).name.eq_ignore_ascii_case(name))
    }

    /// Side picked by `token`: `a`/`b`, or an army name.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownSide`] when `token` matches neither.
    pub fn resolve_side(&self, token: &str) -> Result<Side> {
        token.parse().or_else(|_| {
            self.side_named(token)
                .ok_or_else(|| GameError::UnknownSide(token.to_string()))
        })
    }

    /// Parse the roster text grammar.
    ///
    /// # Errors
    ///
    /// See [`parse_scenario`].
    pub fn parse(input: &str) -> Result<Self> {
        parse_scenario(input)
    }

    /// Load from a RON string.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Parse`] with the RON error position, or a group
    /// validation error.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let scenario: Self = ron::from_str(ron)
            .map_err(|e| GameError::parse(e.position.line, e.code.to_string()))?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Serialize to pretty RON.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidState`] if serialization fails.
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize scenario: {e}")))
    }

    /// The public example: immune system against infection.
    #[must_use]
    pub fn sample() -> Self {
        let immune_system = ArmySpec::new("Immune System")
            .with_group(
                GroupSpec::new(17, 5390, DamageType::Fire, 4507, 2).with_weaknesses(
                    DamageTypeSet::new()
                        .with(DamageType::Radiation)
                        .with(DamageType::Bludgeoning),
                ),
            )
            .with_group(
                GroupSpec::new(989, 1274, DamageType::Slashing, 25, 3)
                    .with_immunities(DamageTypeSet::new().with(DamageType::Fire))
                    .with_weaknesses(
                        DamageTypeSet::new()
                            .with(DamageType::Bludgeoning)
                            .with(DamageType::Slashing),
                    ),
            );
        let infection = ArmySpec::new("Infection")
            .with_group(
                GroupSpec::new(801, 4706, DamageType::Bludgeoning, 116, 1)
                    .with_weaknesses(DamageTypeSet::new().with(DamageType::Radiation)),
            )
            .with_group(
                GroupSpec::new(4485, 2961, DamageType::Slashing, 12, 4)
                    .with_immunities(DamageTypeSet::new().with(DamageType::Radiation))
                    .with_weaknesses(
                        DamageTypeSet::new()
                            .with(DamageType::Fire)
                            .with(DamageType::Cold),
                    ),
            );
        Self {
            armies: [immune_system, infection],
        }
    }
}

impl FromStr for Scenario {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
