//! Army groups and the damage rules between them.
//!
//! A [`GroupSpec`] is the immutable description of a group as it appears in
//! a roster. A [`Group`] is the live, mutable copy owned by one battle. Every
//! battle builds fresh groups from the specs, so boost trials never share
//! state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::battle::Side;
use crate::damage::{DamageType, DamageTypeSet};
use crate::error::{GameError, Result};

/// Multiplier applied when the defender is weak to the attack type.
pub const WEAKNESS_MULTIPLIER: u64 = 2;

/// Stable identifier of a group within one battle.
///
/// Ids are indices into the battle's group arena and are assigned in roster
/// order, side A first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub u32);

impl GroupId {
    /// Arena index for this id.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Roster description of a group, before any battle starts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupSpec {
    /// Number of units in the group.
    pub units: u32,
    /// Hit points of each unit.
    pub hit_points: u32,
    /// Type of damage the group deals.
    pub attack_type: DamageType,
    /// Damage dealt by each unit, before any boost.
    pub attack_damage: u32,
    /// Attack order key; higher acts first.
    pub initiative: u32,
    /// Damage types dealing double damage to this group.
    #[serde(default)]
    pub weaknesses: DamageTypeSet,
    /// Damage types dealing no damage to this group.
    #[serde(default)]
    pub immunities: DamageTypeSet,
}

impl GroupSpec {
    /// Create a group spec with no weaknesses or immunities.
    #[must_use]
    pub const fn new(
        units: u32,
        hit_points: u32,
        attack_type: DamageType,
        attack_damage: u32,
        initiative: u32,
    ) -> Self {
        Self {
            units,
            hit_points,
            attack_type,
            attack_damage,
            initiative,
            weaknesses: DamageTypeSet::EMPTY,
            immunities: DamageTypeSet::EMPTY,
        }
    }

    /// Builder method to set weaknesses.
    #[must_use]
    pub const fn with_weaknesses(mut self, weaknesses: DamageTypeSet) -> Self {
        self.weaknesses = weaknesses;
        self
    }

    /// Builder method to set immunities.
    #[must_use]
    pub const fn with_immunities(mut self, immunities: DamageTypeSet) -> Self {
        self.immunities = immunities;
        self
    }

    /// Check the construction invariants.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidGroup`] if hit points are zero or a damage
    /// type is listed as both a weakness and an immunity.
    pub fn validate(&self) -> Result<()> {
        if self.hit_points == 0 {
            return Err(GameError::InvalidGroup(
                "hit points per unit must be positive".to_string(),
            ));
        }
        if !self.weaknesses.is_disjoint(self.immunities) {
            return Err(GameError::InvalidGroup(format!(
                "both weak and immune to {}",
                self.weaknesses.intersection(self.immunities)
            )));
        }
        Ok(())
    }
}

/// A live group inside a battle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Group {
    id: GroupId,
    side: Side,
    units: u32,
    hit_points: u32,
    attack_type: DamageType,
    attack_damage: u32,
    initiative: u32,
    weaknesses: DamageTypeSet,
    immunities: DamageTypeSet,
}

impl Group {
    /// Build a live group from its spec, adding `boost` to its attack damage.
    #[must_use]
    pub fn from_spec(id: GroupId, side: Side, spec: &GroupSpec, boost: u32) -> Self {
        Self {
            id,
            side,
            units: spec.units,
            hit_points: spec.hit_points,
            attack_type: spec.attack_type,
            attack_damage: spec.attack_damage.saturating_add(boost),
            initiative: spec.initiative,
            weaknesses: spec.weaknesses,
            immunities: spec.immunities,
        }
    }

    /// Group identifier.
    #[must_use]
    pub const fn id(&self) -> GroupId {
        self.id
    }

    /// Side this group fights for.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Remaining units.
    #[must_use]
    pub const fn units(&self) -> u32 {
        self.units
    }

    /// Hit points of each unit.
    #[must_use]
    pub const fn hit_points(&self) -> u32 {
        self.hit_points
    }

    /// Attack type.
    #[must_use]
    pub const fn attack_type(&self) -> DamageType {
        self.attack_type
    }

    /// Per-unit attack damage, boost included.
    #[must_use]
    pub const fn attack_damage(&self) -> u32 {
        self.attack_damage
    }

    /// Initiative.
    #[must_use]
    pub const fn initiative(&self) -> u32 {
        self.initiative
    }

    /// Weaknesses.
    #[must_use]
    pub const fn weaknesses(&self) -> DamageTypeSet {
        self.weaknesses
    }

    /// Immunities.
    #[must_use]
    pub const fn immunities(&self) -> DamageTypeSet {
        self.immunities
    }

    /// Units times per-unit attack damage.
    #[must_use]
    pub const fn effective_power(&self) -> u64 {
        self.units as u64 * self.attack_damage as u64
    }

    /// Whether the group still has units.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.units > 0
    }

    /// Damage this group would deal to `defender` if it attacked now.
    ///
    /// Saturates at `u64::MAX`; such a hit already exceeds any defender's
    /// total hit points.
    #[must_use]
    pub const fn attack_value(&self, defender: &Group) -> u64 {
        if defender.immunities.contains(self.attack_type) {
            0
        } else if defender.weaknesses.contains(self.attack_type) {
            self.effective_power().saturating_mul(WEAKNESS_MULTIPLIER)
        } else {
            self.effective_power()
        }
    }

    /// Apply `damage` and return the number of units killed.
    ///
    /// Only whole units die; leftover damage below one unit's hit points is
    /// lost.
    pub fn take_damage(&mut self, damage: u64) -> u32 {
        let lethal = damage / u64::from(self.hit_points);
        let killed = u32::try_from(lethal).map_or(self.units, |n| n.min(self.units));
        self.units -= killed;
        killed
    }
}

/// Damage `attacker` would deal to `defender`, before it is applied.
#[must_use]
pub const fn attack_value(attacker: &Group, defender: &Group) -> u64 {
    attacker.attack_value(defender)
}

/// Apply `damage` to `group`, returning the units killed.
pub fn take_damage(group: &mut Group, damage: u64) -> u32 {
    group.take_damage(damage)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(spec: &GroupSpec) -> Group {
        Group::from_spec(GroupId(0), Side::A, spec, 0)
    }

    #[test]
    fn test_effective_power() {
        let g = group(&GroupSpec::new(18, 729, DamageType::Radiation, 8, 10));
        assert_eq!(g.effective_power(), 144);
    }

    #[test]
    fn test_boost_adds_to_damage() {
        let spec = GroupSpec::new(10, 10, DamageType::Fire, 5, 1);
        let g = Group::from_spec(GroupId(3), Side::B, &spec, 7);
        assert_eq!(g.attack_damage(), 12);
        assert_eq!(g.effective_power(), 120);
        assert_eq!(g.side(), Side::B);
        assert_eq!(g.id(), GroupId(3));
    }

    #[test]
    fn test_attack_value_modifiers() {
        let attacker = group(&GroupSpec::new(10, 1, DamageType::Fire, 3, 1));
        let neutral = group(&GroupSpec::new(1, 1, DamageType::Cold, 1, 2));
        let weak = group(
            &GroupSpec::new(1, 1, DamageType::Cold, 1, 3)
                .with_weaknesses(DamageTypeSet::new().with(DamageType::Fire)),
        );
        let immune = group(
            &GroupSpec::new(1, 1, DamageType::Cold, 1, 4)
                .with_immunities(DamageTypeSet::new().with(DamageType::Fire)),
        );

        assert_eq!(attack_value(&attacker, &neutral), 30);
        assert_eq!(attack_value(&attacker, &weak), 60);
        assert_eq!(attack_value(&attacker, &immune), 0);
    }

    #[test]
    fn test_attack_value_saturates_at_max_stats() {
        let attacker = group(&GroupSpec::new(u32::MAX, 1, DamageType::Fire, u32::MAX, 1));
        let weak = group(
            &GroupSpec::new(1, 1, DamageType::Cold, 1, 2)
                .with_weaknesses(DamageTypeSet::new().with(DamageType::Fire)),
        );
        let neutral = group(&GroupSpec::new(1, 1, DamageType::Cold, 1, 3));

        assert_eq!(attack_value(&attacker, &neutral), u64::from(u32::MAX) * u64::from(u32::MAX));
        assert_eq!(attack_value(&attacker, &weak), u64::MAX);
    }

    #[test]
    fn test_take_damage_whole_units_only() {
        let mut g = group(&GroupSpec::new(10, 10, DamageType::Fire, 1, 1));
        let killed = take_damage(&mut g, 75);
        assert_eq!(killed, 7);
        assert_eq!(g.units(), 3);
    }

    #[test]
    fn test_take_damage_below_one_unit() {
        let mut g = group(&GroupSpec::new(10, 10, DamageType::Fire, 1, 1));
        assert_eq!(g.take_damage(9), 0);
        assert_eq!(g.units(), 10);
    }

    #[test]
    fn test_take_damage_overkill_clamps_to_zero() {
        let mut g = group(&GroupSpec::new(10, 10, DamageType::Fire, 1, 1));
        assert_eq!(g.take_damage(10_000), 10);
        assert_eq!(g.units(), 0);
        assert!(!g.is_alive());
        assert_eq!(g.effective_power(), 0);

        // Damage beyond u32 range still clamps
        let mut big = group(&GroupSpec::new(5, 1, DamageType::Fire, 1, 1));
        assert_eq!(big.take_damage(u64::MAX), 5);
        assert_eq!(big.units(), 0);
    }

    #[test]
    fn test_validate_rejects_zero_hit_points() {
        let spec = GroupSpec::new(1, 0, DamageType::Fire, 1, 1);
        assert!(matches!(spec.validate(), Err(GameError::InvalidGroup(_))));
    }

    #[test]
    fn test_validate_rejects_overlapping_modifiers() {
        let both = DamageTypeSet::new().with(DamageType::Cold);
        let spec = GroupSpec::new(1, 1, DamageType::Fire, 1, 1)
            .with_weaknesses(both)
            .with_immunities(both);
        let err = spec.validate().unwrap_err();
        assert_eq!(
            err,
            GameError::InvalidGroup("both weak and immune to cold".to_string())
        );
    }
}
