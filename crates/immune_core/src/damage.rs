//! Damage types and damage-type sets.
//!
//! Attack types form a closed enumeration. Weaknesses and immunities are
//! stored as [`DamageTypeSet`], a bitmask with one bit per type, so
//! membership checks during target selection are a single AND.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Kind of damage an attack deals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DamageType {
    /// Blunt force.
    Bludgeoning,
    /// Freezing.
    Cold,
    /// Burning.
    Fire,
    /// Ionizing radiation.
    Radiation,
    /// Cutting.
    Slashing,
}

impl DamageType {
    /// Every damage type, in bit order.
    pub const ALL: [Self; 5] = [
        Self::Bludgeoning,
        Self::Cold,
        Self::Fire,
        Self::Radiation,
        Self::Slashing,
    ];

    /// Lowercase token used in roster text.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bludgeoning => "bludgeoning",
            Self::Cold => "cold",
            Self::Fire => "fire",
            Self::Radiation => "radiation",
            Self::Slashing => "slashing",
        }
    }

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for DamageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DamageType {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| GameError::UnknownDamageType(s.to_string()))
    }
}

/// A set of damage types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<DamageType>", into = "Vec<DamageType>")]
pub struct DamageTypeSet(u8);

impl DamageTypeSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Create an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self::EMPTY
    }

    /// Add a damage type to the set.
    pub fn insert(&mut self, kind: DamageType) {
        self.0 |= kind.bit();
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub const fn with(self, kind: DamageType) -> Self {
        Self(self.0 | kind.bit())
    }

    /// Whether the set contains `kind`.
    #[must_use]
    pub const fn contains(self, kind: DamageType) -> bool {
        self.0 & kind.bit() != 0
    }

    /// Whether the set is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether the two sets share no damage type.
    #[must_use]
    pub const fn is_disjoint(self, other: Self) -> bool {
        self.0 & other.0 == 0
    }

    /// Damage types present in both sets.
    #[must_use]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Whether every type in `self` is also in `other`.
    #[must_use]
    pub const fn is_subset(self, other: Self) -> bool {
        self.0 & !other.0 == 0
    }

    /// Number of damage types in the set.
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate members in [`DamageType::ALL`] order.
    pub fn iter(self) -> impl Iterator<Item = DamageType> {
        DamageType::ALL
            .into_iter()
            .filter(move |kind| self.contains(*kind))
    }
}

impl FromIterator<DamageType> for DamageTypeSet {
    fn from_iter<I: IntoIterator<Item = DamageType>>(iter: I) -> Self {
        let mut set = Self::new();
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

impl From<Vec<DamageType>> for DamageTypeSet {
    fn from(kinds: Vec<DamageType>) -> Self {
        kinds.into_iter().collect()
    }
}

impl From<DamageTypeSet> for Vec<DamageType> {
    fn from(set: DamageTypeSet) -> Self {
        set.iter().collect()
    }
}

impl fmt::Display for DamageTypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, kind) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(kind.name())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_damage_type() {
        assert_eq!("fire".parse::<DamageType>(), Ok(DamageType::Fire));
        assert_eq!("slashing".parse::<DamageType>(), Ok(DamageType::Slashing));
        assert_eq!(
            "acid".parse::<DamageType>(),
            Err(GameError::UnknownDamageType("acid".to_string()))
        );
        // Tokens are case sensitive
        assert!("Fire".parse::<DamageType>().is_err());
    }

    #[test]
    fn test_set_membership() {
        let set: DamageTypeSet = [DamageType::Radiation, DamageType::Bludgeoning]
            .into_iter()
            .collect();
        assert!(set.contains(DamageType::Radiation));
        assert!(set.contains(DamageType::Bludgeoning));
        assert!(!set.contains(DamageType::Fire));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_set_relations() {
        let weak = DamageTypeSet::new().with(DamageType::Fire);
        let immune = DamageTypeSet::new()
            .with(DamageType::Cold)
            .with(DamageType::Slashing);
        assert!(weak.is_disjoint(immune));
        assert!(!immune.is_disjoint(immune.with(DamageType::Fire)));
        assert!(weak.is_subset(weak.with(DamageType::Cold)));
        assert_eq!(
            immune.intersection(DamageTypeSet::new().with(DamageType::Cold)),
            DamageTypeSet::new().with(DamageType::Cold)
        );
        assert!(DamageTypeSet::EMPTY.is_empty());
    }

    #[test]
    fn test_set_display_order() {
        let set = DamageTypeSet::new()
            .with(DamageType::Slashing)
            .with(DamageType::Bludgeoning);
        assert_eq!(set.to_string(), "bludgeoning, slashing");
    }

    #[test]
    fn test_set_serializes_as_list() {
        let set = DamageTypeSet::new()
            .with(DamageType::Fire)
            .with(DamageType::Cold);
        let text = ron::to_string(&set).unwrap();
        assert!(text.starts_with('['));
        assert!(text.contains("cold"));
        assert!(text.find("cold") < text.find("fire"));
        let back: DamageTypeSet = ron::from_str(&text).unwrap();
        assert_eq!(back, set);
    }
}
