//! Round-based battle between two armies.
//!
//! A [`Battle`] owns every live group in an arena indexed by [`GroupId`];
//! each army's roster is a list of ids. One call to [`Battle::fight`] plays a
//! full round:
//!
//! 1. **Selection**: build a fresh [`TargetMap`](crate::targeting::TargetMap).
//! 2. **Attack**: groups strike in initiative order, across both sides. A
//!    group killed earlier in the same phase does not strike.
//! 3. **Cleanup**: groups with no units leave their roster.
//!
//! The battle resolves when a roster is empty, or as a [`Outcome::Draw`]
//! when a round kills no units at all (for example, mutually immune armies).
//!
//! # Determinism
//!
//! Every ordering is total (ids break the remaining ties) and all state is
//! integer, so identical scenarios and boosts replay identically.
//!
//! # Example
//!
//! ```
//! use immune_core::battle::{Battle, Boost, Outcome, Side};
//! use immune_core::scenario::Scenario;
//!
//! let mut battle = Battle::new(&Scenario::sample(), Boost::NONE).unwrap();
//! let outcome = battle.run();
//! assert_eq!(
//!     outcome,
//!     Outcome::Victory { winner: Side::B, remaining_units: 5216 }
//! );
//! ```

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::error::{GameError, Result};
use crate::group::{Group, GroupId};
use crate::scenario::Scenario;
use crate::targeting::{attack_order, select_targets};

/// One of the two opposing armies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    /// The first army in the roster.
    A,
    /// The second army in the roster.
    B,
}

impl Side {
    /// Both sides, in roster order.
    pub const ALL: [Self; 2] = [Self::A, Self::B];

    /// Index into per-side arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }

    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => f.write_str("A"),
            Self::B => f.write_str("B"),
        }
    }
}

impl FromStr for Side {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "a" => Ok(Self::A),
            "b" => Ok(Self::B),
            _ => Err(GameError::UnknownSide(s.to_string())),
        }
    }
}

/// Additive attack damage bonus for every group on one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Boost {
    /// Side receiving the bonus.
    pub side: Side,
    /// Damage added to each unit's attack.
    pub amount: u32,
}

impl Boost {
    /// No boost.
    pub const NONE: Self = Self::new(Side::A, 0);

    /// Create a boost for `side`.
    #[must_use]
    pub const fn new(side: Side, amount: u32) -> Self {
        Self { side, amount }
    }

    /// Bonus applied to groups on `side`.
    #[must_use]
    pub const fn for_side(self, side: Side) -> u32 {
        if self.side.index() == side.index() {
            self.amount
        } else {
            0
        }
    }
}

impl Default for Boost {
    fn default() -> Self {
        Self::NONE
    }
}

/// How a battle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// One army was eliminated.
    Victory {
        /// Surviving side.
        winner: Side,
        /// Units the winner has left.
        remaining_units: u64,
    },
    /// A round killed nothing, or both armies died together.
    Draw {
        /// Units left per side, indexed by [`Side::index`].
        remaining_units: [u64; 2],
    },
}

impl Outcome {
    /// Winning side, if any.
    #[must_use]
    pub const fn winner(&self) -> Option<Side> {
        match self {
            Self::Victory { winner, .. } => Some(*winner),
            Self::Draw { .. } => None,
        }
    }

    /// Whether `side` won.
    #[must_use]
    pub fn is_victory_for(&self, side: Side) -> bool {
        self.winner() == Some(side)
    }

    /// Units left on the field, both sides combined.
    #[must_use]
    pub const fn remaining_units(&self) -> u64 {
        match self {
            Self::Victory {
                remaining_units, ..
            } => *remaining_units,
            Self::Draw { remaining_units } => remaining_units[0] + remaining_units[1],
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Victory {
                winner,
                remaining_units,
            } => write!(f, "side {winner} wins with {remaining_units} units"),
            Self::Draw { remaining_units } => write!(
                f,
                "draw with {} and {} units left",
                remaining_units[0], remaining_units[1]
            ),
        }
    }
}

/// Battle lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BattleState {
    /// Rounds remain to be fought.
    InProgress,
    /// Terminal state.
    Resolved(Outcome),
}

/// A single hit during the attack phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Strike {
    /// Attacking group.
    pub attacker: GroupId,
    /// Defending group.
    pub defender: GroupId,
    /// Damage dealt.
    pub damage: u64,
    /// Defender units killed.
    pub units_killed: u32,
}

/// Everything that happened in one round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundReport {
    /// 1-based round number; 0 when no round was played.
    pub round: u32,
    /// Hits in attack order.
    pub strikes: Vec<Strike>,
    /// Units killed across both sides.
    pub units_killed: u64,
}

impl RoundReport {
    fn new(round: u32) -> Self {
        Self {
            round,
            ..Self::default()
        }
    }

    fn record(&mut self, strike: Strike) {
        self.units_killed += u64::from(strike.units_killed);
        self.strikes.push(strike);
    }
}

/// An army inside a battle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
struct Army {
    name: String,
    roster: Vec<GroupId>,
}

/// A battle in progress or resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Battle {
    groups: Vec<Group>,
    armies: [Army; 2],
    boost: Boost,
    round: u32,
    state: BattleState,
}

impl Battle {
    /// Build a fresh battle from `scenario`, applying `boost`.
    ///
    /// Groups that start with zero units never join their roster. A battle
    /// with an empty roster is resolved immediately.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidGroup`] if the scenario fails validation
    /// or holds more groups than a [`GroupId`] can number.
    pub fn new(scenario: &Scenario, boost: Boost) -> Result<Self> {
        scenario.validate()?;

        let mut groups = Vec::new();
        let mut rosters: [Vec<GroupId>; 2] = Default::default();
        for side in Side::ALL {
            for group_spec in &scenario.army(side).groups {
                let id = next_group_id(groups.len())?;
                let group = Group::from_spec(id, side, group_spec, boost.for_side(side));
                if group.is_alive() {
                    rosters[side.index()].push(id);
                }
                groups.push(group);
            }
        }
        let [roster_a, roster_b] = rosters;
        let armies = [
            Army {
                name: scenario.army(Side::A).name.clone(),
                roster: roster_a,
            },
            Army {
                name: scenario.army(Side::B).name.clone(),
                roster: roster_b,
            },
        ];

        let mut battle = Self {
            groups,
            armies,
            boost,
            round: 0,
            state: BattleState::InProgress,
        };
        if let Some(outcome) = battle.elimination() {
            battle.state = BattleState::Resolved(outcome);
        }
        Ok(battle)
    }

    /// Play one full round.
    ///
    /// Does nothing on a resolved battle and returns an empty report.
    pub fn fight(&mut self) -> RoundReport {
        if self.is_resolved() {
            return RoundReport::new(0);
        }
        self.round += 1;

        let targets = select_targets(
            &self.groups,
            [&self.armies[0].roster, &self.armies[1].roster],
        );

        let mut order: Vec<GroupId> = self
            .armies
            .iter()
            .flat_map(|army| army.roster.iter().copied())
            .collect();
        order.sort_by(|a, b| attack_order(&self.groups[a.index()], &self.groups[b.index()]));

        let mut report = RoundReport::new(self.round);
        for attacker_id in order {
            let Some(&defender_id) = targets.get(&attacker_id) else {
                continue;
            };
            let attacker = &self.groups[attacker_id.index()];
            if !attacker.is_alive() {
                continue;
            }
            let damage = attacker.attack_value(&self.groups[defender_id.index()]);
            let units_killed = self.groups[defender_id.index()].take_damage(damage);
            trace!(
                round = self.round,
                attacker = %attacker_id,
                defender = %defender_id,
                damage,
                units_killed,
                "Strike"
            );
            report.record(Strike {
                attacker: attacker_id,
                defender: defender_id,
                damage,
                units_killed,
            });
        }

        for army in &mut self.armies {
            army.roster.retain(|id| self.groups[id.index()].is_alive());
        }

        let outcome = self.elimination().or_else(|| {
            (report.units_killed == 0).then(|| Outcome::Draw {
                remaining_units: [self.units(Side::A), self.units(Side::B)],
            })
        });

        debug!(
            round = self.round,
            units_killed = report.units_killed,
            units_a = self.units(Side::A),
            units_b = self.units(Side::B),
            state_hash = self.state_hash(),
            "Round complete"
        );

        if let Some(outcome) = outcome {
            info!(round = self.round, %outcome, "Battle resolved");
            self.state = BattleState::Resolved(outcome);
        }
        report
    }

    /// Fight rounds until the battle resolves.
    pub fn run(&mut self) -> Outcome {
        loop {
            if let BattleState::Resolved(outcome) = self.state {
                return outcome;
            }
            self.fight();
        }
    }

    fn elimination(&self) -> Option<Outcome> {
        let a_alive = !self.armies[0].roster.is_empty();
        let b_alive = !self.armies[1].roster.is_empty();
        match (a_alive, b_alive) {
            (true, true) => None,
            (true, false) => Some(Outcome::Victory {
                winner: Side::A,
                remaining_units: self.units(Side::A),
            }),
            (false, true) => Some(Outcome::Victory {
                winner: Side::B,
                remaining_units: self.units(Side::B),
            }),
            (false, false) => Some(Outcome::Draw {
                remaining_units: [0, 0],
            }),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> BattleState {
        self.state
    }

    /// Outcome, once resolved.
    #[must_use]
    pub const fn outcome(&self) -> Option<Outcome> {
        match self.state {
            BattleState::Resolved(outcome) => Some(outcome),
            BattleState::InProgress => None,
        }
    }

    /// Whether the battle has ended.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self.state, BattleState::Resolved(_))
    }

    /// Rounds fought so far.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Boost this battle was built with.
    #[must_use]
    pub const fn boost(&self) -> Boost {
        self.boost
    }

    /// Army name for `side`.
    #[must_use]
    pub fn army_name(&self, side: Side) -> &str {
        &self.armies[side.index()].name
    }

    /// Ids of the groups still fighting for `side`.
    #[must_use]
    pub fn roster(&self, side: Side) -> &[GroupId] {
        &self.armies[side.index()].roster
    }

    /// Look up any group, alive or not.
    #[must_use]
    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(id.index())
    }

    /// Every group, indexed by [`GroupId::index`], eliminated ones included.
    #[must_use]
    pub fn arena(&self) -> &[Group] {
        &self.groups
    }

    /// Live groups fighting for `side`, in roster order.
    pub fn groups(&self, side: Side) -> impl Iterator<Item = &Group> + '_ {
        self.roster(side)
            .iter()
            .filter_map(|id| self.groups.get(id.index()))
    }

    /// Units left on `side`.
    #[must_use]
    pub fn units(&self, side: Side) -> u64 {
        self.groups(side).map(|g| u64::from(g.units())).sum()
    }

    /// Units left on both sides.
    #[must_use]
    pub fn total_units(&self) -> u64 {
        self.units(Side::A) + self.units(Side::B)
    }

    /// Hash of the current battle state.
    ///
    /// Two battles with identical state produce identical hashes.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.round.hash(&mut hasher);
        for group in &self.groups {
            group.id().hash(&mut hasher);
            group.units().hash(&mut hasher);
        }
        for army in &self.armies {
            army.roster.hash(&mut hasher);
        }
        self.state.hash(&mut hasher);
        hasher.finish()
    }

    /// Serialize the battle for snapshots.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize battle: {e}")))
    }

    /// Restore a battle from [`serialize`](Self::serialize) output.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data)
            .map_err(|e| GameError::InvalidState(format!("Failed to deserialize battle: {e}")))
    }
}

/// Id for the group that will sit at arena index `len`.
fn next_group_id(len: usize) -> Result<GroupId> {
    u32::try_from(len)
        .map(GroupId)
        .map_err(|_| GameError::InvalidGroup(format!("more than {} groups", u32::MAX)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::damage::{DamageType, DamageTypeSet};
    use crate::group::GroupSpec;
    use crate::scenario::ArmySpec;

    fn sample_battle(boost: u32) -> Battle {
        Battle::new(&Scenario::sample(), Boost::new(Side::A, boost)).unwrap()
    }

    #[test]
    fn test_side_helpers() {
        assert_eq!(Side::A.opponent(), Side::B);
        assert_eq!(Side::B.opponent(), Side::A);
        assert_eq!(Side::B.index(), 1);
        assert_eq!("b".parse::<Side>(), Ok(Side::B));
        assert_eq!("A".parse::<Side>(), Ok(Side::A));
        assert_eq!(
            "c".parse::<Side>(),
            Err(GameError::UnknownSide("c".to_string()))
        );
    }

    #[test]
    fn test_group_ids_follow_arena_index() {
        assert_eq!(next_group_id(0), Ok(GroupId(0)));
        assert_eq!(next_group_id(u32::MAX as usize), Ok(GroupId(u32::MAX)));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_group_ids_past_u32_rejected() {
        assert!(matches!(
            next_group_id(u32::MAX as usize + 1),
            Err(GameError::InvalidGroup(_))
        ));
    }

    #[test]
    fn test_boost_applies_to_one_side() {
        let battle = sample_battle(10);
        let a: Vec<_> = battle.groups(Side::A).map(|g| g.attack_damage()).collect();
        let b: Vec<_> = battle.groups(Side::B).map(|g| g.attack_damage()).collect();
        assert_eq!(a, vec![4517, 35]);
        assert_eq!(b, vec![116, 12]);
        assert_eq!(battle.boost(), Boost::new(Side::A, 10));
    }

    #[test]
    fn test_first_round_of_sample() {
        let mut battle = sample_battle(0);
        let report = battle.fight();

        assert_eq!(report.round, 1);
        // Infection group 2 (initiative 4) strikes first
        let kills: Vec<(GroupId, GroupId, u32)> = report
            .strikes
            .iter()
            .map(|s| (s.attacker, s.defender, s.units_killed))
            .collect();
        assert_eq!(
            kills,
            vec![
                (GroupId(3), GroupId(1), 84),
                (GroupId(1), GroupId(2), 4),
                (GroupId(0), GroupId(3), 51),
                (GroupId(2), GroupId(0), 17),
            ]
        );
        // Immune group 1 was wiped out
        assert_eq!(battle.roster(Side::A), &[GroupId(1)]);
        assert_eq!(battle.units(Side::A), 905);
        assert_eq!(battle.units(Side::B), 797 + 4434);
        assert!(!battle.is_resolved());
    }

    #[test]
    fn test_sample_without_boost() {
        let mut battle = sample_battle(0);
        let outcome = battle.run();
        assert_eq!(
            outcome,
            Outcome::Victory {
                winner: Side::B,
                remaining_units: 5216
            }
        );
        assert_eq!(battle.units(Side::A), 0);
        assert_eq!(battle.outcome(), Some(outcome));
    }

    #[test]
    fn test_sample_with_boost() {
        let outcome = sample_battle(1570).run();
        assert_eq!(
            outcome,
            Outcome::Victory {
                winner: Side::A,
                remaining_units: 51
            }
        );
    }

    #[test]
    fn test_units_never_increase() {
        let mut battle = sample_battle(0);
        let mut previous = battle.total_units();
        while !battle.is_resolved() {
            let report = battle.fight();
            let now = battle.total_units();
            assert!(now <= previous);
            assert_eq!(previous - now, report.units_killed);
            previous = now;
        }
    }

    #[test]
    fn test_mutual_immunity_is_a_draw() {
        let all = DamageType::ALL.into_iter().collect::<DamageTypeSet>();
        let scenario = Scenario::new(
            ArmySpec::new("Left")
                .with_group(GroupSpec::new(10, 10, DamageType::Fire, 10, 1).with_immunities(all)),
            ArmySpec::new("Right")
                .with_group(GroupSpec::new(10, 10, DamageType::Cold, 10, 2).with_immunities(all)),
        )
        .unwrap();

        let mut battle = Battle::new(&scenario, Boost::NONE).unwrap();
        let report = battle.fight();
        assert!(report.strikes.is_empty());
        assert_eq!(
            battle.state(),
            BattleState::Resolved(Outcome::Draw {
                remaining_units: [10, 10]
            })
        );
        assert_eq!(battle.round(), 1);
    }

    #[test]
    fn test_chip_damage_stalemate_is_a_draw() {
        // Hits land but never kill a whole unit
        let scenario = Scenario::new(
            ArmySpec::new("Left").with_group(GroupSpec::new(1, 100, DamageType::Fire, 1, 1)),
            ArmySpec::new("Right").with_group(GroupSpec::new(1, 100, DamageType::Cold, 1, 2)),
        )
        .unwrap();

        let mut battle = Battle::new(&scenario, Boost::NONE).unwrap();
        let report = battle.fight();
        assert_eq!(report.strikes.len(), 2);
        assert_eq!(report.units_killed, 0);
        assert_eq!(battle.outcome().and_then(|o| o.winner()), None);
    }

    #[test]
    fn test_empty_army_resolves_immediately() {
        let scenario = Scenario::new(
            ArmySpec::new("Left").with_group(GroupSpec::new(3, 10, DamageType::Fire, 1, 1)),
            ArmySpec::new("Right"),
        )
        .unwrap();
        let mut battle = Battle::new(&scenario, Boost::NONE).unwrap();
        assert_eq!(
            battle.outcome(),
            Some(Outcome::Victory {
                winner: Side::A,
                remaining_units: 3
            })
        );
        // Fighting a resolved battle is a no-op
        let report = battle.fight();
        assert_eq!(report, RoundReport::default());
        assert_eq!(battle.round(), 0);
    }

    #[test]
    fn test_zero_unit_groups_are_excluded() {
        let scenario = Scenario::new(
            ArmySpec::new("Left")
                .with_group(GroupSpec::new(0, 10, DamageType::Fire, 1, 1))
                .with_group(GroupSpec::new(2, 10, DamageType::Fire, 1, 2)),
            ArmySpec::new("Right").with_group(GroupSpec::new(0, 10, DamageType::Cold, 1, 3)),
        )
        .unwrap();
        let battle = Battle::new(&scenario, Boost::NONE).unwrap();
        assert_eq!(battle.roster(Side::A), &[GroupId(1)]);
        assert!(battle.roster(Side::B).is_empty());
        assert_eq!(battle.outcome().and_then(|o| o.winner()), Some(Side::A));
        // The dead slot is still addressable
        assert_eq!(battle.group(GroupId(0)).map(Group::units), Some(0));
    }

    #[test]
    fn test_dead_attacker_does_not_strike() {
        // Right strikes first (initiative 9) and kills Left before it acts
        let scenario = Scenario::new(
            ArmySpec::new("Left").with_group(GroupSpec::new(1, 10, DamageType::Fire, 100, 1)),
            ArmySpec::new("Right").with_group(GroupSpec::new(10, 100, DamageType::Cold, 10, 9)),
        )
        .unwrap();
        let mut battle = Battle::new(&scenario, Boost::NONE).unwrap();
        let report = battle.fight();
        assert_eq!(report.strikes.len(), 1);
        assert_eq!(report.strikes[0].attacker, GroupId(1));
        assert_eq!(
            battle.outcome(),
            Some(Outcome::Victory {
                winner: Side::B,
                remaining_units: 10
            })
        );
    }

    #[test]
    fn test_state_hash_tracks_progress() {
        let mut a = sample_battle(0);
        let mut b = sample_battle(0);
        assert_eq!(a.state_hash(), b.state_hash());
        a.fight();
        assert_ne!(a.state_hash(), b.state_hash());
        b.fight();
        assert_eq!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn test_snapshot_resumes_identically() {
        let mut battle = sample_battle(1570);
        battle.fight();
        let bytes = battle.serialize().unwrap();
        let mut restored = Battle::deserialize(&bytes).unwrap();
        assert_eq!(restored, battle);
        assert_eq!(restored.run(), battle.run());
        assert!(Battle::deserialize(&[0xFF]).is_err());
    }

    #[test]
    fn test_outcome_display() {
        let win = Outcome::Victory {
            winner: Side::B,
            remaining_units: 5216,
        };
        assert_eq!(win.to_string(), "side B wins with 5216 units");
        assert_eq!(win.remaining_units(), 5216);
        let draw = Outcome::Draw {
            remaining_units: [3, 4],
        };
        assert_eq!(draw.to_string(), "draw with 3 and 4 units left");
        assert_eq!(draw.remaining_units(), 7);
        assert!(!draw.is_victory_for(Side::A));
    }
}
