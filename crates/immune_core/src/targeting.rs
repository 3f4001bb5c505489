//! Target selection phase.
//!
//! Each round starts by pairing attackers with defenders. The pairing is
//! returned as a [`TargetMap`] and consumed by the attack phase; groups never
//! hold references to each other.
//!
//! Rules:
//! - Attackers choose in [`selection_order`]: effective power, then
//!   initiative, both descending.
//! - An attacker picks the defender it would damage most, breaking ties by
//!   the defender's effective power, then its initiative.
//! - Defenders it cannot damage are never picked.
//! - A defender can be claimed once per round. Each side claims from its own
//!   pool of enemies, so the two sides never block each other.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::group::{Group, GroupId};

/// Attacker id to defender id, valid for one round.
pub type TargetMap = BTreeMap<GroupId, GroupId>;

/// Order in which groups choose targets. Lower group id breaks exact ties.
#[must_use]
pub fn selection_order(a: &Group, b: &Group) -> Ordering {
    b.effective_power()
        .cmp(&a.effective_power())
        .then_with(|| b.initiative().cmp(&a.initiative()))
        .then_with(|| a.id().cmp(&b.id()))
}

/// Order in which groups attack: initiative descending, across both sides.
#[must_use]
pub fn attack_order(a: &Group, b: &Group) -> Ordering {
    b.initiative()
        .cmp(&a.initiative())
        .then_with(|| a.id().cmp(&b.id()))
}

/// Pick `attacker`'s target from `candidates` and remove it from the pool.
///
/// Returns `None` when no candidate would take damage.
pub fn select_target(attacker: &Group, candidates: &mut Vec<&Group>) -> Option<GroupId> {
    let (index, _) = candidates
        .iter()
        .enumerate()
        .filter_map(|(i, defender)| {
            let value = attacker.attack_value(defender);
            (value > 0).then_some((i, value))
        })
        .max_by(|(ia, va), (ib, vb)| {
            va.cmp(vb)
                .then_with(|| selection_order(candidates[*ib], candidates[*ia]))
        })?;

    let target = candidates.swap_remove(index);
    Some(target.id())
}

/// Run the selection phase for every live group in both rosters.
#[must_use]
pub fn select_targets(arena: &[Group], rosters: [&[GroupId]; 2]) -> TargetMap {
    // pools[i] holds the groups of side i that are still unclaimed
    let mut pools = [
        live_groups(arena, rosters[0]),
        live_groups(arena, rosters[1]),
    ];

    let mut attackers: Vec<&Group> = pools.iter().flatten().copied().collect();
    attackers.sort_by(|a, b| selection_order(a, b));

    let mut targets = TargetMap::new();
    for attacker in attackers {
        let pool = &mut pools[attacker.side().opponent().index()];
        if let Some(target) = select_target(attacker, pool) {
            debug_assert!(
                !targets.values().any(|claimed| *claimed == target),
                "defender {target} claimed twice"
            );
            targets.insert(attacker.id(), target);
        }
    }
    targets
}

fn live_groups<'a>(arena: &'a [Group], ids: &[GroupId]) -> Vec<&'a Group> {
    ids.iter()
        .filter_map(|id| arena.get(id.index()))
        .filter(|group| group.is_alive())
        .collect()
}
