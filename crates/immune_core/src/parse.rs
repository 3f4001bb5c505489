//! Roster text grammar.
//!
//! ```text
//! <Army name>:
//! <units> units each with <hp> hit points [(weak to <types>; immune to <types>)] with an attack that does <dmg> <type> damage at initiative <n>
//! ```
//!
//! The parenthesised clause is optional and its two parts may appear in
//! either order. Blank lines are ignored. Errors carry the 1-based line
//! number of the offending line.

use std::str::FromStr;

use crate::damage::{DamageType, DamageTypeSet};
use crate::error::{GameError, Result};
use crate::group::GroupSpec;
use crate::scenario::{ArmySpec, Scenario};

/// Parse a complete two-army roster.
///
/// # Errors
///
/// Returns [`GameError::Parse`] for malformed lines, unknown damage types or
/// invalid groups, and [`GameError::ArmyCount`] unless exactly two army
/// headers are present.
pub fn parse_scenario(input: &str) -> Result<Scenario> {
    let mut armies: Vec<ArmySpec> = Vec::new();

    for (index, raw) in input.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(name) = line.strip_suffix(':') {
            armies.push(ArmySpec::new(name.trim()));
            continue;
        }
        let Some(army) = armies.last_mut() else {
            return Err(GameError::parse(line_no, "group listed before any army header"));
        };
        army.groups.push(parse_group(line, line_no)?);
    }

    let [a, b]: [ArmySpec; 2] = armies
        .try_into()
        .map_err(|armies: Vec<ArmySpec>| GameError::ArmyCount(armies.len()))?;
    Scenario::new(a, b)
}

/// Parse a single group line.
///
/// # Errors
///
/// Returns [`GameError::Parse`] tagged with `line_no`.
pub fn parse_group(line: &str, line_no: usize) -> Result<GroupSpec> {
    let expected = |what: &str| GameError::parse(line_no, format!("expected {what}"));

    let (units, rest) = line
        .split_once(" units each with ")
        .ok_or_else(|| expected("'<n> units each with'"))?;
    let units = parse_number(units, "unit count", line_no)?;

    let (hit_points, rest) = rest
        .split_once(" hit points")
        .ok_or_else(|| expected("'<n> hit points'"))?;
    let hit_points = parse_number(hit_points, "hit points", line_no)?;

    let rest = rest.trim_start();
    let (modifiers, rest) = match rest.strip_prefix('(') {
        Some(inner) => {
            let (modifiers, after) = inner
                .split_once(')')
                .ok_or_else(|| expected("')' closing the modifier list"))?;
            (Some(modifiers), after.trim_start())
        }
        None => (None, rest),
    };

    let rest = rest
        .strip_prefix("with an attack that does ")
        .ok_or_else(|| expected("'with an attack that does'"))?;
    let (damage, rest) = rest
        .split_once(' ')
        .ok_or_else(|| expected("attack damage"))?;
    let attack_damage = parse_number(damage, "attack damage", line_no)?;

    let (attack_type, initiative) = rest
        .split_once(" damage at initiative ")
        .ok_or_else(|| expected("'<type> damage at initiative <n>'"))?;
    let attack_type = parse_damage_type(attack_type, line_no)?;
    let initiative = parse_number(initiative, "initiative", line_no)?;

    let mut spec = GroupSpec::new(units, hit_points, attack_type, attack_damage, initiative);
    if let Some(modifiers) = modifiers {
        parse_modifiers(modifiers, &mut spec, line_no)?;
    }
    spec.validate()
        .map_err(|e| GameError::parse(line_no, e.to_string()))?;
    Ok(spec)
}

/// Parse `weak to a, b; immune to c` into the spec's modifier sets.
fn parse_modifiers(text: &str, spec: &mut GroupSpec, line_no: usize) -> Result<()> {
    for clause in text.split(';') {
        let clause = clause.trim();
        let (set, list): (&mut DamageTypeSet, &str) =
            if let Some(list) = clause.strip_prefix("weak to ") {
                (&mut spec.weaknesses, list)
            } else if let Some(list) = clause.strip_prefix("immune to ") {
                (&mut spec.immunities, list)
            } else {
                return Err(GameError::parse(
                    line_no,
                    format!("unknown modifier clause '{clause}'"),
                ));
            };
        for token in list.split(',') {
            set.insert(parse_damage_type(token.trim(), line_no)?);
        }
    }
    Ok(())
}

fn parse_damage_type(token: &str, line_no: usize) -> Result<DamageType> {
    token
        .parse()
        .map_err(|e: GameError| GameError::parse(line_no, e.to_string()))
}

fn parse_number<T: FromStr>(text: &str, what: &str, line_no: usize) -> Result<T> {
    let text = text.trim();
    text.parse()
        .map_err(|_| GameError::parse(line_no, format!("invalid {what}: '{text}'")))
}
