//! # Immune Core
//!
//! Deterministic battle simulation between an immune system and an
//! infection, each made of groups of identical units.
//!
//! This crate contains **only** deterministic logic:
//! - No IO
//! - No randomness
//! - No floating-point math
//!
//! Every battle is a pure function of its [`Scenario`](scenario::Scenario)
//! and [`Boost`](battle::Boost), which is what lets the boost search rerun
//! the same scenario freely and lets tests compare state hashes.
//!
//! ## Crate Structure
//!
//! - [`damage`] - Damage types and weakness/immunity sets
//! - [`group`] - Army groups and damage rules
//! - [`targeting`] - Target selection phase
//! - [`battle`] - Round loop and outcomes
//! - [`boost`] - Minimum boost search
//! - [`scenario`] - Immutable army rosters
//! - [`parse`] - Roster text grammar

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod battle;
pub mod boost;
pub mod damage;
pub mod error;
pub mod group;
pub mod parse;
pub mod scenario;
pub mod targeting;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::battle::{Battle, BattleState, Boost, Outcome, RoundReport, Side, Strike};
    pub use crate::boost::{run_trial, BoostResult, BoostSearch, DEFAULT_BOOST_CEILING};
    pub use crate::damage::{DamageType, DamageTypeSet};
    pub use crate::error::{GameError, Result};
    pub use crate::group::{attack_value, take_damage, Group, GroupId, GroupSpec};
    pub use crate::scenario::{ArmySpec, Scenario, SAMPLE_INPUT};
    pub use crate::targeting::{select_target, select_targets, TargetMap};
}
