//! Error types for the battle simulation.

use thiserror::Error;

use crate::battle::Side;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all battle simulation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// A roster line could not be parsed.
    #[error("Failed to parse line {line}: {message}")]
    Parse {
        /// 1-based line number in the input.
        line: usize,
        /// Error message.
        message: String,
    },

    /// Damage type token outside the known set.
    #[error("Unknown damage type: '{0}'")]
    UnknownDamageType(String),

    /// Side token that is neither `a`/`b` nor an army name.
    #[error("Unknown side: '{0}', expected 'a', 'b' or an army name")]
    UnknownSide(String),

    /// Group stats violate a construction invariant.
    #[error("Invalid group: {0}")]
    InvalidGroup(String),

    /// Input did not describe exactly two armies.
    #[error("Expected exactly 2 armies, found {0}")]
    ArmyCount(usize),

    /// No boost in the searched range produced a victory.
    #[error("No winning boost for side {side} in {floor}..={ceiling}")]
    BoostNotFound {
        /// Side receiving the boost.
        side: Side,
        /// First boost tried.
        floor: u32,
        /// Last boost tried.
        ceiling: u32,
    },

    /// The boosted side can never damage some opposing group.
    #[error("Side {side} cannot win at any boost: an opposing group is immune to all its attacks")]
    Unwinnable {
        /// Side receiving the boost.
        side: Side,
    },

    /// Invalid battle state.
    #[error("Invalid battle state: {0}")]
    InvalidState(String),
}

impl GameError {
    /// Build a parse error for a 1-based line number.
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}
