//! Runner configuration.
//!
//! A [`SimConfig`] can be loaded from a RON file with `--config`; individual
//! CLI flags then override whatever the file set.
//!
//! ```ron
//! (
//!     boosted_side: A,
//!     floor: 0,
//!     ceiling: 65536,
//!     window: 64,
//!     threads: 0,
//! )
//! ```

use std::path::Path;

use immune_core::battle::Side;
use immune_core::boost::{BoostSearch, DEFAULT_BOOST_CEILING};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boosts evaluated per parallel window unless configured otherwise.
pub const DEFAULT_WINDOW: u32 = 64;

/// Error type for configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File not found.
    #[error("Config file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// Parsed, but the values make no sense together.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Settings for battles and boost searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Side receiving the boost.
    pub boosted_side: Side,
    /// First boost tried by a search.
    pub floor: u32,
    /// Last boost tried by a search, inclusive.
    pub ceiling: u32,
    /// Consecutive boosts evaluated together by the parallel search.
    pub window: u32,
    /// Worker threads for the parallel search (0 = rayon default).
    pub threads: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            boosted_side: Side::A,
            floor: 0,
            ceiling: DEFAULT_BOOST_CEILING,
            window: DEFAULT_WINDOW,
            threads: 0,
        }
    }
}

impl SimConfig {
    /// Load a config from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Parse and validate a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(ron)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no search could use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window == 0 {
            return Err(ConfigError::Invalid("window must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Set the boosted side.
    pub fn with_side(mut self, side: Side) -> Self {
        self.boosted_side = side;
        self
    }

    /// Set the first boost tried.
    pub fn with_floor(mut self, floor: u32) -> Self {
        self.floor = floor;
        self
    }

    /// Set the last boost tried.
    pub fn with_ceiling(mut self, ceiling: u32) -> Self {
        self.ceiling = ceiling;
        self
    }

    /// Set the parallel window size.
    pub fn with_window(mut self, window: u32) -> Self {
        self.window = window;
        self
    }

    /// Set the worker thread count.
    pub fn with_threads(mut self, threads: u32) -> Self {
        self.threads = threads;
        self
    }

    /// The linear search these settings describe.
    pub fn search(&self) -> BoostSearch {
        BoostSearch::new(self.boosted_side)
            .with_floor(self.floor)
            .with_ceiling(self.ceiling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SimConfig::default();
        assert_eq!(config.boosted_side, Side::A);
        assert_eq!(config.ceiling, DEFAULT_BOOST_CEILING);
        assert_eq!(config.search(), BoostSearch::new(Side::A));
    }

    #[test]
    fn test_partial_ron_keeps_defaults() {
        let config = SimConfig::from_ron_str("(boosted_side: B, floor: 10)").unwrap();
        assert_eq!(config.boosted_side, Side::B);
        assert_eq!(config.floor, 10);
        assert_eq!(config.window, DEFAULT_WINDOW);
    }

    #[test]
    fn test_zero_window_rejected() {
        let err = SimConfig::from_ron_str("(window: 0)").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_builders() {
        let config = SimConfig::default()
            .with_side(Side::B)
            .with_floor(3)
            .with_ceiling(9)
            .with_window(2)
            .with_threads(4);
        assert_eq!(config.search().floor, 3);
        assert_eq!(config.search().ceiling, 9);
        assert_eq!(config.search().side, Side::B);
        assert_eq!(config.window, 2);
        assert_eq!(config.threads, 4);
    }
}
