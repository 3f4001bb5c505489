//! Scenario loading from disk.
//!
//! Files ending in `.ron` are read as serialized [`Scenario`] data; anything
//! else is treated as the plain-text roster grammar.

use std::path::Path;

use immune_core::error::GameError;
use immune_core::scenario::Scenario;
use thiserror::Error;
use tracing::debug;

/// Error type for scenario loading.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Contents did not parse or validate.
    #[error("Invalid scenario in {path}: {source}")]
    Invalid {
        /// File the error came from.
        path: String,
        /// Underlying parse or validation error.
        #[source]
        source: GameError,
    },
}

/// Input format, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioFormat {
    /// Plain-text roster.
    Text,
    /// Serialized RON scenario.
    Ron,
}

impl ScenarioFormat {
    /// Format for `path`.
    #[must_use]
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("ron") => Self::Ron,
            _ => Self::Text,
        }
    }

    /// Parse `contents` in this format.
    pub fn parse(self, contents: &str) -> Result<Scenario, GameError> {
        match self {
            Self::Text => Scenario::parse(contents),
            Self::Ron => Scenario::from_ron_str(contents),
        }
    }
}

/// Load a scenario from a file.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Scenario, ScenarioError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ScenarioError::FileNotFound(path.display().to_string()));
    }
    let format = ScenarioFormat::for_path(path);
    debug!(path = %path.display(), ?format, "Loading scenario");

    let contents = std::fs::read_to_string(path)?;
    format
        .parse(&contents)
        .map_err(|source| ScenarioError::Invalid {
            path: path.display().to_string(),
            source,
        })
}

/// Load `path` if given, otherwise the built-in sample.
pub fn load_or_sample(path: Option<&Path>) -> Result<Scenario, ScenarioError> {
    match path {
        Some(path) => load(path),
        None => {
            debug!("No input given, using built-in sample");
            Ok(Scenario::sample())
        }
    }
}

/// Write `scenario` as RON.
pub fn save_ron<P: AsRef<Path>>(scenario: &Scenario, path: P) -> Result<(), ScenarioError> {
    let path = path.as_ref();
    let ron = scenario
        .to_ron_string()
        .map_err(|source| ScenarioError::Invalid {
            path: path.display().to_string(),
            source,
        })?;
    std::fs::write(path, ron)?;
    Ok(())
}
