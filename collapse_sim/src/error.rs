//! Error types for the scenario harness.

use collapse_core::CollapseError;
use thiserror::Error;

/// Errors that stop a run before it produces a result.
///
/// A scenario whose checks fail is not an error; it comes back as a
/// `ScenarioResult` with `passed == false`.
#[derive(Debug, Error)]
pub enum SimError {
    /// Invalid grid or distribution configuration
    #[error("Configuration error: {0}")]
    Config(#[from] CollapseError),

    /// Command-line flags that cannot be combined
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Scenario name did not parse
    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),

    /// Scenario setup did not produce an expected object
    #[error("Missing object: {0}")]
    MissingObject(String),

    /// Export file could not be written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Export could not be serialized
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
