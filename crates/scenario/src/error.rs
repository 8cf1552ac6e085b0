//! Scenario error types.

use saga::BindingError;
use thiserror::Error;

/// Errors that can occur while loading or building a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// The scenario file could not be read.
    #[error("Failed to read scenario: {0}")]
    Io(#[from] std::io::Error),

    /// The scenario file is not valid JSON or does not match the step schema.
    #[error("Failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),

    /// The scenario has no steps.
    #[error("Scenario '{0}' has no steps")]
    Empty(String),

    /// A placeholder refers to the same or a later step.
    #[error("Invalid result reference: {0}")]
    InvalidReference(#[from] BindingError),

    /// No built-in scenario has this name.
    #[error("Unknown scenario '{0}'")]
    UnknownScenario(String),
}

/// Convenience type alias for scenario results.
pub type Result<T> = std::result::Result<T, ScenarioError>;
