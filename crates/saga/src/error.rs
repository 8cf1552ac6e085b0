//! Saga error types.

use thiserror::Error;

use crate::run::StepFailure;
use crate::state::RunStatus;

/// Errors that can occur during saga operations.
#[derive(Debug, Error)]
pub enum SagaError {
    /// The scenario contains no steps.
    #[error("Scenario has no steps")]
    EmptyScenario,

    /// The run is in an invalid state for the requested operation.
    #[error("Invalid run state: expected {expected}, actual {actual}")]
    InvalidState {
        expected: &'static str,
        actual: RunStatus,
    },

    /// A step failed and the run was aborted.
    #[error("{0}")]
    StepFailed(Box<StepFailure>),
}

/// Errors raised while resolving a step's argument template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// The placeholder names a step that has not run before this one.
    #[error("step {step} references the result of step {referenced}, which has not run yet")]
    ForwardReference { step: usize, referenced: usize },

    /// The referenced step ran but produced no value.
    #[error("step {step} references the result of step {referenced}, which produced no value")]
    MissingValue { step: usize, referenced: usize },
}

/// Convenience type alias for saga results.
pub type Result<T> = std::result::Result<T, SagaError>;
