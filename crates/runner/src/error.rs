//! Runner error types.

use scenario::ScenarioError;
use thiserror::Error;

/// Errors that stop the runner before or while reporting a saga run.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Scenario error: {0}")]
    Scenario(#[from] ScenarioError),

    #[error("Metrics recorder error: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("Report output error: {0}")]
    Output(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RunnerError>;
