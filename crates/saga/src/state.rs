//! Saga run state machine.

use serde::{Deserialize, Serialize};

/// The status of a saga run in its lifecycle.
///
/// Transitions only move forward:
/// ```text
/// Pending ──► Running ──┬──► Completed
///                       └──► Aborted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RunStatus {
    /// The run has not started yet.
    #[default]
    Pending,

    /// Steps are being dispatched.
    Running,

    /// A step failed and no further steps will run (terminal state).
    Aborted,

    /// Every step succeeded (terminal state).
    Completed,
}

impl RunStatus {
    /// Returns true if the run can begin.
    pub fn can_start(&self) -> bool {
        matches!(self, RunStatus::Pending)
    }

    /// Returns true if steps may still be recorded.
    pub fn is_running(&self) -> bool {
        matches!(self, RunStatus::Running)
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Aborted | RunStatus::Completed)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Pending => "Pending",
            RunStatus::Running => "Running",
            RunStatus::Aborted => "Aborted",
            RunStatus::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
