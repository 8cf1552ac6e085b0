use thiserror::Error;

/// Errors reported by a ledger call.
///
/// Every variant is fatal for the saga run that issued the call; retries, if
/// any, belong to the client implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The call never reached the ledger, or the response was lost.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Peers refused to endorse the proposal.
    #[error("Endorsement rejected: {0}")]
    EndorsementRejected(String),

    /// The contract function ran and returned an error.
    #[error("Contract rejected {function}: {reason}")]
    ContractRejected { function: String, reason: String },

    /// The caller's identity is not allowed to perform the call.
    #[error("Access denied for {caller}@{organization}")]
    AccessDenied {
        organization: String,
        caller: String,
    },
}

/// Errors raised while releasing listeners.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListenerError {
    /// One or more listeners could not be released.
    #[error("Listener release failed: {0}")]
    ReleaseFailed(String),
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
