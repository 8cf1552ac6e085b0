use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Whether a ledger call mutates state or only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// State-mutating call; may register a commit listener.
    Invoke,
    /// Read-only call.
    Query,
}

impl OperationKind {
    /// Returns the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Invoke => "invoke",
            OperationKind::Query => "query",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A fully bound ledger call, ready for dispatch.
///
/// `organization` selects the endorsing peers and `caller` the user identity
/// within that organization. Both are opaque to this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerCall {
    pub organization: String,
    pub caller: String,
    pub contract_version: String,
    pub function: String,
    pub args: Vec<String>,
}

impl LedgerCall {
    /// Creates a call with no arguments.
    pub fn new(
        organization: impl Into<String>,
        caller: impl Into<String>,
        contract_version: impl Into<String>,
        function: impl Into<String>,
    ) -> Self {
        Self {
            organization: organization.into(),
            caller: caller.into(),
            contract_version: contract_version.into(),
            function: function.into(),
            args: Vec::new(),
        }
    }

    /// Sets the positional arguments.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }
}

/// Outcome of a committed invoke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeReceipt {
    /// Transaction id assigned by the ledger.
    pub transaction_id: String,
    /// Payload returned by the contract function, if any.
    pub payload: Option<String>,
}

/// Performs single operations against the ledger on behalf of one identity.
///
/// Implementations resolve the identity, collect endorsements and wait for
/// commit. A successful invoke may register a commit listener with the
/// process-wide [`ListenerRegistry`](crate::ListenerRegistry).
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Submits a state-mutating call and waits for it to commit.
    async fn invoke(&self, call: &LedgerCall) -> Result<InvokeReceipt>;

    /// Evaluates a read-only call and returns its payload.
    async fn query(&self, call: &LedgerCall) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&OperationKind::Invoke).unwrap(),
            "\"invoke\""
        );
        let kind: OperationKind = serde_json::from_str("\"query\"").unwrap();
        assert_eq!(kind, OperationKind::Query);
        assert_eq!(kind.to_string(), "query");
    }

    #[test]
    fn test_call_builder() {
        let call = LedgerCall::new("importerorg", "Importer", "v1", "requestTrade")
            .with_args(vec!["t1".into(), "50000".into()]);
        assert_eq!(call.function, "requestTrade");
        assert_eq!(call.args, vec!["t1", "50000"]);
    }
}
