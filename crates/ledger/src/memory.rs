use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    InvokeReceipt, LedgerCall, LedgerClient, LedgerError, Listener, ListenerRegistry,
    OperationKind, Result,
};

/// A call observed by [`InMemoryLedger`], in dispatch order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub kind: OperationKind,
    pub call: LedgerCall,
}

#[derive(Debug, Default)]
struct LedgerState {
    calls: Vec<RecordedCall>,
    responses: HashMap<String, String>,
    fail_on_function: HashMap<String, LedgerError>,
    fail_on_call: HashMap<usize, LedgerError>,
    next_tx: u32,
}

/// Dry-run ledger client.
///
/// Records every call, registers one commit listener per successful invoke,
/// and answers queries from a table of canned responses. Unconfigured queries
/// echo the call as `function(arg, ...)`. No contract logic is evaluated.
#[derive(Clone)]
pub struct InMemoryLedger {
    state: Arc<Mutex<LedgerState>>,
    listeners: Arc<dyn ListenerRegistry>,
}

impl InMemoryLedger {
    /// Creates a ledger that registers commit listeners with `listeners`.
    pub fn new(listeners: Arc<dyn ListenerRegistry>) -> Self {
        Self {
            state: Arc::new(Mutex::new(LedgerState::default())),
            listeners,
        }
    }

    /// Sets the payload returned by every call to `function`.
    pub async fn respond_to(&self, function: impl Into<String>, payload: impl Into<String>) {
        self.state
            .lock()
            .await
            .responses
            .insert(function.into(), payload.into());
    }

    /// Makes every call to `function` fail with `error`.
    pub async fn fail_on_function(&self, function: impl Into<String>, error: LedgerError) {
        self.state
            .lock()
            .await
            .fail_on_function
            .insert(function.into(), error);
    }

    /// Makes the call at zero-based dispatch position `index` fail with `error`.
    pub async fn fail_on_call(&self, index: usize, error: LedgerError) {
        self.state.lock().await.fail_on_call.insert(index, error);
    }

    /// Returns every call received so far.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().await.calls.clone()
    }

    /// Returns the number of calls received so far.
    pub async fn call_count(&self) -> usize {
        self.state.lock().await.calls.len()
    }

    /// Returns the function names of every call, in order.
    pub async fn dispatched_functions(&self) -> Vec<String> {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .map(|recorded| recorded.call.function.clone())
            .collect()
    }

    async fn record(&self, kind: OperationKind, call: &LedgerCall) -> Result<Option<String>> {
        let mut state = self.state.lock().await;
        let position = state.calls.len();
        state.calls.push(RecordedCall {
            kind,
            call: call.clone(),
        });

        if let Some(error) = state.fail_on_call.get(&position) {
            return Err(error.clone());
        }
        if let Some(error) = state.fail_on_function.get(&call.function) {
            return Err(error.clone());
        }

        Ok(state.responses.get(&call.function).cloned())
    }
}

#[async_trait]
impl LedgerClient for InMemoryLedger {
    async fn invoke(&self, call: &LedgerCall) -> Result<InvokeReceipt> {
        let payload = self.record(OperationKind::Invoke, call).await?;

        let transaction_id = {
            let mut state = self.state.lock().await;
            state.next_tx += 1;
            format!("tx-{:04}", state.next_tx)
        };
        self.listeners
            .register(Listener::commit(&transaction_id, &call.organization));

        tracing::debug!(
            function = %call.function,
            organization = %call.organization,
            %transaction_id,
            "dry-run invoke committed"
        );

        Ok(InvokeReceipt {
            transaction_id,
            payload,
        })
    }

    async fn query(&self, call: &LedgerCall) -> Result<String> {
        let payload = self.record(OperationKind::Query, call).await?;
        Ok(payload.unwrap_or_else(|| format!("{}({})", call.function, call.args.join(", "))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryListenerRegistry;

    fn setup() -> (InMemoryLedger, InMemoryListenerRegistry) {
        let registry = InMemoryListenerRegistry::new();
        let ledger = InMemoryLedger::new(Arc::new(registry.clone()));
        (ledger, registry)
    }

    fn call(function: &str) -> LedgerCall {
        LedgerCall::new("importerorg", "Importer", "v1", function).with_args(vec!["t1".into()])
    }

    #[tokio::test]
    async fn test_invoke_registers_listener() {
        let (ledger, registry) = setup();

        let r1 = ledger.invoke(&call("requestTrade")).await.unwrap();
        let r2 = ledger.invoke(&call("requestLC")).await.unwrap();

        assert_eq!(r1.transaction_id, "tx-0001");
        assert_eq!(r2.transaction_id, "tx-0002");
        assert!(r1.payload.is_none());
        assert_eq!(registry.active_count(), 2);
    }

    #[tokio::test]
    async fn test_query_does_not_register_listener() {
        let (ledger, registry) = setup();

        let value = ledger.query(&call("getTradeStatus")).await.unwrap();
        assert_eq!(value, "getTradeStatus(t1)");
        assert_eq!(registry.active_count(), 0);
    }

    #[tokio::test]
    async fn test_canned_response() {
        let (ledger, _) = setup();
        ledger
            .respond_to("getTradeStatus", "{\"Status\":\"ACCEPTED\"}")
            .await;

        let value = ledger.query(&call("getTradeStatus")).await.unwrap();
        assert_eq!(value, "{\"Status\":\"ACCEPTED\"}");
    }

    #[tokio::test]
    async fn test_fail_on_function() {
        let (ledger, registry) = setup();
        ledger
            .fail_on_function("acceptTrade", LedgerError::Transport("peer down".into()))
            .await;

        let result = ledger.invoke(&call("acceptTrade")).await;
        assert_eq!(result, Err(LedgerError::Transport("peer down".into())));
        assert_eq!(registry.active_count(), 0);
        // Failed calls are still recorded.
        assert_eq!(ledger.call_count().await, 1);
    }

    #[tokio::test]
    async fn test_fail_on_call_position() {
        let (ledger, _) = setup();
        ledger
            .fail_on_call(1, LedgerError::EndorsementRejected("policy".into()))
            .await;

        assert!(ledger.query(&call("getTradeStatus")).await.is_ok());
        assert!(ledger.query(&call("getTradeStatus")).await.is_err());
        assert!(ledger.query(&call("getTradeStatus")).await.is_ok());
    }

    #[tokio::test]
    async fn test_calls_are_recorded_in_order() {
        let (ledger, _) = setup();
        ledger.invoke(&call("requestTrade")).await.unwrap();
        ledger.query(&call("getTradeStatus")).await.unwrap();

        let calls = ledger.calls().await;
        assert_eq!(calls[0].kind, OperationKind::Invoke);
        assert_eq!(calls[1].kind, OperationKind::Query);
        assert_eq!(
            ledger.dispatched_functions().await,
            vec!["requestTrade", "getTradeStatus"]
        );
    }
}
