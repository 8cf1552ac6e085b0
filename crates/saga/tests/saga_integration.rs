//! Integration tests for the saga executor.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use ledger::{
    InMemoryLedger, InMemoryListenerRegistry, InvokeReceipt, LedgerCall, LedgerClient,
    LedgerError, Listener, ListenerRegistry,
};
use saga::{
    FailureCause, RunStatus, SagaExecutor, Step, TeardownCoordinator, TeardownTrigger,
};

struct TestHarness {
    executor: SagaExecutor<InMemoryLedger>,
    ledger: InMemoryLedger,
    registry: InMemoryListenerRegistry,
    teardown: Arc<TeardownCoordinator>,
}

impl TestHarness {
    fn new() -> Self {
        let registry = InMemoryListenerRegistry::new();
        let ledger = InMemoryLedger::new(Arc::new(registry.clone()));
        let teardown = Arc::new(TeardownCoordinator::new(Arc::new(registry.clone())));
        let executor = SagaExecutor::new(ledger.clone(), teardown.clone());

        Self {
            executor,
            ledger,
            registry,
            teardown,
        }
    }
}

/// Ledger whose invokes bump a shared counter and whose queries read it.
/// Fails the test if two calls are ever in flight at once.
#[derive(Default)]
struct CounterLedger {
    counter: AtomicUsize,
    in_flight: AtomicBool,
}

impl CounterLedger {
    async fn enter(&self) {
        assert!(
            !self.in_flight.swap(true, Ordering::SeqCst),
            "two steps were in flight at the same time"
        );
        tokio::task::yield_now().await;
    }

    fn leave(&self) {
        self.in_flight.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl LedgerClient for CounterLedger {
    async fn invoke(&self, _call: &LedgerCall) -> Result<InvokeReceipt, LedgerError> {
        self.enter().await;
        let value = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        self.leave();
        Ok(InvokeReceipt {
            transaction_id: format!("tx-{value}"),
            payload: Some(value.to_string()),
        })
    }

    async fn query(&self, call: &LedgerCall) -> Result<String, LedgerError> {
        self.enter().await;
        let current = self.counter.load(Ordering::SeqCst).to_string();
        self.leave();
        // A query passed the expected counter value asserts on it.
        match call.args.first() {
            Some(expected) if *expected != current => Err(LedgerError::ContractRejected {
                function: call.function.clone(),
                reason: format!("expected {expected}, found {current}"),
            }),
            _ => Ok(current),
        }
    }
}

/// Ledger that records whether teardown had already run at each call.
struct ProbeLedger {
    teardown: Arc<TeardownCoordinator>,
    torn_down_during_call: AtomicBool,
    calls: AtomicUsize,
}

#[async_trait]
impl LedgerClient for ProbeLedger {
    async fn invoke(&self, call: &LedgerCall) -> Result<InvokeReceipt, LedgerError> {
        self.query(call).await.map(|value| InvokeReceipt {
            transaction_id: value,
            payload: None,
        })
    }

    async fn query(&self, _call: &LedgerCall) -> Result<String, LedgerError> {
        if self.teardown.has_run() {
            self.torn_down_during_call.store(true, Ordering::SeqCst);
        }
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(n.to_string())
    }
}

fn five_steps() -> Vec<Step> {
    (1..=5)
        .map(|i| {
            Step::invoke("exporterorg", format!("step{i}"))
                .caller("Exporter")
                .arg("t1")
        })
        .collect()
}

#[tokio::test]
async fn test_steps_run_in_list_order_without_interleaving() {
    let registry = InMemoryListenerRegistry::new();
    let teardown = Arc::new(TeardownCoordinator::new(Arc::new(registry)));
    let executor = SagaExecutor::new(CounterLedger::default(), teardown);

    let mut steps = Vec::new();
    for k in 1..=4 {
        steps.push(Step::invoke("org", "increment"));
        steps.push(Step::query("org", "assertCounter").arg(k.to_string()));
    }

    let run = executor.run(&steps).await.unwrap();

    assert_eq!(run.status(), RunStatus::Completed);
    let observed: Vec<_> = run
        .results()
        .iter()
        .map(|r| r.value().unwrap().to_string())
        .collect();
    assert_eq!(observed, vec!["1", "1", "2", "2", "3", "3", "4", "4"]);
}

#[tokio::test]
async fn test_step_three_of_five_fails() {
    let h = TestHarness::new();
    h.ledger
        .fail_on_call(2, LedgerError::EndorsementRejected("policy not met".into()))
        .await;

    let run = h.executor.run(&five_steps()).await.unwrap();

    assert_eq!(run.status(), RunStatus::Aborted);
    assert_eq!(
        h.ledger.dispatched_functions().await,
        vec!["step1", "step2", "step3"]
    );
    let failure = run.failure().unwrap();
    assert_eq!(failure.index, 2);
    assert_eq!(failure.label, "step3");
    assert_eq!(failure.reason, "Endorsement rejected: policy not met");
    assert_eq!(run.results().len(), 3);
    assert_eq!(run.exit_code(), 1);
    assert_eq!(h.teardown.fired_by(), Some(TeardownTrigger::Aborted));
}

#[tokio::test]
async fn test_prior_result_is_substituted_verbatim() {
    let h = TestHarness::new();
    h.ledger.respond_to("getAccountBalance", "42").await;

    let steps = vec![
        Step::query("exporterorg", "getAccountBalance").args(["t1", "exporter"]),
        Step::invoke("exporterorg", "requestLCTransfer")
            .arg("t1")
            .arg_from(0),
    ];
    let run = h.executor.run(&steps).await.unwrap();

    assert_eq!(run.status(), RunStatus::Completed);
    let calls = h.ledger.calls().await;
    assert_eq!(calls[1].call.args, vec!["t1", "42"]);
}

#[tokio::test]
async fn test_completion_tears_down_once_after_last_step() {
    let registry = InMemoryListenerRegistry::new();
    registry.register(Listener::commit("tx-bootstrap", "exporterorg"));
    let teardown = Arc::new(TeardownCoordinator::new(Arc::new(registry.clone())));
    let ledger = ProbeLedger {
        teardown: teardown.clone(),
        torn_down_during_call: AtomicBool::new(false),
        calls: AtomicUsize::new(0),
    };
    let executor = SagaExecutor::new(ledger, teardown.clone());

    let run = executor.run(&five_steps()).await.unwrap();

    assert_eq!(run.status(), RunStatus::Completed);
    assert_eq!(executor.ledger().calls.load(Ordering::SeqCst), 5);
    assert!(!executor.ledger().torn_down_during_call.load(Ordering::SeqCst));
    assert_eq!(teardown.fired_by(), Some(TeardownTrigger::Completed));
    assert_eq!(registry.release_count(), 1);

    // Later trigger sites are no-ops.
    assert!(!teardown.request_teardown(TeardownTrigger::ProcessExit));
    assert!(!teardown.request_teardown(TeardownTrigger::UncaughtPanic));
    assert_eq!(registry.release_count(), 1);
}

#[tokio::test]
async fn test_accept_trade_failure_stops_before_importer_query() {
    let h = TestHarness::new();
    h.ledger
        .fail_on_function(
            "acceptTrade",
            LedgerError::AccessDenied {
                organization: "exporterorg".into(),
                caller: "Exporter".into(),
            },
        )
        .await;

    let trade_id = "9gsdns3";
    let steps = vec![
        Step::invoke("importerorg", "requestTrade")
            .caller("Importer")
            .args([trade_id, "50000", "Wood for Toys"]),
        Step::query("exporterorg", "getTradeStatus")
            .caller("Exporter")
            .arg(trade_id),
        Step::invoke("exporterorg", "acceptTrade")
            .caller("Exporter")
            .arg(trade_id),
        Step::query("importerorg", "getTradeStatus")
            .caller("Importer")
            .arg(trade_id),
    ];

    let run = h.executor.run(&steps).await.unwrap();

    assert_eq!(run.status(), RunStatus::Aborted);
    assert_eq!(
        h.ledger.dispatched_functions().await,
        vec!["requestTrade", "getTradeStatus", "acceptTrade"]
    );
    let failure = run.failure().unwrap();
    assert_eq!(failure.function, "acceptTrade");
    assert_eq!(failure.label, "acceptTrade");
    assert_eq!(failure.caller, "Exporter");
    assert_eq!(failure.cause, FailureCause::Ledger);

    // The listener from requestTrade was released by the abort path.
    assert_eq!(h.registry.active_count(), 0);
    assert_eq!(h.registry.release_count(), 1);

    let err = run.into_result().unwrap_err();
    assert!(err.to_string().contains("'acceptTrade' failed"));
}

#[tokio::test]
async fn test_mixed_trigger_sources_release_once() {
    let h = TestHarness::new();
    h.ledger
        .fail_on_function("step2", LedgerError::Transport("timeout".into()))
        .await;

    let teardown = h.teardown.clone();
    let concurrent = tokio::spawn(async move {
        let mut performed = 0;
        for _ in 0..50 {
            if teardown.request_teardown(TeardownTrigger::UncaughtPanic) {
                performed += 1;
            }
            tokio::task::yield_now().await;
        }
        performed
    });

    let run = h.executor.run(&five_steps()).await.unwrap();
    let by_task = concurrent.await.unwrap();
    let by_exit = usize::from(h.teardown.request_teardown(TeardownTrigger::ProcessExit));

    assert_eq!(run.status(), RunStatus::Aborted);
    assert!(by_task + by_exit <= 1);
    assert_eq!(h.registry.release_count(), 1);
}
