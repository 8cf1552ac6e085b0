//! Command-line runner for trade saga scenarios.
//!
//! Loads a built-in or file-based scenario, runs it against the dry-run
//! ledger, and prints the step report. Logging goes to stderr through
//! tracing; the report goes to stdout.

pub mod config;
pub mod error;
pub mod report;

use std::future::Future;
use std::io::Write;
use std::sync::Arc;

use ledger::{InMemoryLedger, LedgerClient, LedgerError, ListenerRegistry};
use saga::{SagaEvent, SagaExecutor, TeardownGuard, TeardownTrigger, spawn_supervised};
use scenario::{BUILTIN_SCENARIOS, Scenario, TradeParams};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use config::{Config, LogFormat};
pub use error::{Result, RunnerError};
use report::Report;

/// Exit status when a signal interrupts the run.
pub const EXIT_INTERRUPTED: i32 = 130;

/// Exit status when the saga task fails without producing a run.
pub const EXIT_FAILED: i32 = 1;

/// Installs the global tracing subscriber.
pub fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

/// Resolves `config.scenario` as a built-in name first, then as a file path.
pub fn load_scenario(config: &Config) -> Result<Scenario> {
    if BUILTIN_SCENARIOS.iter().any(|name| *name == config.scenario) {
        let params = TradeParams::new(&config.trade_id, &config.contract_version);
        return Ok(scenario::builtin(&config.scenario, &params)?);
    }
    Ok(Scenario::from_path(&config.scenario)?)
}

/// Creates the dry-run ledger, rejecting `config.fail_at` if set.
pub async fn build_ledger(config: &Config, listeners: Arc<dyn ListenerRegistry>) -> InMemoryLedger {
    let ledger = InMemoryLedger::new(listeners);
    if let Some(function) = &config.fail_at {
        tracing::warn!(function = %function, "fault injection enabled");
        ledger
            .fail_on_function(
                function.clone(),
                LedgerError::ContractRejected {
                    function: function.clone(),
                    reason: "injected failure".to_string(),
                },
            )
            .await;
    }
    ledger
}

/// Runs `scenario` in a supervised task until it finishes or `shutdown`
/// resolves, writing each step's report block to `out` as the step ends.
///
/// Returns the process exit code: the run's own code, [`EXIT_FAILED`] when
/// the task failed, or [`EXIT_INTERRUPTED`] when `shutdown` won. Teardown has
/// finished by the time this returns.
pub async fn run_with_shutdown<L, W, S>(
    scenario: Scenario,
    ledger: L,
    guard: TeardownGuard,
    out: &mut W,
    shutdown: S,
) -> Result<i32>
where
    L: LedgerClient + 'static,
    W: Write,
    S: Future<Output = ()>,
{
    let teardown = guard.coordinator().clone();
    let (sink, mut events) = tokio::sync::mpsc::unbounded_channel();
    let executor = SagaExecutor::new(ledger, teardown.clone()).with_event_sink(sink);

    let steps = scenario.steps;
    let mut saga = spawn_supervised(teardown.clone(), "saga", async move {
        executor.run(&steps).await
    });

    let mut report = Report::new();
    tokio::pin!(shutdown);

    let code = loop {
        tokio::select! {
            biased;

            () = &mut shutdown => {
                drain(&mut events, &mut report, out)?;
                tracing::warn!("shutdown requested before the saga finished");
                teardown.request_teardown(TeardownTrigger::ProcessExit);
                break EXIT_INTERRUPTED;
            }
            joined = &mut saga => {
                drain(&mut events, &mut report, out)?;
                break match joined {
                    Ok(Some(run)) => run.exit_code(),
                    // Already logged and torn down by the supervisor.
                    _ => EXIT_FAILED,
                };
            }
            Some(event) = events.recv() => {
                out.write_all(report.render_event(&event).as_bytes())?;
            }
        }
    };

    out.flush()?;
    guard.finish();
    Ok(code)
}

fn drain<W: Write>(
    events: &mut UnboundedReceiver<SagaEvent>,
    report: &mut Report,
    out: &mut W,
) -> Result<()> {
    while let Ok(event) = events.try_recv() {
        out.write_all(report.render_event(&event).as_bytes())?;
    }
    Ok(())
}
