//! Saga executor for running ordered step lists against the ledger.

use std::sync::Arc;

use ledger::{LedgerClient, OperationKind};
use tokio::sync::mpsc::UnboundedSender;

use crate::binding;
use crate::error::SagaError;
use crate::events::SagaEvent;
use crate::run::{FailureCause, SagaRun, StepFailure};
use crate::state::RunStatus;
use crate::step::Step;
use crate::teardown::{TeardownCoordinator, TeardownTrigger};

/// Drives a list of steps through a [`LedgerClient`], one at a time.
///
/// Step N+1 is dispatched only after step N's call has resolved. The first
/// failure stops the run; completed steps are not undone since ledger
/// operations cannot be reversed by the client. Teardown is requested on
/// every exit path, after the last dispatched step.
pub struct SagaExecutor<L>
where
    L: LedgerClient,
{
    ledger: L,
    teardown: Arc<TeardownCoordinator>,
    events: Option<UnboundedSender<SagaEvent>>,
}

impl<L> SagaExecutor<L>
where
    L: LedgerClient,
{
    /// Creates a new saga executor.
    pub fn new(ledger: L, teardown: Arc<TeardownCoordinator>) -> Self {
        Self {
            ledger,
            teardown,
            events: None,
        }
    }

    /// Forwards every journal event to `sink` as soon as it is recorded.
    pub fn with_event_sink(mut self, sink: UnboundedSender<SagaEvent>) -> Self {
        self.events = Some(sink);
        self
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn teardown(&self) -> &Arc<TeardownCoordinator> {
        &self.teardown
    }

    /// Executes `steps` in list order.
    ///
    /// Returns the finished run, either Completed or Aborted; an aborted run
    /// carries the [`StepFailure`] of the step that stopped it. Only an empty
    /// step list is rejected up front.
    #[tracing::instrument(skip(self, steps), fields(steps = steps.len()))]
    pub async fn run(&self, steps: &[Step]) -> Result<SagaRun, SagaError> {
        if steps.is_empty() {
            self.teardown.request_teardown(TeardownTrigger::Aborted);
            return Err(SagaError::EmptyScenario);
        }

        metrics::counter!("saga_runs_total").increment(1);
        let saga_start = std::time::Instant::now();

        let mut run = SagaRun::new(steps.len());
        let mut published = 0;
        let outcome = self.drive(&mut run, steps, &mut published).await;
        self.publish(&run, &mut published);

        let duration = saga_start.elapsed().as_secs_f64();
        metrics::histogram!("saga_duration_seconds").record(duration);

        match run.status() {
            RunStatus::Completed => {
                metrics::counter!("saga_completed").increment(1);
                tracing::info!(run_id = %run.run_id(), duration, "saga completed successfully");
                self.teardown.request_teardown(TeardownTrigger::Completed);
            }
            _ => {
                metrics::counter!("saga_aborted").increment(1);
                if let Some(failure) = run.failure() {
                    tracing::warn!(
                        run_id = %run.run_id(),
                        step = %failure.label,
                        reason = %failure.reason,
                        "saga aborted"
                    );
                }
                self.teardown.request_teardown(TeardownTrigger::Aborted);
            }
        }

        outcome.map(|()| run)
    }

    fn publish(&self, run: &SagaRun, published: &mut usize) {
        if let Some(sink) = &self.events {
            for event in &run.journal()[*published..] {
                // A closed receiver only means nobody is watching.
                let _ = sink.send(event.clone());
            }
        }
        *published = run.journal().len();
    }

    async fn drive(
        &self,
        run: &mut SagaRun,
        steps: &[Step],
        published: &mut usize,
    ) -> Result<(), SagaError> {
        run.start()?;

        for (index, step) in steps.iter().enumerate() {
            let args = match binding::bind(index, step, run.results()) {
                Ok(args) => args,
                Err(e) => {
                    tracing::error!(index, step = step.display_label(), error = %e, "argument binding failed");
                    let failure = StepFailure::new(
                        index,
                        step,
                        step.template_strings(),
                        FailureCause::Binding,
                        e.to_string(),
                    );
                    return run.abort(failure);
                }
            };

            tracing::info!(
                index,
                step = step.display_label(),
                kind = %step.kind(),
                organization = step.organization(),
                caller = step.caller_identity(),
                function = step.function(),
                "saga step started"
            );
            run.record_dispatch(step, &args)?;
            self.publish(run, published);
            metrics::counter!("saga_steps_total", "kind" => step.kind().as_str()).increment(1);

            let call = step.to_call(args);
            let outcome = match step.kind() {
                OperationKind::Invoke => self
                    .ledger
                    .invoke(&call)
                    .await
                    .map(|receipt| (receipt.payload, Some(receipt.transaction_id))),
                OperationKind::Query => self.ledger.query(&call).await.map(|value| (Some(value), None)),
            };

            match outcome {
                Ok((value, transaction_id)) => {
                    tracing::info!(
                        index,
                        step = step.display_label(),
                        value = value.as_deref().unwrap_or(""),
                        "saga step succeeded"
                    );
                    run.record_success(step, value, transaction_id)?;
                    self.publish(run, published);
                }
                Err(e) => {
                    tracing::error!(
                        index,
                        step = step.display_label(),
                        organization = step.organization(),
                        function = step.function(),
                        args = ?call.args,
                        error = %e,
                        "saga step failed"
                    );
                    let failure =
                        StepFailure::new(index, step, call.args, FailureCause::Ledger, e.to_string());
                    return run.abort(failure);
                }
            }
        }

        run.complete()
    }
}
