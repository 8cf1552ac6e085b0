//! Mutable state of one saga run.

use common::RunId;
use ledger::OperationKind;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SagaError};
use crate::events::{SagaEvent, StepDispatchedData, StepFailedData, StepSucceededData};
use crate::state::RunStatus;
use crate::step::{Step, StepResult};

/// Why a step failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureCause {
    /// The ledger call returned an error.
    Ledger,
    /// The argument template could not be bound; the call was never sent.
    Binding,
}

/// The step that aborted a run, with everything needed to report it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFailure {
    pub index: usize,
    pub label: String,
    pub kind: OperationKind,
    pub organization: String,
    pub caller: String,
    pub function: String,
    /// Bound arguments, or the raw template when binding itself failed.
    pub args: Vec<String>,
    pub cause: FailureCause,
    pub reason: String,
}

impl StepFailure {
    /// Describes a failed step.
    pub fn new(
        index: usize,
        step: &Step,
        args: Vec<String>,
        cause: FailureCause,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            index,
            label: step.display_label().to_string(),
            kind: step.kind(),
            organization: step.organization().to_string(),
            caller: step.caller_identity().to_string(),
            function: step.function().to_string(),
            args,
            cause,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for StepFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Step {} '{}' failed ({} {} as {}@{}, args [{}]): {}",
            self.index,
            self.label,
            self.kind,
            self.function,
            self.caller,
            self.organization,
            self.args.join(", "),
            self.reason
        )
    }
}

/// The executor's state for one execution of a scenario.
///
/// Results are stored by step position so later steps can bind to them.
/// Status only moves forward; once terminal, nothing more can be recorded.
#[derive(Debug, Clone)]
pub struct SagaRun {
    run_id: RunId,
    step_count: usize,
    cursor: usize,
    status: RunStatus,
    results: Vec<StepResult>,
    failure: Option<StepFailure>,
    journal: Vec<SagaEvent>,
}

impl SagaRun {
    /// Creates a pending run over `step_count` steps.
    pub fn new(step_count: usize) -> Self {
        Self {
            run_id: RunId::new(),
            step_count,
            cursor: 0,
            status: RunStatus::Pending,
            results: Vec::with_capacity(step_count),
            failure: None,
            journal: Vec::new(),
        }
    }

    fn require_running(&self) -> Result<()> {
        if self.status.is_running() {
            Ok(())
        } else {
            Err(SagaError::InvalidState {
                expected: "Running",
                actual: self.status,
            })
        }
    }

    /// Moves the run from Pending to Running.
    pub fn start(&mut self) -> Result<()> {
        if !self.status.can_start() {
            return Err(SagaError::InvalidState {
                expected: "Pending",
                actual: self.status,
            });
        }
        self.status = RunStatus::Running;
        self.journal
            .push(SagaEvent::run_started(self.run_id, self.step_count));
        Ok(())
    }

    /// Records that the step at the cursor was sent with `args`.
    pub fn record_dispatch(&mut self, step: &Step, args: &[String]) -> Result<()> {
        self.require_running()?;
        self.journal
            .push(SagaEvent::StepDispatched(StepDispatchedData {
                index: self.cursor,
                label: step.display_label().to_string(),
                kind: step.kind(),
                organization: step.organization().to_string(),
                caller: step.caller_identity().to_string(),
                function: step.function().to_string(),
                args: args.to_vec(),
            }));
        Ok(())
    }

    /// Stores the result of the step at the cursor and advances it.
    pub fn record_success(
        &mut self,
        step: &Step,
        value: Option<String>,
        transaction_id: Option<String>,
    ) -> Result<()> {
        self.require_running()?;
        self.journal.push(SagaEvent::StepSucceeded(StepSucceededData {
            index: self.cursor,
            label: step.display_label().to_string(),
            kind: step.kind(),
            function: step.function().to_string(),
            value: value.clone(),
            transaction_id,
        }));
        self.results.push(StepResult::success(value));
        self.cursor += 1;
        Ok(())
    }

    /// Stops the run at the step described by `failure`.
    ///
    /// The cursor stays on the failed step.
    pub fn abort(&mut self, failure: StepFailure) -> Result<()> {
        self.require_running()?;
        self.journal.push(SagaEvent::StepFailed(StepFailedData {
            index: failure.index,
            label: failure.label.clone(),
            kind: failure.kind,
            function: failure.function.clone(),
            error: failure.reason.clone(),
        }));
        self.journal
            .push(SagaEvent::run_aborted(&failure.label, &failure.reason));
        self.results.push(StepResult::failure(&failure.reason));
        self.status = RunStatus::Aborted;
        self.failure = Some(failure);
        Ok(())
    }

    /// Marks the run completed. Every step must have a result.
    pub fn complete(&mut self) -> Result<()> {
        self.require_running()?;
        if self.cursor != self.step_count {
            return Err(SagaError::InvalidState {
                expected: "all steps recorded",
                actual: self.status,
            });
        }
        self.status = RunStatus::Completed;
        self.journal.push(SagaEvent::run_completed());
        Ok(())
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Index of the next step to execute, or of the failed step after an abort.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn results(&self) -> &[StepResult] {
        &self.results
    }

    pub fn last_result(&self) -> Option<&StepResult> {
        self.results.last()
    }

    pub fn failure(&self) -> Option<&StepFailure> {
        self.failure.as_ref()
    }

    pub fn journal(&self) -> &[SagaEvent] {
        &self.journal
    }

    /// Process exit code for this run: 0 when completed, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self.status {
            RunStatus::Completed => 0,
            _ => 1,
        }
    }

    /// Converts the run into its last result, or the failure that aborted it.
    pub fn into_result(self) -> Result<Option<StepResult>> {
        match (self.status, self.failure) {
            (RunStatus::Completed, _) => Ok(self.results.last().cloned()),
            (_, Some(failure)) => Err(SagaError::StepFailed(Box::new(failure))),
            (status, None) => Err(SagaError::InvalidState {
                expected: "terminal",
                actual: status,
            }),
        }
    }
}
