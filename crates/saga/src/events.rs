//! Saga run journal events.

use chrono::{DateTime, Utc};
use common::RunId;
use ledger::OperationKind;
use serde::{Deserialize, Serialize};

/// Events recorded while a saga run executes, in the order they happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SagaEvent {
    /// The run started.
    RunStarted(RunStartedData),

    /// A step's arguments were bound and the call was sent to the ledger.
    StepDispatched(StepDispatchedData),

    /// A step returned successfully.
    StepSucceeded(StepSucceededData),

    /// A step failed (ledger failure or binding failure).
    StepFailed(StepFailedData),

    /// Every step succeeded.
    RunCompleted(RunCompletedData),

    /// The run stopped at a failed step.
    RunAborted(RunAbortedData),
}

impl SagaEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            SagaEvent::RunStarted(_) => "RunStarted",
            SagaEvent::StepDispatched(_) => "StepDispatched",
            SagaEvent::StepSucceeded(_) => "StepSucceeded",
            SagaEvent::StepFailed(_) => "StepFailed",
            SagaEvent::RunCompleted(_) => "RunCompleted",
            SagaEvent::RunAborted(_) => "RunAborted",
        }
    }
}

/// Data for RunStarted event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStartedData {
    pub run_id: RunId,
    pub step_count: usize,
    pub started_at: DateTime<Utc>,
}

/// Data for StepDispatched event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDispatchedData {
    pub index: usize,
    pub label: String,
    pub kind: OperationKind,
    pub organization: String,
    pub caller: String,
    pub function: String,
    /// Arguments after binding.
    pub args: Vec<String>,
}

/// Data for StepSucceeded event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSucceededData {
    pub index: usize,
    pub label: String,
    pub kind: OperationKind,
    pub function: String,
    pub value: Option<String>,
    /// Set for invoke steps.
    pub transaction_id: Option<String>,
}

/// Data for StepFailed event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepFailedData {
    pub index: usize,
    pub label: String,
    pub kind: OperationKind,
    pub function: String,
    pub error: String,
}

/// Data for RunCompleted event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunCompletedData {
    pub completed_at: DateTime<Utc>,
}

/// Data for RunAborted event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunAbortedData {
    /// Label of the step that failed.
    pub failed_step: String,
    pub reason: String,
    pub aborted_at: DateTime<Utc>,
}

// Convenience constructors
impl SagaEvent {
    /// Creates a RunStarted event.
    pub fn run_started(run_id: RunId, step_count: usize) -> Self {
        SagaEvent::RunStarted(RunStartedData {
            run_id,
            step_count,
            started_at: Utc::now(),
        })
    }

    /// Creates a RunCompleted event.
    pub fn run_completed() -> Self {
        SagaEvent::RunCompleted(RunCompletedData {
            completed_at: Utc::now(),
        })
    }

    /// Creates a RunAborted event.
    pub fn run_aborted(failed_step: impl Into<String>, reason: impl Into<String>) -> Self {
        SagaEvent::RunAborted(RunAbortedData {
            failed_step: failed_step.into(),
            reason: reason.into(),
            aborted_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatched() -> SagaEvent {
        SagaEvent::StepDispatched(StepDispatchedData {
            index: 0,
            label: "requestTrade".into(),
            kind: OperationKind::Invoke,
            organization: "importerorg".into(),
            caller: "Importer".into(),
            function: "requestTrade".into(),
            args: vec!["t1".into(), "50000".into()],
        })
    }

    #[test]
    fn test_event_type() {
        assert_eq!(
            SagaEvent::run_started(RunId::new(), 3).event_type(),
            "RunStarted"
        );
        assert_eq!(dispatched().event_type(), "StepDispatched");
        assert_eq!(SagaEvent::run_completed().event_type(), "RunCompleted");
        assert_eq!(
            SagaEvent::run_aborted("acceptTrade", "denied").event_type(),
            "RunAborted"
        );
    }

    #[test]
    fn test_json_shape_is_tagged() {
        let json = serde_json::to_value(dispatched()).unwrap();
        assert_eq!(json["type"], "StepDispatched");
        assert_eq!(json["data"]["kind"], "invoke");
        assert_eq!(json["data"]["args"][1], "50000");
    }

    #[test]
    fn test_run_aborted_data() {
        let event = SagaEvent::run_aborted("acceptTrade", "Access denied");
        let json = serde_json::to_string(&event).unwrap();
        let deserialized: SagaEvent = serde_json::from_str(&json).unwrap();

        if let SagaEvent::RunAborted(data) = deserialized {
            assert_eq!(data.failed_step, "acceptTrade");
            assert_eq!(data.reason, "Access denied");
        } else {
            panic!("Expected RunAborted event");
        }
    }
}
