//! Plain-text step report rendered from a run journal.
//!
//! Each finished step becomes one delimited block:
//!
//! ```text
//! ------------------------------
//! CHAINCODE INVOCATION COMPLETE
//! requestTrade SUCCEEDED
//! ------------------------------
//! ```

use std::fmt::Write;

use saga::{SagaEvent, StepKind};

const RULE: &str = "------------------------------";

/// Renders journal events one at a time, remembering which run they belong to.
#[derive(Debug, Default)]
pub struct Report {
    run: Option<String>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the text for `event`, empty for events that print nothing.
    pub fn render_event(&mut self, event: &SagaEvent) -> String {
        let mut out = String::new();
        match event {
            SagaEvent::RunStarted(data) => {
                self.run = Some(format!("run {}", data.run_id.short()));
            }
            SagaEvent::StepSucceeded(data) => {
                let (heading, detail) = match data.kind {
                    StepKind::Invoke => (
                        "CHAINCODE INVOCATION COMPLETE".to_string(),
                        format!("{} SUCCEEDED", data.label),
                    ),
                    StepKind::Query => (
                        "CHAINCODE QUERY COMPLETE".to_string(),
                        format!(
                            "{} VALUE: {}",
                            data.label,
                            data.value.as_deref().unwrap_or_default()
                        ),
                    ),
                };
                block(&mut out, &heading, &detail);
            }
            SagaEvent::StepFailed(data) => {
                let heading = match data.kind {
                    StepKind::Invoke => format!("CHAINCODE INVOCATION FAILED: {}", data.error),
                    StepKind::Query => format!("CHAINCODE QUERY FAILED: {}", data.error),
                };
                block(&mut out, &heading, &format!("{} FAILED", data.label));
            }
            SagaEvent::RunCompleted(_) => {
                let _ = writeln!(out, "{} completed", self.run_label());
            }
            SagaEvent::RunAborted(data) => {
                let _ = writeln!(
                    out,
                    "{} aborted at {}: {}",
                    self.run_label(),
                    data.failed_step,
                    data.reason
                );
            }
            SagaEvent::StepDispatched(_) => {}
        }
        out
    }

    fn run_label(&self) -> &str {
        self.run.as_deref().unwrap_or("run")
    }
}

/// Renders every step outcome in `journal`, followed by a one-line summary.
pub fn render(journal: &[SagaEvent]) -> String {
    let mut report = Report::new();
    journal
        .iter()
        .map(|event| report.render_event(event))
        .collect()
}

fn block(out: &mut String, heading: &str, detail: &str) {
    let _ = writeln!(out, "{RULE}\n{heading}\n{detail}\n{RULE}\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use saga::events::{StepFailedData, StepSucceededData};

    fn succeeded(label: &str, kind: StepKind, value: Option<&str>) -> SagaEvent {
        SagaEvent::StepSucceeded(StepSucceededData {
            index: 0,
            label: label.into(),
            kind,
            function: label.into(),
            value: value.map(String::from),
            transaction_id: None,
        })
    }

    #[test]
    fn test_invoke_success_block() {
        let report = render(&[succeeded("requestTrade", StepKind::Invoke, None)]);
        assert_eq!(
            report,
            format!("{RULE}\nCHAINCODE INVOCATION COMPLETE\nrequestTrade SUCCEEDED\n{RULE}\n\n")
        );
    }

    #[test]
    fn test_query_success_block_shows_value() {
        let report = render(&[succeeded(
            "getTradeStatus (Exporter)",
            StepKind::Query,
            Some("{\"Status\":\"REQUESTED\"}"),
        )]);
        assert!(report.contains("CHAINCODE QUERY COMPLETE\n"));
        assert!(report.contains("getTradeStatus (Exporter) VALUE: {\"Status\":\"REQUESTED\"}\n"));
    }

    #[test]
    fn test_failure_blocks_and_summary() {
        let journal = vec![
            SagaEvent::StepFailed(StepFailedData {
                index: 2,
                label: "acceptTrade".into(),
                kind: StepKind::Invoke,
                function: "acceptTrade".into(),
                error: "Access denied for Exporter@exporterorg".into(),
            }),
            SagaEvent::run_aborted("acceptTrade", "Access denied for Exporter@exporterorg"),
        ];

        let report = render(&journal);

        assert!(report.contains(
            "CHAINCODE INVOCATION FAILED: Access denied for Exporter@exporterorg\nacceptTrade FAILED\n"
        ));
        assert!(report.ends_with(
            "run aborted at acceptTrade: Access denied for Exporter@exporterorg\n"
        ));
    }

    #[test]
    fn test_query_failure_heading() {
        let report = render(&[SagaEvent::StepFailed(StepFailedData {
            index: 0,
            label: "getLCStatus".into(),
            kind: StepKind::Query,
            function: "getLCStatus".into(),
            error: "Transport error: timeout".into(),
        })]);
        assert!(report.contains("CHAINCODE QUERY FAILED: Transport error: timeout\n"));
    }

    #[test]
    fn test_summary_names_run() {
        let run_id = saga::RunId::new();
        let journal = vec![
            SagaEvent::run_started(run_id, 0),
            SagaEvent::run_completed(),
        ];
        let report = render(&journal);
        assert_eq!(report, format!("run {} completed\n", run_id.short()));
    }

    #[test]
    fn test_incremental_rendering_matches_whole_journal() {
        let journal = vec![
            SagaEvent::run_started(saga::RunId::new(), 2),
            succeeded("requestTrade", StepKind::Invoke, None),
            succeeded("getTradeStatus", StepKind::Query, Some("REQUESTED")),
            SagaEvent::run_completed(),
        ];

        let mut report = Report::new();
        let pieces: Vec<String> = journal.iter().map(|e| report.render_event(e)).collect();

        assert!(pieces[0].is_empty());
        assert!(pieces[1].contains("requestTrade SUCCEEDED"));
        assert_eq!(pieces.concat(), render(&journal));
    }
}
