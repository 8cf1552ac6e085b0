//! Named step lists and their JSON form.

use std::path::Path;

use saga::Step;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScenarioError};

/// A named, ordered list of steps.
///
/// JSON form:
/// ```json
/// {
///   "name": "lc-issuance",
///   "steps": [
///     {"kind": "invoke", "organization": "importerorg", "caller": "ImportersBank",
///      "function": "issueLC", "args": ["t1", "lc8349"]},
///     {"kind": "query", "organization": "exporterorg", "function": "getLCStatus",
///      "args": [{"result_of": 0}]}
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Creates a scenario without validating it.
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            name: name.into(),
            description: None,
            steps,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Parses and validates a scenario from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let scenario: Scenario = serde_json::from_str(json)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Reads, parses and validates a scenario file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let scenario = Self::from_json_str(&json)?;
        tracing::debug!(path = %path.display(), name = %scenario.name, steps = scenario.steps.len(), "scenario loaded");
        Ok(scenario)
    }

    /// Serializes the scenario as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rejects empty scenarios and placeholders that do not point backwards.
    pub fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            return Err(ScenarioError::Empty(self.name.clone()));
        }
        saga::binding::check_references(&self.steps)?;
        Ok(())
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
