//! Step and step-result data model.

use ledger::{LedgerCall, OperationKind};
use serde::{Deserialize, Serialize};

/// Contract version used when a step does not name one.
pub const DEFAULT_CONTRACT_VERSION: &str = "v1";

fn default_contract_version() -> String {
    DEFAULT_CONTRACT_VERSION.to_string()
}

/// One entry of a step's argument template.
///
/// In JSON a literal is a plain string and a placeholder is
/// `{"result_of": <step index>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Arg {
    /// Passed to the contract function unchanged.
    Literal(String),
    /// Replaced by the value produced by the step at this zero-based index.
    ResultOf { result_of: usize },
}

impl Arg {
    /// Creates a literal argument.
    pub fn literal(value: impl Into<String>) -> Self {
        Arg::Literal(value.into())
    }

    /// Creates a placeholder for the result of step `index`.
    pub fn result_of(index: usize) -> Self {
        Arg::ResultOf { result_of: index }
    }
}

impl std::fmt::Display for Arg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arg::Literal(value) => write!(f, "{value}"),
            Arg::ResultOf { result_of } => write!(f, "${result_of}"),
        }
    }
}

/// An immutable unit of work in a scenario.
///
/// Built with [`Step::invoke`] or [`Step::query`] and the chained setters,
/// or deserialized from a scenario file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    kind: OperationKind,
    organization: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    caller: Option<String>,
    #[serde(default = "default_contract_version")]
    contract_version: String,
    function: String,
    #[serde(default)]
    args: Vec<Arg>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
}

impl Step {
    fn new(kind: OperationKind, organization: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            kind,
            organization: organization.into(),
            caller: None,
            contract_version: default_contract_version(),
            function: function.into(),
            args: Vec::new(),
            label: None,
        }
    }

    /// Creates a state-mutating step.
    pub fn invoke(organization: impl Into<String>, function: impl Into<String>) -> Self {
        Self::new(OperationKind::Invoke, organization, function)
    }

    /// Creates a read-only step.
    pub fn query(organization: impl Into<String>, function: impl Into<String>) -> Self {
        Self::new(OperationKind::Query, organization, function)
    }

    /// Sets the user identity the call is made as.
    pub fn caller(mut self, caller: impl Into<String>) -> Self {
        self.caller = Some(caller.into());
        self
    }

    /// Sets the contract version.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.contract_version = version.into();
        self
    }

    /// Appends a literal argument.
    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(Arg::literal(value));
        self
    }

    /// Appends several literal arguments.
    pub fn args<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(values.into_iter().map(Arg::literal));
        self
    }

    /// Appends a placeholder bound to the result of step `index`.
    pub fn arg_from(mut self, index: usize) -> Self {
        self.args.push(Arg::result_of(index));
        self
    }

    /// Sets the label used in reports.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// The user identity; defaults to the organization tag.
    pub fn caller_identity(&self) -> &str {
        self.caller.as_deref().unwrap_or(&self.organization)
    }

    pub fn contract_version(&self) -> &str {
        &self.contract_version
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn template(&self) -> &[Arg] {
        &self.args
    }

    /// The report label; defaults to the function name.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.function)
    }

    /// Renders the argument template with placeholders shown as `$N`.
    pub fn template_strings(&self) -> Vec<String> {
        self.args.iter().map(ToString::to_string).collect()
    }

    /// Builds the ledger call for this step from already bound arguments.
    pub fn to_call(&self, args: Vec<String>) -> LedgerCall {
        LedgerCall::new(
            &self.organization,
            self.caller_identity(),
            &self.contract_version,
            &self.function,
        )
        .with_args(args)
    }
}

/// Outcome of executing one step.
///
/// `error` is present iff the step did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    value: Option<String>,
    error: Option<String>,
}

impl StepResult {
    /// A successful result carrying an optional payload.
    pub fn success(value: Option<String>) -> Self {
        Self { value, error: None }
    }

    /// A failed result.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            value: None,
            error: Some(error.into()),
        }
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
