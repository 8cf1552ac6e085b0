//! Runner configuration loaded from environment variables.

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// Errors raised while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigError::InvalidValue {
                var: "LOG_FORMAT",
                value: s.to_string(),
            }),
        }
    }
}

/// Runner configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `SCENARIO`: built-in scenario name or path to a JSON file (default: `"trade-workflow"`)
/// - `TRADE_ID`: trade id for built-in scenarios (default: `"9gsdns3"`)
/// - `CONTRACT_VERSION`: contract version for built-in scenarios (default: `"v1"`)
/// - `NETWORK_CONFIG`: network topology descriptor (default: `"./config_upgrade.json"`)
/// - `ENDORSEMENT_POLICY`: endorsement policy id (default: `"ALL_FIVE_ORG_MEMBERS"`)
/// - `FAIL_AT`: contract function the dry-run ledger should reject (default: unset)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `text` or `json` (default: `text`)
/// - `METRICS_DUMP`: print the Prometheus exposition at exit (default: `false`)
#[derive(Debug, Clone)]
pub struct Config {
    pub scenario: String,
    pub trade_id: String,
    pub contract_version: String,
    pub network_config: PathBuf,
    pub endorsement_policy: String,
    pub fail_at: Option<String>,
    pub log_level: String,
    pub log_format: LogFormat,
    pub metrics_dump: bool,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let log_format = match lookup("LOG_FORMAT") {
            Some(value) => value.parse()?,
            None => defaults.log_format,
        };
        let metrics_dump = match lookup("METRICS_DUMP") {
            Some(value) => parse_flag("METRICS_DUMP", &value)?,
            None => defaults.metrics_dump,
        };

        Ok(Self {
            scenario: lookup("SCENARIO").unwrap_or(defaults.scenario),
            trade_id: lookup("TRADE_ID").unwrap_or(defaults.trade_id),
            contract_version: lookup("CONTRACT_VERSION").unwrap_or(defaults.contract_version),
            network_config: lookup("NETWORK_CONFIG")
                .map(PathBuf::from)
                .unwrap_or(defaults.network_config),
            endorsement_policy: lookup("ENDORSEMENT_POLICY")
                .unwrap_or(defaults.endorsement_policy),
            fail_at: lookup("FAIL_AT").filter(|f| !f.is_empty()),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format,
            metrics_dump,
        })
    }
}

fn parse_flag(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: value.to_string(),
        }),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scenario: "trade-workflow".to_string(),
            trade_id: "9gsdns3".to_string(),
            contract_version: saga::DEFAULT_CONTRACT_VERSION.to_string(),
            network_config: PathBuf::from("./config_upgrade.json"),
            endorsement_policy: "ALL_FIVE_ORG_MEMBERS".to_string(),
            fail_at: None,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            metrics_dump: false,
        }
    }
}
