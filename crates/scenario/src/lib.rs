//! Scenario definitions for the five-organization trade workflow.
//!
//! A scenario is data: a named, ordered list of [`saga::Step`]s. This crate
//! provides:
//! - Organization and caller identifiers used by the trade network
//! - Built-in trade scenarios, parameterized by trade id and contract version
//! - Loading and validation of scenarios from JSON files

pub mod error;
pub mod orgs;
pub mod scenario;
pub mod trade;

pub use error::{Result, ScenarioError};
pub use scenario::Scenario;
pub use trade::{BUILTIN_SCENARIOS, TradeParams, builtin};
