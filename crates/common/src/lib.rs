//! Identifiers shared across the trade saga crates.

pub mod types;

pub use types::RunId;
