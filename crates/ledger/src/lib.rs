//! Ledger-facing collaborators for the trade saga.
//!
//! The ledger itself is an external system. This crate only defines the
//! boundary the saga executor talks to:
//! - [`LedgerClient`] for invoke (state-mutating) and query (read-only) calls
//! - [`ListenerRegistry`] for commit listeners created as a side effect of invokes
//!
//! In-memory implementations are provided for tests and dry runs. They record
//! calls and serve canned responses; they do not implement contract semantics.

pub mod client;
pub mod error;
pub mod listener;
pub mod memory;

pub use client::{InvokeReceipt, LedgerCall, LedgerClient, OperationKind};
pub use error::{LedgerError, ListenerError, Result};
pub use listener::{InMemoryListenerRegistry, Listener, ListenerId, ListenerRegistry};
pub use memory::{InMemoryLedger, RecordedCall};
