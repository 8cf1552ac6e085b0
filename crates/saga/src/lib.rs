//! Sequential saga executor for multi-party ledger workflows.
//!
//! A scenario is an ordered list of [`Step`]s, each an invoke or query
//! against one contract function under one organization's identity. The
//! [`SagaExecutor`] runs them strictly in order:
//! 1. Bind the step's argument template against earlier results
//! 2. Dispatch the call and wait for it to resolve
//! 3. Record the result, or abort the run on the first failure
//!
//! Completed steps are never undone. Whatever path ends the run, the
//! [`TeardownCoordinator`] releases the process-wide listeners exactly once.

pub mod binding;
pub mod error;
pub mod events;
pub mod executor;
pub mod lifecycle;
pub mod run;
pub mod state;
pub mod step;
pub mod teardown;

pub use common::RunId;
pub use error::{BindingError, SagaError};
pub use events::SagaEvent;
pub use executor::SagaExecutor;
pub use ledger::OperationKind as StepKind;
pub use lifecycle::{TeardownGuard, install_panic_hook, spawn_supervised};
pub use run::{FailureCause, SagaRun, StepFailure};
pub use state::RunStatus;
pub use step::{Arg, DEFAULT_CONTRACT_VERSION, Step, StepResult};
pub use teardown::{TeardownCoordinator, TeardownTrigger};
