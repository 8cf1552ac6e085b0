//! Process-level trigger sites for teardown.
//!
//! Each hook is an explicit registration against one shared
//! [`TeardownCoordinator`]:
//! - [`install_panic_hook`]: uncaught panics on any thread
//! - [`spawn_supervised`]: tasks whose error or panic nobody else handles
//! - [`TeardownGuard`]: the process exit path, including early returns
//!
//! Because the coordinator is idempotent these may fire in any combination.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::teardown::{TeardownCoordinator, TeardownTrigger};

/// Chains a panic hook that requests teardown before the previous hook runs.
pub fn install_panic_hook(coordinator: Arc<TeardownCoordinator>) {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!(panic = %info, "uncaught panic");
        coordinator.request_teardown(TeardownTrigger::UncaughtPanic);
        previous(info);
    }));
}

/// Spawns `future` and requests teardown if it fails or panics.
///
/// The returned handle resolves to `Some(value)` on success and `None` when
/// the task failed; the failure has already been logged by then.
pub fn spawn_supervised<F, T, E>(
    coordinator: Arc<TeardownCoordinator>,
    task: &'static str,
    future: F,
) -> JoinHandle<Option<T>>
where
    F: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Display + Send + 'static,
{
    let inner = tokio::spawn(future);
    tokio::spawn(async move {
        match inner.await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(error)) => {
                tracing::error!(task, %error, "supervised task failed");
                coordinator.request_teardown(TeardownTrigger::UnhandledTaskFailure);
                None
            }
            Err(join_error) => {
                tracing::error!(task, error = %join_error, "supervised task did not finish");
                coordinator.request_teardown(TeardownTrigger::UnhandledTaskFailure);
                None
            }
        }
    })
}

/// Requests teardown when dropped.
///
/// Hold one for the lifetime of `main`. `std::process::exit` skips
/// destructors, so call [`finish`](Self::finish) before exiting explicitly.
#[must_use = "teardown runs when the guard is dropped"]
pub struct TeardownGuard {
    coordinator: Arc<TeardownCoordinator>,
}

impl TeardownGuard {
    pub fn new(coordinator: Arc<TeardownCoordinator>) -> Self {
        Self { coordinator }
    }

    pub fn coordinator(&self) -> &Arc<TeardownCoordinator> {
        &self.coordinator
    }

    /// Requests teardown now. Returns true if this call performed it.
    pub fn finish(self) -> bool {
        self.coordinator
            .request_teardown(TeardownTrigger::ProcessExit)
    }
}

impl Drop for TeardownGuard {
    fn drop(&mut self) {
        self.coordinator
            .request_teardown(TeardownTrigger::ProcessExit);
    }
}
