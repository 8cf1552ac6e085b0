//! Run-once release of process-wide listeners.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, OnceLock, PoisonError};
use std::thread::{self, ThreadId};

use ledger::{ListenerError, ListenerRegistry};
use serde::{Deserialize, Serialize};

/// Where a teardown request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeardownTrigger {
    /// The executor stopped at a failed step.
    Aborted,
    /// The executor finished every step.
    Completed,
    /// A panic reached the process panic hook.
    UncaughtPanic,
    /// A supervised task returned an error or panicked without anyone handling it.
    UnhandledTaskFailure,
    /// The process is exiting (normal exit path or a shutdown signal).
    ProcessExit,
}

impl TeardownTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeardownTrigger::Aborted => "aborted",
            TeardownTrigger::Completed => "completed",
            TeardownTrigger::UncaughtPanic => "uncaught_panic",
            TeardownTrigger::UnhandledTaskFailure => "unhandled_task_failure",
            TeardownTrigger::ProcessExit => "process_exit",
        }
    }
}

impl std::fmt::Display for TeardownTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Guarantees that [`ListenerRegistry::release_all`] runs at most once.
///
/// Any number of trigger sites may call [`request_teardown`](Self::request_teardown),
/// from any thread and in any order. The first caller wins a compare-and-set on
/// the cleanup token and performs the release. A caller on another thread that
/// loses blocks until the release has finished, so an exit path never outruns
/// it. The winning thread re-entering (a panic during release reaching the
/// panic hook) returns at once. A failed release is logged and recorded but
/// never retried.
pub struct TeardownCoordinator {
    registry: Arc<dyn ListenerRegistry>,
    done: AtomicBool,
    fired_by: OnceLock<TeardownTrigger>,
    winner: OnceLock<ThreadId>,
    outcome: OnceLock<Result<usize, ListenerError>>,
    finished: Mutex<bool>,
    released: Condvar,
}

impl TeardownCoordinator {
    /// Creates a coordinator that will release `registry`.
    pub fn new(registry: Arc<dyn ListenerRegistry>) -> Self {
        Self {
            registry,
            done: AtomicBool::new(false),
            fired_by: OnceLock::new(),
            winner: OnceLock::new(),
            outcome: OnceLock::new(),
            finished: Mutex::new(false),
            released: Condvar::new(),
        }
    }

    /// Requests teardown. Returns true if this call performed the release.
    ///
    /// Returns only after the release has finished, unless called from the
    /// thread that is performing it.
    pub fn request_teardown(&self, trigger: TeardownTrigger) -> bool {
        if self
            .done
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            if self.winner.get() == Some(&thread::current().id()) {
                tracing::debug!(%trigger, "teardown re-entered on releasing thread, ignoring");
            } else {
                tracing::debug!(%trigger, "teardown already requested, waiting for release");
                self.wait_released();
            }
            return false;
        }

        let _ = self.winner.set(thread::current().id());
        let _ = self.fired_by.set(trigger);
        // Wakes waiters even if the release unwinds.
        let _finish = FinishOnDrop(self);
        metrics::counter!("saga_teardown_total", "trigger" => trigger.as_str()).increment(1);

        let outcome = self.registry.release_all();
        match &outcome {
            Ok(released) => {
                tracing::info!(%trigger, released, "listeners released");
            }
            Err(e) => {
                tracing::error!(%trigger, error = %e, "teardown failed");
            }
        }
        let _ = self.outcome.set(outcome);

        true
    }

    /// Returns true once any trigger has claimed the teardown.
    pub fn has_run(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    /// The trigger whose request performed the teardown.
    pub fn fired_by(&self) -> Option<TeardownTrigger> {
        self.fired_by.get().copied()
    }

    /// Result of the release, once it has finished.
    pub fn outcome(&self) -> Option<&Result<usize, ListenerError>> {
        self.outcome.get()
    }

    fn lock_finished(&self) -> MutexGuard<'_, bool> {
        self.finished.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait_released(&self) {
        let mut finished = self.lock_finished();
        while !*finished {
            finished = self
                .released
                .wait(finished)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

struct FinishOnDrop<'a>(&'a TeardownCoordinator);

impl Drop for FinishOnDrop<'_> {
    fn drop(&mut self) {
        *self.0.lock_finished() = true;
        self.0.released.notify_all();
    }
}

impl std::fmt::Debug for TeardownCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeardownCoordinator")
            .field("done", &self.has_run())
            .field("fired_by", &self.fired_by())
            .finish()
    }
}
