/*!
 * Timeout Guard
 *
 * Runs a computation under a wall-clock deadline without its cooperation.
 *
 * ## Protocol
 *
 * 1. Claim the process-wide registry slot (reject if occupied, or if the
 *    caller is itself a computation that already missed its deadline)
 * 2. Install the timeout handler and arm the backend, single-shot
 * 3. Start the computation on a supervised worker
 * 4. Wait for whichever comes first: the worker's exit or the expiry
 * 5. Disarm and uninstall, then clear the slot
 * 6. Report: value, `TimeoutCondition`, or the computation's own failure
 *
 * Step 5 runs exactly once on every path before step 6.
 */

use super::config::GuardConfig;
use super::registry::ActiveSlot;
use super::traits::TimerBackend;
use super::worker::{panic_message, Exit, Wake, Worker};
use crate::core::{GuardError, GuardResult, RunError, TimerInfo};
use crate::monitoring::{AtomicGuardStats, GuardSpan, GuardStats};
use crate::security::TimerCapability;
use crate::signals::TimeoutSignalHandler;
use std::convert::Infallible;
use std::fmt::Debug;
use std::panic;
use std::sync::{Arc, OnceLock};
use tracing::{debug, error, warn};

static GLOBAL: OnceLock<TimeoutGuard> = OnceLock::new();

/// Deadline enforcer bound to one timer backend
pub struct TimeoutGuard {
    backend: Arc<dyn TimerBackend>,
    config: GuardConfig,
    stats: AtomicGuardStats,
}

impl TimeoutGuard {
    /// Create a guard with the configured backend
    pub fn new(config: GuardConfig) -> Self {
        let backend = config.backend.build();
        Self::with_backend(config, backend)
    }

    /// Create a guard over an explicit backend
    pub fn with_backend(config: GuardConfig, backend: Arc<dyn TimerBackend>) -> Self {
        Self {
            backend,
            config,
            stats: AtomicGuardStats::new(),
        }
    }

    /// Process-wide guard, configured from the environment on first use
    pub fn global() -> &'static TimeoutGuard {
        GLOBAL.get_or_init(|| Self::new(GuardConfig::from_env()))
    }

    #[inline]
    pub fn backend(&self) -> &dyn TimerBackend {
        self.backend.as_ref()
    }

    #[inline]
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn stats(&self) -> GuardStats {
        self.stats.snapshot()
    }

    /// Run `computation` with at most `max_duration` seconds
    ///
    /// Returns `Ok(Some(v))` on completion, `Ok(None)` on timeout (after a
    /// warning is logged), and `Err(GuardError::AlreadyActive)` if another
    /// guard is running. A panic in `computation` is re-raised on the caller
    /// with its original payload after cleanup.
    pub fn run<T, F>(
        &self,
        capability: &TimerCapability,
        name: impl Into<String>,
        max_duration: f64,
        computation: F,
    ) -> GuardResult<Option<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let fallible = move || Ok::<T, Infallible>(computation());
        match self.enforce(capability, name, max_duration, fallible) {
            Ok(value) => Ok(Some(value)),
            Err(RunError::TimedOut(_)) => Ok(None),
            Err(RunError::Guard(e)) => Err(e),
            Err(RunError::Failed(never)) => match never {},
        }
    }

    /// Like [`run`](Self::run) for computations returning `Result`
    ///
    /// The computation's `Err(e)` comes back as `RunError::Failed(e)`.
    pub fn try_run<T, E, F>(
        &self,
        capability: &TimerCapability,
        name: impl Into<String>,
        max_duration: f64,
        computation: F,
    ) -> Result<Option<T>, RunError<E>>
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Debug + Send + 'static,
    {
        match self.enforce(capability, name, max_duration, computation) {
            Ok(value) => Ok(Some(value)),
            Err(RunError::TimedOut(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Run under a deadline, surfacing a timeout as `RunError::TimedOut`
    pub fn enforce<T, E, F>(
        &self,
        _capability: &TimerCapability,
        name: impl Into<String>,
        max_duration: f64,
        computation: F,
    ) -> Result<T, RunError<E>>
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Debug + Send + 'static,
    {
        let info = TimerInfo::new(name, max_duration)?;
        let slot = ActiveSlot::claim(info).map_err(|e| {
            self.stats.inc_rejected();
            debug!(error = %e, "Guard rejected");
            e
        })?;

        let span = GuardSpan::new(slot.info());
        let _entered = span.enter();

        let (handler, expiry) = TimeoutSignalHandler::bind(slot.info().clone());
        let armed = slot.arm(Arc::clone(&self.backend), handler)?;
        let worker = Worker::spawn(slot.info(), self.config.worker_stack_size, computation)?;
        self.stats.inc_started();

        let wake = worker.wait(&expiry);
        if let Wake::Expired(_) = wake {
            worker.interrupt();
        }

        // Disarm, then clear, before anything is reported
        drop(armed);
        let info = slot.info().clone();
        drop(slot);

        match wake {
            Wake::Exited(Exit::Returned(value)) => {
                worker.join();
                self.stats.inc_completed();
                span.record_outcome("completed");
                Ok(value)
            }
            Wake::Exited(Exit::Failed(e)) => {
                worker.join();
                self.stats.inc_failed();
                span.record_outcome("failed");
                error!(timer = %info, error = ?e, "Guarded computation {} failed", info);
                Err(RunError::Failed(e))
            }
            Wake::Exited(Exit::Panicked(payload)) => {
                worker.join();
                self.stats.inc_failed();
                span.record_outcome("panicked");
                error!(
                    timer = %info,
                    panic = panic_message(&*payload),
                    "Guarded computation {} panicked",
                    info
                );
                panic::resume_unwind(payload)
            }
            Wake::Expired(condition) => {
                worker.abandon();
                self.stats.inc_timed_out();
                span.record_outcome("timed_out");
                warn!(timer = %info, "Timeout: {}", condition.info());
                Err(RunError::TimedOut(condition))
            }
            Wake::Lost => {
                worker.join();
                self.stats.inc_failed();
                span.record_outcome("lost");
                error!(timer = %info, "Guarded computation {} ended without an outcome", info);
                Err(GuardError::WorkerLost(info).into())
            }
        }
    }
}

impl std::fmt::Debug for TimeoutGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeoutGuard")
            .field("backend", &self.backend.name())
            .field("config", &self.config)
            .field("stats", &self.stats.snapshot())
            .finish()
    }
}
