/*!
 * Timeout Enforcement
 *
 * Preemptive deadlines for synchronous computations:
 * - Backends: SIGALRM interval timer (unix) or portable timer thread
 * - Registry: the single active timer per process
 * - Guard: arm/disarm protocol and exit classification
 * - Optional: run with or without a deadline through one call
 *
 * The free functions delegate to [`TimeoutGuard::global`].
 */

#[cfg(unix)]
mod alarm;
mod armed;
mod config;
mod guard;
mod optional;
pub mod registry;
mod thread;
mod traits;
mod worker;

#[cfg(unix)]
pub use alarm::AlarmTimer;
pub use armed::ArmedTimer;
pub use config::{BackendKind, GuardConfig};
pub use guard::TimeoutGuard;
pub use optional::Deadline;
pub use registry::ActiveSlot;
pub use thread::ThreadTimer;
pub use traits::TimerBackend;
pub use worker::interrupted;

use crate::core::{GuardResult, RunError};
use crate::security::TimerCapability;
use std::fmt::Debug;

/// Run `computation` under a deadline of `max_duration` seconds
///
/// See [`TimeoutGuard::run`].
pub fn run<T, F>(
    capability: &TimerCapability,
    name: impl Into<String>,
    max_duration: f64,
    computation: F,
) -> GuardResult<Option<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    TimeoutGuard::global().run(capability, name, max_duration, computation)
}

/// See [`TimeoutGuard::try_run`]
pub fn try_run<T, E, F>(
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
    TimeoutGuard::global().try_run(capability, name, max_duration, computation)
}

/// See [`TimeoutGuard::enforce`]
pub fn enforce<T, E, F>(
    capability: &TimerCapability,
    name: impl Into<String>,
    max_duration: f64,
    computation: F,
) -> Result<T, RunError<E>>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Debug + Send + 'static,
{
    TimeoutGuard::global().enforce(capability, name, max_duration, computation)
}

/// See [`TimeoutGuard::run_optional`]
pub fn run_optional<T, F>(deadline: Option<&Deadline>, computation: F) -> GuardResult<Option<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    TimeoutGuard::global().run_optional(deadline, computation)
}

/// See [`TimeoutGuard::try_run_optional`]
pub fn try_run_optional<T, E, F>(
    deadline: Option<&Deadline>,
    computation: F,
) -> Result<Option<T>, RunError<E>>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Debug + Send + 'static,
{
    TimeoutGuard::global().try_run_optional(deadline, computation)
}
