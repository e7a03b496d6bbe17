/*!
 * Timeout Guard Library
 *
 * Preemptive execution-time limits for synchronous computations:
 * - At most one active timer per process, tracked in a registry
 * - Expiry raised as a typed `TimeoutCondition` on the caller
 * - Timer state always cleared before a result is reported
 */

pub mod core;
pub mod monitoring;
pub mod security;
pub mod signals;
pub mod timer;

// Re-exports
pub use crate::core::{GuardError, GuardResult, RunError, TimeoutCondition, TimerInfo};
pub use monitoring::{init_tracing, GuardStats};
pub use security::{Capability, CapabilitySet, SecurityError, TimerCapability};
pub use signals::TimeoutSignalHandler;
#[cfg(unix)]
pub use timer::AlarmTimer;
pub use timer::{
    enforce, interrupted, registry, run, run_optional, try_run, try_run_optional, BackendKind,
    Deadline, GuardConfig, ThreadTimer, TimeoutGuard, TimerBackend,
};
