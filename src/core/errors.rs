/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use super::types::TimerInfo;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Guard operation result
///
/// # Must Use
/// A rejected or failed guard start means the computation never ran
#[must_use = "guard operations can fail and must be handled"]
pub type GuardResult<T> = Result<T, GuardError>;

/// Errors raised by the guard machinery itself
///
/// None of these originate from the guarded computation. `AlreadyActive` is a
/// programming error (overlapping or nested guards) and is never retried.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum GuardError {
    #[error("Cannot start timer {requested}: timer {active} is already running")]
    #[diagnostic(
        code(guard::already_active),
        help("Only one timeout guard may be active per process. Do not nest or overlap guarded calls.")
    )]
    AlreadyActive {
        requested: TimerInfo,
        active: TimerInfo,
    },

    #[error("Cannot start timer {requested}: the calling computation already missed its deadline")]
    #[diagnostic(
        code(guard::abandoned_caller),
        help("A computation that outlived its guard may not start new guarded calls. Poll `interrupted()` and return.")
    )]
    AbandonedCaller { requested: TimerInfo },

    #[error("Invalid duration for timer {name}: {max_duration}")]
    #[diagnostic(
        code(guard::invalid_duration),
        help("The duration is in seconds and must be finite and greater than zero.")
    )]
    InvalidDuration { name: String, max_duration: f64 },

    #[error("Timer backend {0} already has an armed timer")]
    #[diagnostic(
        code(guard::backend_busy),
        help("A backend holds a single timer slot. Disarm it before arming again.")
    )]
    BackendBusy(String),

    #[error("Timer backend failure: {0}")]
    #[diagnostic(
        code(guard::backend),
        help("The OS refused to arm or disarm the interval timer. Check signal dispositions.")
    )]
    Backend(String),

    #[error("Failed to spawn worker for timer {timer}: {reason}")]
    #[diagnostic(
        code(guard::worker_spawn),
        help("The system may be out of threads or memory.")
    )]
    WorkerSpawn { timer: TimerInfo, reason: String },

    #[error("Worker for timer {0} exited without reporting an outcome")]
    #[diagnostic(code(guard::worker_lost))]
    WorkerLost(TimerInfo),
}

impl GuardError {
    /// Whether this is a nested or overlapping guard
    #[inline]
    pub fn is_usage_error(&self) -> bool {
        matches!(self, Self::AlreadyActive { .. } | Self::AbandonedCaller { .. })
    }
}

/// Deadline exceeded
///
/// Carries the timer that was active when the deadline fired. Only the
/// timeout signal handler constructs one, so a value of this type always
/// means a real expiry.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Timer {info} expired")]
pub struct TimeoutCondition {
    info: TimerInfo,
}

impl TimeoutCondition {
    pub(crate) fn raise(info: TimerInfo) -> Self {
        Self { info }
    }

    #[inline]
    pub fn info(&self) -> &TimerInfo {
        &self.info
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.info.name()
    }

    #[inline]
    pub fn max_duration(&self) -> f64 {
        self.info.max_duration()
    }
}

/// Outcome of a guarded fallible computation that did not produce a value
#[derive(Debug, Error)]
pub enum RunError<E> {
    /// The guard refused to start or its machinery failed
    #[error(transparent)]
    Guard(#[from] GuardError),

    /// The deadline fired first
    #[error(transparent)]
    TimedOut(#[from] TimeoutCondition),

    /// The computation returned this error itself
    #[error("Guarded computation failed: {0}")]
    Failed(#[source] E),
}

impl<E> RunError<E> {
    #[inline]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut(_))
    }

    #[inline]
    pub fn is_usage_error(&self) -> bool {
        matches!(self, Self::Guard(e) if e.is_usage_error())
    }

    /// The computation's own error, if that is what this is
    #[inline]
    pub fn into_failure(self) -> Option<E> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_already_active_names_both_timers() {
        let err = GuardError::AlreadyActive {
            requested: TimerInfo::new("inner", 0.5).unwrap(),
            active: TimerInfo::new("outer", 2.0).unwrap(),
        };

        assert!(err.is_usage_error());
        assert_eq!(
            err.to_string(),
            "Cannot start timer inner:0.5: timer outer:2 is already running"
        );
    }

    #[test]
    fn test_abandoned_caller_is_usage_error() {
        let err = GuardError::AbandonedCaller {
            requested: TimerInfo::new("zombie", 5.0).unwrap(),
        };

        assert!(err.is_usage_error());
        assert_eq!(
            err.to_string(),
            "Cannot start timer zombie:5: the calling computation already missed its deadline"
        );
    }

    #[test]
    fn test_guard_error_serializes_tagged() {
        let err = GuardError::Backend("setitimer: EINVAL".to_string());
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["error_type"], "backend");
        assert_eq!(json["details"], "setitimer: EINVAL");
    }

    #[test]
    fn test_run_error_classification() {
        let timed_out: RunError<std::io::Error> =
            TimeoutCondition::raise(TimerInfo::new("t", 1.0).unwrap()).into();
        assert!(timed_out.is_timeout());
        assert!(!timed_out.is_usage_error());

        let failed: RunError<&str> = RunError::Failed("x");
        assert_eq!(failed.into_failure(), Some("x"));
    }
}
