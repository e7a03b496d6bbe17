/*!
 * Core Types
 * Timer identity shared by the registry, the signal handler and log output
 */

use super::errors::{GuardError, GuardResult};
use super::limits::MAX_TIMER_SECS;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Identity of one guarded call
///
/// Immutable once constructed. The display form `"<name>:<max_duration>"` is
/// what ends up in log lines, so tests can match on it directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TimerInfo {
    name: String,
    max_duration: f64,
}

impl TimerInfo {
    /// Create a timer identity
    ///
    /// `max_duration` is in seconds, strictly positive and at most
    /// `MAX_TIMER_SECS`.
    pub fn new(name: impl Into<String>, max_duration: f64) -> GuardResult<Self> {
        let name = name.into();
        if !max_duration.is_finite() || max_duration <= 0.0 || max_duration > MAX_TIMER_SECS {
            return Err(GuardError::InvalidDuration { name, max_duration });
        }

        Ok(Self { name, max_duration })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Budget in seconds
    #[inline]
    pub fn max_duration(&self) -> f64 {
        self.max_duration
    }

    /// Budget as a `Duration`
    #[inline]
    pub fn deadline(&self) -> Duration {
        // validated in `new`
        Duration::from_secs_f64(self.max_duration)
    }
}

impl fmt::Display for TimerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.max_duration)
    }
}
