/*!
 * Optional Deadlines
 *
 * Lets call sites request "maybe bounded, maybe not" execution without
 * branching on whether a deadline applies.
 */

use super::guard::TimeoutGuard;
use crate::core::limits::DEFAULT_DEADLINE_NAME;
use crate::core::{GuardResult, RunError};
use crate::security::TimerCapability;
use std::fmt::Debug;

/// A duration paired with the capability to enforce it
#[derive(Debug, Clone)]
pub struct Deadline {
    name: String,
    max_duration: f64,
    capability: TimerCapability,
}

impl Deadline {
    /// Deadline of `max_duration` seconds under the default name
    pub fn new(capability: TimerCapability, max_duration: f64) -> Self {
        Self {
            name: DEFAULT_DEADLINE_NAME.to_string(),
            max_duration,
            capability,
        }
    }

    /// Label the timer in logs and errors
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn max_duration(&self) -> f64 {
        self.max_duration
    }
}

impl TimeoutGuard {
    /// Run under `deadline` if there is one, otherwise run directly
    ///
    /// Without a deadline the computation runs on the caller's thread, no
    /// timer is armed, the registry is not consulted, and the result is
    /// always `Some`.
    pub fn run_optional<T, F>(&self, deadline: Option<&Deadline>, computation: F) -> GuardResult<Option<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        match deadline {
            None => Ok(Some(computation())),
            Some(d) => self.run(&d.capability, d.name.clone(), d.max_duration, computation),
        }
    }

    /// Fallible variant of [`run_optional`](Self::run_optional)
    pub fn try_run_optional<T, E, F>(
        &self,
        deadline: Option<&Deadline>,
        computation: F,
    ) -> Result<Option<T>, RunError<E>>
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Debug + Send + 'static,
    {
        match deadline {
            None => computation().map(Some).map_err(RunError::Failed),
            Some(d) => self.try_run(&d.capability, d.name.clone(), d.max_duration, computation),
        }
    }
}
