/*!
 * Guard Configuration
 *
 * Backend selection and worker tuning, with presets and environment
 * overrides.
 */

use super::thread::ThreadTimer;
use super::traits::TimerBackend;
use crate::core::limits::{ENV_TIMER_BACKEND, ENV_WORKER_STACK_SIZE};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

#[cfg(unix)]
use super::alarm::AlarmTimer;

/// Which timer delivers the deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// `setitimer(ITIMER_REAL)` + SIGALRM (unix only)
    Alarm,
    /// Portable timer thread
    Thread,
}

impl BackendKind {
    /// Alarm on unix, thread elsewhere
    pub const fn platform_default() -> Self {
        if cfg!(unix) {
            Self::Alarm
        } else {
            Self::Thread
        }
    }

    /// Instantiate the backend
    pub fn build(self) -> Arc<dyn TimerBackend> {
        match self {
            #[cfg(unix)]
            Self::Alarm => Arc::new(AlarmTimer::new()),
            #[cfg(not(unix))]
            Self::Alarm => {
                warn!("SIGALRM backend unavailable on this platform, using timer thread");
                Arc::new(ThreadTimer::new())
            }
            Self::Thread => Arc::new(ThreadTimer::new()),
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alarm" | "signal" | "sigalrm" => Ok(Self::Alarm),
            "thread" => Ok(Self::Thread),
            other => Err(format!("unknown timer backend: {}", other)),
        }
    }
}

/// Configuration of a `TimeoutGuard`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GuardConfig {
    /// Timer backend
    pub backend: BackendKind,

    /// Stack size for worker threads (None = std default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_stack_size: Option<usize>,
}

impl GuardConfig {
    /// Platform default configuration
    pub fn new() -> Self {
        Self {
            backend: BackendKind::platform_default(),
            worker_stack_size: None,
        }
    }

    /// Configuration that leaves process signal state alone
    pub fn portable() -> Self {
        Self {
            backend: BackendKind::Thread,
            worker_stack_size: None,
        }
    }

    /// Defaults overridden by `GUARD_TIMER_BACKEND` and `GUARD_WORKER_STACK_SIZE`
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::new();

        if let Ok(raw) = std::env::var(ENV_TIMER_BACKEND) {
            match raw.parse() {
                Ok(kind) => config.backend = kind,
                Err(e) => warn!(var = ENV_TIMER_BACKEND, error = %e, "Ignoring timer backend override"),
            }
        }

        if let Ok(raw) = std::env::var(ENV_WORKER_STACK_SIZE) {
            match raw.trim().parse::<usize>() {
                Ok(size) if size > 0 => config.worker_stack_size = Some(size),
                _ => warn!(var = ENV_WORKER_STACK_SIZE, value = %raw, "Ignoring worker stack size override"),
            }
        }

        config
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_worker_stack_size(mut self, size: usize) -> Self {
        self.worker_stack_size = Some(size);
        self
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self::new()
    }
}
