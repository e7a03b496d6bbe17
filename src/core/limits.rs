/*!
 * System Limits and Constants
 *
 * Centralized location for guard-wide limits, thread names and tunables.
 */

use std::time::Duration;

// =============================================================================
// TIMER BACKENDS
// =============================================================================

/// How early an alarm wake-up may be observed relative to the armed deadline
/// before it is treated as stale.
/// ITIMER_REAL follows the realtime clock while deadlines are tracked on the
/// monotonic clock, so a little skew is tolerated.
pub const ALARM_EARLY_TOLERANCE: Duration = Duration::from_millis(2);

/// Largest accepted timer budget in seconds
/// Fits a 32-bit `time_t` and keeps `Instant + budget` from overflowing.
pub const MAX_TIMER_SECS: f64 = i32::MAX as f64;

/// Smallest interval handed to setitimer
/// A zero `it_value` would disarm instead of arm.
pub const ALARM_MIN_INTERVAL: Duration = Duration::from_micros(1);

/// Bytes drained from the self-pipe per watcher wake-up
pub const ALARM_WAKE_BUFFER: usize = 64;

/// Thread name of the SIGALRM watcher
pub const ALARM_WATCHER_THREAD: &str = "guard-alarm";

/// Thread name of the portable timer thread
pub const TIMER_THREAD: &str = "guard-timer";

// =============================================================================
// WORKERS
// =============================================================================

/// Prefix of supervised worker thread names, followed by the timer name
pub const WORKER_THREAD_PREFIX: &str = "guard:";

/// Environment variable selecting the timer backend (`alarm` | `thread`)
pub const ENV_TIMER_BACKEND: &str = "GUARD_TIMER_BACKEND";

/// Environment variable overriding the worker stack size in bytes
pub const ENV_WORKER_STACK_SIZE: &str = "GUARD_WORKER_STACK_SIZE";

// =============================================================================
// OPTIONAL DEADLINES
// =============================================================================

/// Timer name used when a deadline is requested without a label
pub const DEFAULT_DEADLINE_NAME: &str = "deadline";
