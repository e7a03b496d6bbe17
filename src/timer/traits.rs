/*!
 * Timer Backend Traits
 */

use crate::core::GuardResult;
use crate::signals::TimeoutSignalHandler;
use std::sync::Arc;
use std::time::Duration;

/// Single-shot interval timer with asynchronous expiry delivery
///
/// A backend holds one timer slot. Arming an armed backend fails with
/// `GuardError::BackendBusy`; `disarm` is idempotent and also uninstalls the
/// handler, so nothing fires after it returns.
#[cfg_attr(test, mockall::automock)]
pub trait TimerBackend: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &'static str;

    /// Arm the timer to deliver to `handler` once after `duration`
    fn arm(&self, duration: Duration, handler: Arc<TimeoutSignalHandler>) -> GuardResult<()>;

    /// Cancel the pending expiry, if any
    fn disarm(&self) -> GuardResult<()>;

    /// Whether a timer is currently armed
    fn is_armed(&self) -> bool;
}
