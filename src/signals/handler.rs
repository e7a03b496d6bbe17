/*!
 * Timeout Signal Handler
 *
 * Turns an asynchronous timer expiry into a `TimeoutCondition` the waiting
 * guard can receive synchronously.
 *
 * The handler is latched one-shot: the first delivery raises the condition
 * and spends the handler. Anything delivered afterwards (a re-fire while the
 * guard is cleaning up, a stale signal after disarm) is discarded.
 */

use crate::core::{TimeoutCondition, TimerInfo};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::trace;

/// Handler bound to one guarded call
pub struct TimeoutSignalHandler {
    info: TimerInfo,
    raise: Mutex<Option<flume::Sender<TimeoutCondition>>>,
}

impl TimeoutSignalHandler {
    /// Bind a fresh handler to `info`
    ///
    /// The receiver yields at most one condition.
    pub(crate) fn bind(info: TimerInfo) -> (Arc<Self>, flume::Receiver<TimeoutCondition>) {
        let (tx, rx) = flume::bounded(1);
        let handler = Arc::new(Self {
            info,
            raise: Mutex::new(Some(tx)),
        });
        (handler, rx)
    }

    /// Timer this handler is bound to
    #[inline]
    pub fn info(&self) -> &TimerInfo {
        &self.info
    }

    /// Deliver an expiry
    ///
    /// Returns `true` if this call raised the condition, `false` if the
    /// handler was already spent or uninstalled.
    pub fn deliver(&self) -> bool {
        let Some(tx) = self.raise.lock().take() else {
            trace!(timer = %self.info, "Discarding expiry for spent handler");
            return false;
        };

        tx.try_send(TimeoutCondition::raise(self.info.clone())).is_ok()
    }

    /// Uninstall without raising
    ///
    /// Returns `true` if the handler had not fired yet.
    pub(crate) fn uninstall(&self) -> bool {
        self.raise.lock().take().is_some()
    }

    /// Whether the handler can still raise
    #[inline]
    pub fn is_installed(&self) -> bool {
        self.raise.lock().is_some()
    }
}

impl std::fmt::Debug for TimeoutSignalHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeoutSignalHandler")
            .field("info", &self.info)
            .field("installed", &self.is_installed())
            .finish()
    }
}
