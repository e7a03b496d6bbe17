/*!
 * Portable Timer Backend
 *
 * Software timer: a dedicated thread waits on a cancel channel and delivers
 * to the handler if the wait times out. Works on every platform and does
 * not touch process signal state, at the cost of one short-lived thread per
 * armed timer.
 */

use super::traits::TimerBackend;
use crate::core::limits::TIMER_THREAD;
use crate::core::{GuardError, GuardResult};
use crate::signals::TimeoutSignalHandler;
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::debug;

struct PendingTimer {
    cancel: flume::Sender<()>,
    handler: Arc<TimeoutSignalHandler>,
    thread: JoinHandle<()>,
}

/// Timer thread backend
pub struct ThreadTimer {
    slot: Mutex<Option<PendingTimer>>,
}

impl ThreadTimer {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }
}

impl Default for ThreadTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerBackend for ThreadTimer {
    fn name(&self) -> &'static str {
        "thread"
    }

    fn arm(&self, duration: Duration, handler: Arc<TimeoutSignalHandler>) -> GuardResult<()> {
        let mut slot = self.slot.lock();
        if slot.is_some() {
            return Err(GuardError::BackendBusy(self.name().to_string()));
        }

        let (cancel, cancelled) = flume::bounded::<()>(1);
        let expiring = Arc::clone(&handler);
        let thread = thread::Builder::new()
            .name(TIMER_THREAD.to_string())
            .spawn(move || {
                // Disconnected means disarmed
                if let Err(flume::RecvTimeoutError::Timeout) = cancelled.recv_timeout(duration) {
                    expiring.deliver();
                }
            })
            .map_err(|e| GuardError::Backend(format!("failed to start timer thread: {}", e)))?;

        debug!(timer = %handler.info(), ?duration, "Thread timer armed");
        *slot = Some(PendingTimer {
            cancel,
            handler,
            thread,
        });
        Ok(())
    }

    fn disarm(&self) -> GuardResult<()> {
        let Some(pending) = self.slot.lock().take() else {
            return Ok(());
        };

        // Uninstall first so a wait that is timing out right now raises nothing
        pending.handler.uninstall();
        drop(pending.cancel);

        debug!(timer = %pending.handler.info(), "Thread timer disarmed");
        pending
            .thread
            .join()
            .map_err(|_| GuardError::Backend("timer thread panicked".to_string()))
    }

    fn is_armed(&self) -> bool {
        self.slot.lock().is_some()
    }
}

impl Drop for ThreadTimer {
    fn drop(&mut self) {
        let _ = self.disarm();
    }
}
