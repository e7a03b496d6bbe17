/*!
 * Active-Timer Registry
 *
 * Process-wide slot holding the single active `TimerInfo`. Not a stack:
 * claiming an occupied slot is a usage error, never a queued request.
 *
 * Claiming returns an [`ActiveSlot`]; only its holder can arm a timer, and
 * dropping it clears the slot.
 */

use super::armed::ArmedTimer;
use super::traits::TimerBackend;
use super::worker::interrupted;
use crate::core::guard::{Guard, GuardDrop, GuardMetadata};
use crate::core::{GuardError, GuardResult, TimerInfo};
use crate::signals::TimeoutSignalHandler;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

static ACTIVE: Mutex<Option<TimerInfo>> = parking_lot::const_mutex(None);

/// Timer currently holding the slot
pub fn current() -> Option<TimerInfo> {
    ACTIVE.lock().clone()
}

/// Whether any guard is active in this process
pub fn is_active() -> bool {
    ACTIVE.lock().is_some()
}

/// Ownership of the registry slot
pub struct ActiveSlot {
    info: TimerInfo,
    metadata: GuardMetadata,
    held: bool,
}

impl ActiveSlot {
    /// Claim the slot for `info`
    ///
    /// Fails with `GuardError::AlreadyActive` naming both timers if another
    /// guard holds it; the running timer is left untouched. Fails with
    /// `GuardError::AbandonedCaller` when called from a worker whose own
    /// guard already gave up on it.
    pub(crate) fn claim(info: TimerInfo) -> GuardResult<Self> {
        let mut active = ACTIVE.lock();
        // Checked under the lock: the expiring guard raises the flag before
        // it clears the slot
        if interrupted() {
            return Err(GuardError::AbandonedCaller { requested: info });
        }
        if let Some(running) = active.as_ref() {
            return Err(GuardError::AlreadyActive {
                requested: info,
                active: running.clone(),
            });
        }

        *active = Some(info.clone());
        debug!(timer = %info, "Timer slot claimed");

        Ok(Self {
            info,
            metadata: GuardMetadata::new("timer_slot"),
            held: true,
        })
    }

    #[inline]
    pub fn info(&self) -> &TimerInfo {
        &self.info
    }

    /// Install `handler` and arm `backend` for this slot's deadline
    pub(crate) fn arm(
        &self,
        backend: Arc<dyn TimerBackend>,
        handler: Arc<TimeoutSignalHandler>,
    ) -> GuardResult<ArmedTimer> {
        backend.arm(self.info.deadline(), Arc::clone(&handler))?;
        Ok(ArmedTimer::new(backend, handler))
    }
}

impl Guard for ActiveSlot {
    fn resource_type(&self) -> &'static str {
        self.metadata.resource_type
    }

    fn metadata(&self) -> &GuardMetadata {
        &self.metadata
    }

    fn is_active(&self) -> bool {
        self.held
    }

    fn release(&mut self) -> GuardResult<()> {
        if self.held {
            *ACTIVE.lock() = None;
            self.held = false;
            debug!(
                timer = %self.info,
                held_micros = self.metadata.lifetime_micros(),
                "Timer slot cleared"
            );
        }
        Ok(())
    }
}

impl GuardDrop for ActiveSlot {
    fn on_drop(&mut self) {
        let _ = self.release();
    }
}

impl Drop for ActiveSlot {
    fn drop(&mut self) {
        self.on_drop();
    }
}
