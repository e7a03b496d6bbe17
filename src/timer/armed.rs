/*!
 * Armed Timer Guard
 *
 * Ties an armed backend timer to its installed handler so both are torn
 * down together. Nothing can fire into the guard once this is released.
 */

use super::traits::TimerBackend;
use crate::core::guard::{Guard, GuardDrop, GuardMetadata};
use crate::core::GuardResult;
use crate::signals::TimeoutSignalHandler;
use std::sync::Arc;
use tracing::error;

pub struct ArmedTimer {
    backend: Arc<dyn TimerBackend>,
    handler: Arc<TimeoutSignalHandler>,
    metadata: GuardMetadata,
    armed: bool,
}

impl ArmedTimer {
    pub(crate) fn new(backend: Arc<dyn TimerBackend>, handler: Arc<TimeoutSignalHandler>) -> Self {
        Self {
            backend,
            handler,
            metadata: GuardMetadata::new("armed_timer"),
            armed: true,
        }
    }

    #[inline]
    pub fn handler(&self) -> &TimeoutSignalHandler {
        &self.handler
    }
}

impl Guard for ArmedTimer {
    fn resource_type(&self) -> &'static str {
        self.metadata.resource_type
    }

    fn metadata(&self) -> &GuardMetadata {
        &self.metadata
    }

    fn is_active(&self) -> bool {
        self.armed
    }

    /// Uninstall the handler, then disarm the backend
    fn release(&mut self) -> GuardResult<()> {
        if !self.armed {
            return Ok(());
        }
        self.armed = false;
        self.handler.uninstall();
        self.backend.disarm()
    }
}

impl GuardDrop for ArmedTimer {
    fn on_drop(&mut self) {
        if let Err(e) = self.release() {
            error!(
                timer = %self.handler.info(),
                backend = self.backend.name(),
                error = %e,
                "Failed to disarm timer"
            );
        }
    }
}

impl Drop for ArmedTimer {
    fn drop(&mut self) {
        self.on_drop();
    }
}
