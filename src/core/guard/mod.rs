/*!
 * RAII Resource Guards
 *
 * Scoped ownership of the process-wide timer resources.
 *
 * ## Guard Types
 *
 * - **ActiveSlot**: claim on the active-timer registry, cleared on drop
 * - **ArmedTimer**: an armed backend timer plus its installed handler,
 *   disarmed on drop
 *
 * Both are created only by the timeout guard; dropping them in order
 * (timer first, then slot) is the cleanup that runs on every exit path.
 */

mod traits;

pub use traits::{Guard, GuardDrop};

/// Guard metadata for observability
#[derive(Debug, Clone)]
pub struct GuardMetadata {
    pub resource_type: &'static str,
    pub creation_time: std::time::Instant,
}

impl GuardMetadata {
    #[inline]
    pub fn new(resource_type: &'static str) -> Self {
        Self {
            resource_type,
            creation_time: std::time::Instant::now(),
        }
    }

    #[inline]
    pub fn lifetime_micros(&self) -> u64 {
        self.creation_time.elapsed().as_micros() as u64
    }
}
