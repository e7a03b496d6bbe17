/*!
 * Lock-Free Guard Statistics
 * Uses atomic counters for zero-contention stats tracking
 */

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of guard activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GuardStats {
    /// Guarded calls that armed a timer
    pub started: u64,
    /// Computations that returned before the deadline
    pub completed: u64,
    /// Computations abandoned at the deadline
    pub timed_out: u64,
    /// Computations that failed or panicked
    pub failed: u64,
    /// Calls refused because another guard was active
    pub rejected: u64,
}

/// Atomic guard statistics
///
/// # Performance
/// - Cache-line aligned to prevent false sharing
/// - All operations use relaxed ordering
#[repr(C, align(64))]
#[derive(Debug, Default)]
pub struct AtomicGuardStats {
    started: AtomicU64,
    completed: AtomicU64,
    timed_out: AtomicU64,
    failed: AtomicU64,
    rejected: AtomicU64,
}

impl AtomicGuardStats {
    #[inline]
    pub const fn new() -> Self {
        Self {
            started: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            timed_out: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    #[inline(always)]
    pub fn inc_started(&self) {
        self.started.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_timed_out(&self) {
        self.timed_out.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of current stats
    ///
    /// Counters are read independently, so a snapshot taken mid-call may be
    /// off by one between fields.
    pub fn snapshot(&self) -> GuardStats {
        GuardStats {
            started: self.started.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}
