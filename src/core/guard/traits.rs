/*!
 * Guard Traits
 *
 * Core abstractions for RAII resource guards
 */

use super::GuardMetadata;
use crate::core::errors::GuardResult;

/// Core guard trait
///
/// All guards must implement this to provide:
/// - Resource type identification
/// - Metadata access
/// - Manual release capability
pub trait Guard: Send {
    /// Resource type name for logging/debugging
    fn resource_type(&self) -> &'static str;

    /// Get guard metadata
    fn metadata(&self) -> &GuardMetadata;

    /// Check if guard is still holding its resource
    fn is_active(&self) -> bool;

    /// Release the resource before drop
    ///
    /// Releasing an already released guard is a no-op.
    fn release(&mut self) -> GuardResult<()>;
}

/// Guards that run cleanup on drop
///
/// Separates Drop logic for better testability
pub trait GuardDrop: Guard {
    /// Perform cleanup on drop
    ///
    /// # Panics
    ///
    /// Should NOT panic. Log errors instead.
    fn on_drop(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestGuard {
        metadata: GuardMetadata,
        active: bool,
        releases: u32,
    }

    impl Guard for TestGuard {
        fn resource_type(&self) -> &'static str {
            "test"
        }

        fn metadata(&self) -> &GuardMetadata {
            &self.metadata
        }

        fn is_active(&self) -> bool {
            self.active
        }

        fn release(&mut self) -> GuardResult<()> {
            if self.active {
                self.active = false;
                self.releases += 1;
            }
            Ok(())
        }
    }

    #[test]
    fn test_guard_release_is_idempotent() {
        let mut guard = TestGuard {
            metadata: GuardMetadata::new("test"),
            active: true,
            releases: 0,
        };

        assert!(guard.is_active());
        assert!(guard.release().is_ok());
        assert!(guard.release().is_ok());
        assert!(!guard.is_active());
        assert_eq!(guard.releases, 1);
        assert_eq!(guard.metadata().resource_type, "test");
    }
}
