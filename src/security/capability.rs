/*!
 * Capability Checking
 *
 * Minting of the timer token that every guarded call must present.
 */

use crate::security::types::{Capability, CapabilitySet, SecurityError, SecurityResult};
use tracing::debug;

/// Proof that the holder may arm the process timer and start a worker
///
/// Only [`CapabilitySet::timer_capability`] creates one, so holding a token
/// means the check already passed.
#[derive(Debug, Clone)]
pub struct TimerCapability {
    _sealed: (),
}

/// Capabilities required to mint a [`TimerCapability`]
pub const TIMER_REQUIREMENTS: [Capability; 2] = [Capability::TimeAccess, Capability::SpawnThread];

impl CapabilitySet {
    /// Check if a capability is granted
    pub fn has_capability(&self, cap: Capability) -> bool {
        self.capabilities.contains(&cap)
    }

    /// Add a capability
    pub fn grant_capability(&mut self, cap: Capability) {
        self.capabilities.insert(cap);
    }

    /// Remove a capability
    pub fn revoke_capability(&mut self, cap: Capability) {
        self.capabilities.remove(&cap);
    }

    /// Mint the token gating guarded calls
    pub fn timer_capability(&self) -> SecurityResult<TimerCapability> {
        for required in TIMER_REQUIREMENTS {
            if !self.has_capability(required) {
                debug!(capability = %required, "Timer capability denied");
                return Err(SecurityError::CapabilityMissing(required));
            }
        }

        Ok(TimerCapability { _sealed: () })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_set_mints_token() {
        assert!(CapabilitySet::standard().timer_capability().is_ok());
    }

    #[test]
    fn test_minimal_set_is_denied() {
        let err = CapabilitySet::minimal().timer_capability().unwrap_err();
        assert_eq!(err, SecurityError::CapabilityMissing(Capability::TimeAccess));
    }

    #[test]
    fn test_each_requirement_is_checked() {
        let mut caps = CapabilitySet::minimal();
        caps.grant_capability(Capability::TimeAccess);
        assert_eq!(
            caps.timer_capability().unwrap_err(),
            SecurityError::CapabilityMissing(Capability::SpawnThread)
        );

        caps.grant_capability(Capability::SpawnThread);
        assert!(caps.timer_capability().is_ok());

        caps.revoke_capability(Capability::TimeAccess);
        assert!(!caps.has_capability(Capability::TimeAccess));
        assert!(caps.timer_capability().is_err());
    }
}
