/*!
 * Security Module
 * Capability model gating access to the timer primitives
 */

pub mod capability;
pub mod types;

pub use capability::{TimerCapability, TIMER_REQUIREMENTS};
pub use types::{Capability, CapabilitySet, SecurityError, SecurityResult};
