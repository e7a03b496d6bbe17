/*!
 * Security Types
 * Capabilities gating the timer and worker primitives
 */

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Security operation result
///
/// # Must Use
/// Security operations can fail and must be handled to prevent vulnerabilities
#[must_use = "security operations can fail and must be handled"]
pub type SecurityResult<T> = Result<T, SecurityError>;

/// Security errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "error", content = "details")]
pub enum SecurityError {
    #[error("Capability missing: {0}")]
    CapabilityMissing(Capability),
}

/// Privileged primitives a guarded call needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Arm and disarm the process interval timer
    TimeAccess,
    /// Start the supervised worker thread
    SpawnThread,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Capability::TimeAccess => write!(f, "TimeAccess"),
            Capability::SpawnThread => write!(f, "SpawnThread"),
        }
    }
}

/// Granted capabilities of a caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CapabilitySet {
    #[serde(skip_serializing_if = "HashSet::is_empty", default)]
    pub capabilities: HashSet<Capability>,
}

impl CapabilitySet {
    /// Nothing granted (most restrictive)
    #[must_use]
    pub fn minimal() -> Self {
        Self::default()
    }

    /// Everything a guarded call needs
    #[must_use]
    pub fn standard() -> Self {
        let mut capabilities = HashSet::new();
        capabilities.insert(Capability::TimeAccess);
        capabilities.insert(Capability::SpawnThread);
        Self { capabilities }
    }
}
