/*!
 * Core Module
 * Fundamental guard types and error handling
 */

pub mod errors;
pub mod guard;
pub mod limits;
pub mod types;

// Re-export for convenience
pub use errors::*;
pub use guard::{Guard, GuardDrop, GuardMetadata};
pub use types::*;
