/*!
 * Monitoring
 * Tracing setup, per-call spans and guard statistics
 */

mod stats;
mod tracer;

pub use stats::{AtomicGuardStats, GuardStats};
pub use tracer::{init_tracing, GuardSpan};
