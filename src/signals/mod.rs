/*!
 * Signals Module
 * Translation of timer expiry into a catchable timeout condition
 */

mod handler;

pub use handler::TimeoutSignalHandler;
