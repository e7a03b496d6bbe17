/*!
 * Structured Tracing
 * Subscriber setup and per-call spans using the tracing crate
 */

use crate::core::TimerInfo;
use std::time::Instant;
use tracing::{debug, info, span, Level};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - GUARD_TRACE_JSON: Enable JSON output (default: false)
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing() -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("GUARD_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_names(true)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init()
            .is_ok()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_names(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()
            .is_ok()
    };

    if installed {
        info!(json = use_json, "Structured tracing initialized");
    }
    installed
}

/// Span covering one guarded call, from claim to cleanup
pub struct GuardSpan {
    span: tracing::Span,
    start: Instant,
}

impl GuardSpan {
    pub fn new(info: &TimerInfo) -> Self {
        let span = span!(
            Level::DEBUG,
            "guarded_call",
            timer = %info,
            outcome = tracing::field::Empty,
            elapsed_us = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
        }
    }

    /// Enter the span on the calling thread
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }

    /// Record how the call ended
    pub fn record_outcome(&self, outcome: &'static str) {
        self.span.record("outcome", outcome);
    }
}

impl Drop for GuardSpan {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        self.span.record("elapsed_us", elapsed.as_micros() as u64);
        let _entered = self.span.enter();
        debug!(elapsed_us = elapsed.as_micros() as u64, "guarded call finished");
    }
}
