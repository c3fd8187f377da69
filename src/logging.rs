//! Logging and tracing infrastructure for binlang.
//!
//! Detection emits structured `tracing` events; this module installs a
//! subscriber for binaries and tests that want to see them.

use std::sync::Once;
use tracing::info;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

static INIT: Once = Once::new();

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the global tracing subscriber.
///
/// Filtering follows `RUST_LOG` and defaults to `info`. Subsequent calls
/// are ignored.
pub fn init_tracing() {
    INIT.call_once(|| {
        let fmt_layer = fmt::layer()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);

        let _ = tracing_subscriber::registry()
            .with(env_filter())
            .with(fmt_layer)
            .try_init();

        info!("binlang tracing initialized");
    });
}

/// Initialize tracing with JSON output for structured logging.
pub fn init_tracing_json() {
    INIT.call_once(|| {
        let fmt_layer = fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_current_span(true);

        let _ = tracing_subscriber::registry()
            .with(env_filter())
            .with(fmt_layer)
            .try_init();

        info!("binlang tracing initialized (JSON mode)");
    });
}

/// Span wrapping a single detection.
#[macro_export]
macro_rules! detect_span {
    ($path:expr) => {
        tracing::info_span!("detect", path = %$path)
    };
    ($path:expr, $($field:tt)*) => {
        tracing::info_span!("detect", path = %$path, $($field)*)
    };
}
