//! Logging configuration
//!
//! Simple tracing-based logging. No OTEL - this is a conformance
//! harness, not a production service.
//!
//! # Example
//!
//! ```no_run
//! use snapcheck::telemetry::init_logging;
//!
//! init_logging();
//! // Logs go to stderr with the configured level
//! ```

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Initialize logging with tracing-subscriber
///
/// Uses the RUST_LOG env var for filtering (default: info).
/// Call once at the start of a scenario; later calls are no-ops.
pub fn init_logging() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
