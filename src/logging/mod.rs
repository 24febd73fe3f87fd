// Logging module for structured logging using the tracing crate

use std::error::Error;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set
pub fn default_directive(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "info"
    }
}

/// Initialize the tracing subscriber for structured logging
///
/// The subscriber is configured with:
/// - JSON formatting for easy parsing by log aggregation systems
/// - Filtering from `RUST_LOG`, else `info` (`debug` when the debug toggle is set)
/// - Output to stdout
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
///
/// # Examples
///
/// ```
/// use catalog_resizer::logging::init_subscriber;
///
/// init_subscriber(false).expect("Failed to initialize logging");
/// tracing::info!("Application started");
/// ```
pub fn init_subscriber(debug: bool) -> Result<(), Box<dyn Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(false)
        .with_target(true)
        .try_init()
}
