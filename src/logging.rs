//! Logging setup for processes hosting the site provider.
//!
//! Logs go to **stderr** so stdout stays free for whatever protocol the
//! invoking runtime speaks. Filtering follows `RUST_LOG`.
//!
//! ```bash
//! # Lifecycle events only
//! RUST_LOG=info ./jamf-provider
//!
//! # Include every lookup
//! RUST_LOG=jamf_site_provider=debug ./jamf-provider
//! ```

use tracing_subscriber::{fmt, prelude::*, registry::Registry, EnvFilter, Layer};

const DEFAULT_LEVEL: &str = "info";

fn stderr_layer(default_level: &str) -> impl Layer<Registry> + Send + Sync {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_filter(filter)
}

/// Install the global subscriber at `info` unless `RUST_LOG` says otherwise.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
///
/// # Example
///
/// ```ignore
/// jamf_site_provider::init_logging();
/// tracing::info!("Provider starting");
/// ```
pub fn init_logging() {
    init_logging_with_default(DEFAULT_LEVEL);
}

/// Like [`init_logging`], with a different fallback level.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging_with_default(default_level: &str) {
    tracing_subscriber::registry()
        .with(stderr_layer(default_level))
        .init();
}

/// Try to install the subscriber, returning false if one is already set.
///
/// Useful in tests, where several cases may race to initialize logging.
pub fn try_init_logging() -> bool {
    tracing_subscriber::registry()
        .with(stderr_layer(DEFAULT_LEVEL))
        .try_init()
        .is_ok()
}
