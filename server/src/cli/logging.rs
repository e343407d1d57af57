// server/src/cli/logging.rs

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Installs the global tracing subscriber. Records from the `log` crate used
/// by the library crates are forwarded to it.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    // A subscriber may already be installed, e.g. when embedded in tests.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(true).try_init();
}
