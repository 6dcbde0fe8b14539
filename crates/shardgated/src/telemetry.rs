//! Logging initialization for the daemon.
//!
//! Human-readable `tracing-subscriber` output on stdout. `RUST_LOG` takes
//! precedence over the `[log] level` config value.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Call once, before the first event.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
