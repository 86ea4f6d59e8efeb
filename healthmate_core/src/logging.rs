//! Tracing setup for the `healthmate` binary.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber. `level` comes from `[logging] level` in
/// the config file; `RUST_LOG` overrides it. Logs go to stderr, leaving
/// stdout for command output.
pub fn init_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

/// Route logs through the test harness
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
