//! Tracing setup for the liftlog binary and tests.
//!
//! Log lines go to stderr so they never mix with command output on stdout.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter directive for a given `-v` count
///
/// 0 keeps only warnings, 1 shows store and import progress, 2+ shows
/// per-record decisions.
pub fn directive_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "warn,liftlog_core=info",
        _ => "info,liftlog_core=debug",
    }
}

/// Install the global subscriber
///
/// RUST_LOG, when set, wins over the verbosity flag.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive_for(verbosity)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(verbosity > 1)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Route logs through the test harness
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new(directive_for(2)))
        .try_init();
}
