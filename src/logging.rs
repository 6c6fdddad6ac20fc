//! Diagnostic logging
//!
//! `tracing` events go to stderr so they never mix with command output.
//! The filter comes from `RUST_LOG`, falling back to warnings for this crate.

use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

/// Default filter when `RUST_LOG` is unset or invalid
pub const DEFAULT_FILTER: &str = "envelope_plan=warn";

/// Install the global subscriber; later calls do nothing
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        // A subscriber installed elsewhere (tests, embedding apps) wins
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .try_init();
    });
}
