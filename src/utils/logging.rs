//! Logging setup for l.
//!
//! Diagnostics go to stderr through `tracing`, so they never mix with the viewed content on
//! stdout. The filter comes from the `L_LOG` environment variable (same syntax as `RUST_LOG`)
//! and defaults to `warn`, which shows fallbacks and config problems only.

use crossterm::tty::IsTty;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "L_LOG";
const DEFAULT_FILTER: &str = "warn";

/// Installs the global subscriber. Safe to call more than once, later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(std::io::stderr().is_tty())
        .without_time()
        .compact()
        .try_init();
}
