//! Logging setup for the Kiln CLI.
//!
//! The level is picked in this order:
//! 1. `--verbose`: debug for the kiln crates
//! 2. `--quiet`: errors only
//! 3. `RUST_LOG`
//! 4. warnings for the kiln crates
//!
//! Logs go to stderr.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "kiln=debug,kiln_chain=debug,kiln_config=debug,kiln_core=debug";
const QUIET_FILTER: &str = "error";
const DEFAULT_FILTER: &str = "kiln=warn,kiln_chain=warn,kiln_config=warn,kiln_core=warn";

/// Pick the filter for the given flags.
pub fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    // a second call (tests) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter_for(verbose, quiet))
        .with(fmt_layer)
        .try_init();
}
