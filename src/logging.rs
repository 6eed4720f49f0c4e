//! Tracing subscriber setup for the CLI.
//!
//! stdout is reserved for command output (tables, JSON); all log lines go
//! to stderr. The filter comes from `TICKETDESK_LOG`, then `RUST_LOG`, then
//! the level implied by `-v` flags.

use std::io::IsTerminal;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

pub const LOG_ENV: &str = "TICKETDESK_LOG";

/// Default directive for a verbosity count.
pub fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "ticketdesk=warn",
        1 => "ticketdesk=info",
        2 => "ticketdesk=debug",
        _ => "ticketdesk=trace,reqwest=debug",
    }
}

fn build_filter(verbose: u8) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init_logging(verbose: u8) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .without_time();

    let _ = tracing_subscriber::registry()
        .with(build_filter(verbose))
        .with(fmt_layer)
        .try_init();
}
