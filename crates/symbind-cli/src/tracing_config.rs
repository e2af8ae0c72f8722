//! `tracing` subscriber setup for the CLI binary.

use tracing_subscriber::EnvFilter;

/// Install a `tracing-subscriber` fmt layer whose default verbosity is raised
/// by repeated `-v` flags, and may always be overridden by `RUST_LOG`.
pub fn init(verbosity: u8) {
    let default_level = match verbosity {
        0 => "symbind=warn",
        1 => "symbind=info",
        2 => "symbind=debug",
        _ => "symbind=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}
