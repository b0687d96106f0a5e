//! Diagnostic logging setup
//!
//! Logs go to stderr so they never interleave with the progress report on
//! stdout. `RUST_LOG` takes precedence over the `-v` count.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Log level for a `-v` count; `quiet` forces errors only
pub fn level_for(verbosity: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init_logging(verbosity: u8, quiet: bool) {
    let level = level_for(verbosity, quiet);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{}={}",
            env!("CARGO_CRATE_NAME"),
            level.as_str().to_lowercase()
        ))
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
