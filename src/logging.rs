//! Tracing setup for the CLI and tests.
//!
//! Diagnostics always go to stderr (or a log file) so stdout stays clean for
//! rendered markdown and `--json` output. `RUST_LOG` overrides the level
//! chosen from `-v`/`-q`.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Mutex, Once};
use tracing_subscriber::EnvFilter;

/// Level directive for the given verbosity flags.
#[must_use]
pub const fn level_for(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber.
///
/// With `log_file`, events are appended there as JSON lines instead of being
/// printed to stderr.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or a subscriber is
/// already installed.
pub fn init_logging(verbose: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbose, quiet)));

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install subscriber: {e}"))?;
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install subscriber: {e}"))
}

static TEST_LOGGING: Once = Once::new();

/// Capture logs through the test writer. Safe to call from every test.
pub fn init_test_logging() {
    TEST_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    });
}
