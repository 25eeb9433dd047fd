//! Logging configuration for the hookline CLI
//!
//! Diagnostics go to stderr so that hook output on stdout stays clean, with
//! optional file logging using tracing.

use crate::{Error, Result};
use std::path::Path;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Crates whose events are shown by default
const LOG_TARGETS: &[&str] = &["hookline", "hookline_core", "hookline_config", "hookline_engine"];

/// Build the default filter directive for a level
fn default_directive(level: &str) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the logging system
///
/// # Arguments
/// * `verbose` - Enable debug level logging (and timestamps)
/// * `log_file` - Optional path to append debug logs to
///
/// `RUST_LOG` overrides the console filter.
///
/// # Examples
/// ```ignore
/// // Basic usage with warn level
/// init(false, None)?;
///
/// // Verbose mode with debug level
/// init(true, None)?;
///
/// // Write logs to file
/// init(true, Some(Path::new("debug.log")))?;
/// ```
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    // Hook results are printed directly; logs stay quiet unless asked for
    let level = if verbose { "debug" } else { "warn" };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(level)))
        .map_err(|e| Error::Message(format!("Invalid log filter: {e}")))?;

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .with_ansi(true);

    // No timestamps in normal mode
    let console_layer = if verbose {
        console_layer.with_filter(env_filter).boxed()
    } else {
        console_layer
            .without_time()
            .with_filter(env_filter)
            .boxed()
    };

    let file_layer = match log_file {
        Some(log_path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)?;

            let file_filter = EnvFilter::try_new(default_directive("debug"))
                .map_err(|e| Error::Message(format!("Invalid log filter: {e}")))?;

            Some(
                fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .pretty()
                    .with_filter(file_filter),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Message(format!("Failed to initialize logging: {e}")))?;

    Ok(())
}
