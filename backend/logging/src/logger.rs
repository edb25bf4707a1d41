//! Structured Logger
//!
//! Wraps `tracing` to provide console output, optional file rotation (NDJSON),
//! and environment-based level control.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Rolling files are named `greenlens.log.YYYY-MM-DD`.
pub const LOG_FILE_PREFIX: &str = "greenlens.log";

/// Initialize the global structured logger.
///
/// `RUST_LOG` overrides `level`. With `log_dir` set, every event is also
/// appended as JSON to a daily rolling file. A second call is a no-op.
pub fn init_logger(level: &str, log_dir: Option<&Path>, json: bool) -> Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("Invalid log level \"{level}\""))?,
    };

    let file_layer = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log dir {}", dir.display()))?;
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
            Some(fmt::layer().json().with_writer(appender).with_ansi(false))
        }
        None => None,
    };

    // Console: stderr, so stdout stays free for command output
    let console_json = json.then(|| fmt::layer().json().with_writer(std::io::stderr));
    let console_plain = (!json).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(true)
    });

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_plain)
        .with(console_json)
        .with(file_layer)
        .try_init();
    Ok(())
}
