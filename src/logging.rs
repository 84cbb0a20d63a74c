//! `tracing` subscriber setup for the CLI
//!
//! Diagnostics are written to stderr and, when `logging.file` is set, teed
//! into a plain or rolling log file. Stdout carries command results only.

use crate::config::{LogRotation, LoggingOptions};
use crate::error::{Error, Result};
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::OnceLock;
use tracing_appender::non_blocking::{NonBlocking, NonBlockingBuilder, WorkerGuard};
use tracing_appender::rolling;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Keeps the file writer's worker alive until the process exits.
static LOG_FILE_WORKER: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global subscriber described by `options`.
///
/// `QRCLIP_LOG_LEVEL` takes precedence over `options.level`. Once a
/// subscriber is installed, later calls do nothing.
pub fn init(options: &LoggingOptions) -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let filter = level_filter(
        std::env::var("QRCLIP_LOG_LEVEL")
            .ok()
            .as_deref()
            .unwrap_or(&options.level),
    )?;

    let file_layer = match open_log_sink(options)? {
        Some((writer, worker)) => {
            let _ = LOG_FILE_WORKER.set(worker);
            Some(
                fmt::layer()
                    .with_timer(UtcTime::rfc_3339())
                    .with_ansi(false)
                    .with_writer(writer),
            )
        }
        None => None,
    };

    let stderr_layer = fmt::layer()
        .with_timer(UtcTime::rfc_3339())
        .with_ansi(options.color)
        .with_writer(io::stderr);

    Registry::default()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to install tracing subscriber: {e}")))
}

/// Parse a level or `EnvFilter` directive list such as `warn,qrclip=debug`.
fn level_filter(directives: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directives)
        .map_err(|e| Error::Config(format!("Invalid log level '{directives}': {e}")))
}

/// Open the non-blocking file writer, or `None` when file logging is off.
fn open_log_sink(options: &LoggingOptions) -> Result<Option<(NonBlocking, WorkerGuard)>> {
    let Some(path) = options.file.as_deref() else {
        return Ok(None);
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| {
        Error::Config(format!("Failed to create log directory {}: {e}", dir.display()))
    })?;

    let builder = NonBlockingBuilder::default().lossy(false);
    let sink = match options.rotation {
        None => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    Error::Config(format!("Failed to open log file {}: {e}", path.display()))
                })?;
            builder.finish(file)
        }
        Some(rotation) => {
            let prefix = path.file_name().ok_or_else(|| {
                Error::Config(format!(
                    "Rotating log path '{}' has no file name",
                    path.display()
                ))
            })?;
            let appender = match rotation {
                LogRotation::Hourly => rolling::hourly(dir, prefix),
                LogRotation::Daily => rolling::daily(dir, prefix),
            };
            builder.finish(appender)
        }
    };

    Ok(Some(sink))
}
