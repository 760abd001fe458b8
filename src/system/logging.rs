//! Logging system initialization
//!
//! Logs go to a file by default so the console only shows progress ticks,
//! printed snapshots and the operator prompts.

use std::ffi::OsStr;
use std::path::Path;

use anyhow::{Context, anyhow};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;

use crate::config::LoggingConfig;

const DEFAULT_LOG_FILE: &str = "metrics-sampler.log";

/// Initialize logging system based on configuration
///
/// **Note**: This should be called only once during application startup,
/// after the configuration has been loaded.
///
/// # Returns
/// * `WorkerGuard` - Must be kept alive for the duration of the program
///   to ensure non-blocking log writes are flushed
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<WorkerGuard> {
    let writer = make_writer(config)?;

    let (non_blocking_writer, guard) = tracing_appender::non_blocking(writer);
    let filter = tracing_subscriber::EnvFilter::try_new(&config.level)
        .with_context(|| format!("Invalid log level '{}'", config.level))?;

    let subscriber_builder = tracing_subscriber::fmt()
        .with_writer(non_blocking_writer)
        .with_env_filter(filter)
        .with_level(true)
        .with_ansi(logs_to_console(config));

    let installed = if config.format == "json" {
        subscriber_builder.json().try_init()
    } else {
        subscriber_builder.try_init()
    };
    installed.map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    Ok(guard)
}

fn logs_to_console(config: &LoggingConfig) -> bool {
    config.file.as_ref().is_none_or(|f| f.is_empty())
}

fn make_writer(config: &LoggingConfig) -> anyhow::Result<Box<dyn std::io::Write + Send + Sync>> {
    let log_file = match config.file.as_deref() {
        Some(f) if !f.is_empty() => f,
        _ => return Ok(Box::new(std::io::stdout())),
    };

    if config.enable_rotation {
        let path = Path::new(log_file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let filename = path
            .file_name()
            .and_then(OsStr::to_str)
            .unwrap_or(DEFAULT_LOG_FILE);

        let appender = rolling::Builder::new()
            .rotation(rolling::Rotation::DAILY)
            .filename_prefix(filename.trim_end_matches(".log"))
            .filename_suffix("log")
            .max_log_files(config.max_backups as usize)
            .build(dir)
            .context("Failed to create rolling log appender")?;
        Ok(Box::new(appender))
    } else {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
            .with_context(|| format!("Failed to open log file '{}'", log_file))?;
        Ok(Box::new(file))
    }
}
