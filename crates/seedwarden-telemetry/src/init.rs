//! Telemetry initialisation primitives and logging configuration.
//!
//! # Design
//! - Centralises logging setup (text or JSON) with a single entry point.
//! - Mirrors every line into an optional log file without ANSI escapes,
//!   rotated daily with [`LOG_FILE_BACKUPS`] files retained.
//! - `RUST_LOG` wins over the configured level when present.

use std::path::Path;

use anyhow::{Result, anyhow};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::format::SeverityLabelFormat;

/// Default logging level when neither `RUST_LOG` nor a CLI override is provided.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Dated log files kept next to the active one; older files are deleted.
pub const LOG_FILE_BACKUPS: usize = 5;

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig<'a> {
    /// Log level or filter directive (e.g., `info`, `seedwarden_app=debug`).
    pub level: &'a str,
    /// Output format selection for the tracing subscriber.
    pub format: LogFormat,
    /// File mirroring the console output; `None` disables it.
    pub log_file: Option<&'a Path>,
}

impl Default for LoggingConfig<'_> {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL,
            format: LogFormat::Text,
            log_file: None,
        }
    }
}

/// Available output formats for the logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// `<timestamp> - <LABEL>: <message>` lines.
    Text,
    /// Structured JSON objects, one per line.
    Json,
}

impl LogFormat {
    /// Parse a format name; unknown names fall back to [`Self::Text`].
    #[must_use]
    pub fn from_name(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Keeps the background log-file writer alive; flushes on drop.
#[must_use = "dropping the guard stops the log file writer"]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Configure and install the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if the log file path has no file name, or if the tracing
/// subscriber cannot be installed (for example, because another subscriber
/// has already been set globally).
pub fn init_logging(config: &LoggingConfig<'_>) -> Result<LoggingGuard> {
    let (file_writer, guard) = match config.log_file {
        Some(path) => {
            let (writer, guard) = open_log_file(path)?;
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    match config.format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(build_env_filter(config.level))
            .with(fmt::layer().event_format(SeverityLabelFormat))
            .with(file_writer.map(|writer| {
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(writer)
                    .event_format(SeverityLabelFormat)
            }))
            .try_init()
            .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))?,
        LogFormat::Json => tracing_subscriber::registry()
            .with(build_env_filter(config.level))
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .with(file_writer.map(|writer| {
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_target(true)
                    .with_writer(writer)
            }))
            .try_init()
            .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))?,
    }

    Ok(LoggingGuard { _file: guard })
}

fn open_log_file(
    path: &Path,
) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("log file path '{}' has no file name", path.display()))?;
    let directory = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(file_name.to_string_lossy().into_owned())
        .max_log_files(LOG_FILE_BACKUPS)
        .build(directory)
        .map_err(|err| anyhow!("failed to open log file '{}': {err}", path.display()))?;
    Ok(tracing_appender::non_blocking(appender))
}

fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_parses_names() {
        assert_eq!(LogFormat::from_name("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::from_name("text"), LogFormat::Text);
        assert_eq!(LogFormat::from_name("unknown"), LogFormat::Text);
    }

    #[test]
    fn log_file_without_name_is_rejected() {
        assert!(open_log_file(Path::new("/")).is_err());
    }

    #[test]
    fn init_logging_installs_subscriber_once() -> Result<()> {
        let temp = tempfile::TempDir::new()?;
        let log_path = temp.path().join("activity.log");
        let config = LoggingConfig {
            level: "info",
            format: LogFormat::Text,
            log_file: Some(&log_path),
        };

        let guard = init_logging(&config)?;
        assert!(init_logging(&config).is_err());
        drop(guard);

        let created = std::fs::read_dir(temp.path())?
            .filter_map(std::result::Result::ok)
            .any(|entry| entry.file_name().to_string_lossy().starts_with("activity.log"));
        assert!(created);
        Ok(())
    }
}
