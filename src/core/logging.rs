//! Structured logging system
//!
//! This module provides structured logging with:
//! - JSON and text format support
//! - Configurable log levels
//! - stdout or daily-rotated file output
//! - Integration with tracing ecosystem

use crate::core::config::LoggingConfig;
use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Logger instance that manages the logging system
pub struct Logger {
    _guard: Option<WorkerGuard>,
}

impl Logger {
    /// Initialize the logging system based on configuration
    ///
    /// This sets up the global tracing subscriber with the specified format,
    /// level, and output destination.
    pub fn init(config: &LoggingConfig) -> Result<Self> {
        let level = parse_log_level(&config.level)?;

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level.as_str()));

        let (writer, guard) = match config.output.as_str() {
            "stdout" => {
                let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stdout());
                (non_blocking, Some(guard))
            }
            "file" => {
                let log_file = config
                    .log_file
                    .as_ref()
                    .context("log_file must be specified when output is 'file'")?;

                let directory = log_file
                    .parent()
                    .context("log_file must have a parent directory")?;
                let filename = log_file
                    .file_name()
                    .context("log_file must have a filename")?;

                std::fs::create_dir_all(directory).context("Failed to create log directory")?;

                let file_appender = tracing_appender::rolling::daily(directory, filename);
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
                (non_blocking, Some(guard))
            }
            _ => {
                anyhow::bail!("Invalid output configuration: {}", config.output);
            }
        };

        let fmt_layer = match config.format.as_str() {
            "json" => fmt::layer()
                .json()
                .with_writer(writer)
                .with_span_events(FmtSpan::CLOSE)
                .with_current_span(true)
                .with_target(true)
                .boxed(),
            "text" => fmt::layer()
                .with_writer(writer)
                .with_span_events(FmtSpan::CLOSE)
                .with_target(true)
                .boxed(),
            _ => {
                anyhow::bail!("Invalid format configuration: {}", config.format);
            }
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .context("Failed to initialize tracing subscriber")?;

        tracing::info!(
            level = %config.level,
            format = %config.format,
            output = %config.output,
            "Logging system initialized"
        );

        Ok(Logger { _guard: guard })
    }
}

/// Parse log level string to tracing Level
fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!("Invalid log level: {}", level),
    }
}
