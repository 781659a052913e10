//! Rolling Logger
//!
//! Installs a global `tracing` subscriber that writes to stderr and to a
//! size-rotated log file, keeping the last lines in memory.
//! `log` records are bridged into the same subscriber.

use std::path::PathBuf;
use std::sync::OnceLock;

use thiserror::Error;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

mod writer;

pub use writer::RollingWriter;

static WRITER: OnceLock<RollingWriter> = OnceLock::new();

/// Logger errors
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("failed to open log file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid log filter '{filter}': {message}")]
    Filter { filter: String, message: String },

    #[error("logger already initialized")]
    AlreadyInitialized,

    #[error("logger not initialized")]
    NotInitialized,
}

/// Rotation and filtering settings
#[derive(Debug, Clone)]
pub struct LoggerOptions {
    /// Filter directive used when `RUST_LOG` is not set
    pub filter: String,
    /// Rotate once the active file would grow past this size
    pub max_bytes: u64,
    /// Number of rotated files to keep
    pub max_files: usize,
    /// Lines kept in memory for `recent_lines`
    pub buffer_lines: usize,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            max_bytes: 5 * 1024 * 1024,
            max_files: 3,
            buffer_lines: 500,
        }
    }
}

struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// Initialize logging with default options
pub fn init_logger(dir: impl Into<PathBuf>, app_name: &str) -> Result<(), LoggerError> {
    init_with(dir, app_name, &LoggerOptions::default())
}

/// Initialize logging into `{dir}/{app_name}.log`
pub fn init_with(
    dir: impl Into<PathBuf>,
    app_name: &str,
    options: &LoggerOptions,
) -> Result<(), LoggerError> {
    if WRITER.get().is_some() {
        return Err(LoggerError::AlreadyInitialized);
    }

    let dir = dir.into();
    let writer = RollingWriter::open(
        &dir,
        app_name,
        options.max_bytes,
        options.max_files,
        options.buffer_lines,
    )?;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&options.filter).map_err(|e| LoggerError::Filter {
            filter: options.filter.clone(),
            message: e.to_string(),
        })?,
    };

    let file_writer = writer.clone();
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_timer(LocalTime)
                .with_writer(std::io::stderr),
        )
        .with(
            fmt::layer()
                .with_timer(LocalTime)
                .with_ansi(false)
                .with_writer(move || file_writer.clone()),
        )
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)?;

    WRITER
        .set(writer)
        .map_err(|_| LoggerError::AlreadyInitialized)?;

    log::info!("logging to {}", dir.display());
    Ok(())
}

/// Recent log lines, oldest first. Empty before initialization.
pub fn recent_lines() -> Vec<String> {
    WRITER.get().map(|w| w.recent_lines()).unwrap_or_default()
}

/// Log an informational message through the `log` facade
pub fn info(message: &str) -> Result<(), LoggerError> {
    WRITER.get().ok_or(LoggerError::NotInitialized)?;
    log::info!("{}", message);
    Ok(())
}

/// Log an error message through the `log` facade
pub fn error(message: &str) -> Result<(), LoggerError> {
    WRITER.get().ok_or(LoggerError::NotInitialized)?;
    log::error!("{}", message);
    Ok(())
}
