//! Configuration
//!
//! TOML file with a default for every field. `BOARD_ORDER_DB` and
//! `BOARD_ORDER_LOG` override the database path and log directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rolling_logger::LoggerOptions;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ordering::{EngineOptions, RetryPolicy};

pub const DB_ENV: &str = "BOARD_ORDER_DB";
pub const LOG_ENV: &str = "BOARD_ORDER_LOG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file, or `:memory:`
    pub path: PathBuf,
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("board-order.db"),
            busy_timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Longest wait for the shared connection before reporting contention
    pub lock_timeout_ms: u64,
    pub verify_after_write: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: 5_000,
            verify_after_write: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            base_delay_ms: policy.base_delay.as_millis() as u64,
            max_delay_ms: policy.max_delay.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub dir: PathBuf,
    /// `EnvFilter` directives, e.g. `info,board_order=debug`
    pub filter: String,
    pub max_bytes: u64,
    pub max_files: usize,
    pub buffer_lines: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        let options = LoggerOptions::default();
        Self {
            dir: PathBuf::from("logs"),
            filter: options.filter,
            max_bytes: options.max_bytes,
            max_files: options.max_files,
            buffer_lines: options.buffer_lines,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub engine: EngineConfig,
    pub retry: RetryConfig,
    pub log: LogConfig,
}

impl Config {
    /// Read `path`, apply environment overrides and validate
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML without touching the environment
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from the environment, looked up through `var`
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(path) = var(DB_ENV).filter(|v| !v.is_empty()) {
            self.database.path = PathBuf::from(path);
        }
        if let Some(dir) = var(LOG_ENV).filter(|v| !v.is_empty()) {
            self.log.dir = PathBuf::from(dir);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                field: "retry.max_attempts",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(ConfigError::Invalid {
                field: "retry.base_delay_ms",
                reason: format!("exceeds max_delay_ms ({})", self.retry.max_delay_ms),
            });
        }
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "database.path",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.database.busy_timeout_ms)
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.engine.lock_timeout_ms)
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            retry: RetryPolicy {
                max_attempts: self.retry.max_attempts,
                base_delay: Duration::from_millis(self.retry.base_delay_ms),
                max_delay: Duration::from_millis(self.retry.max_delay_ms),
            },
            verify_after_write: self.engine.verify_after_write,
        }
    }

    pub fn logger_options(&self) -> LoggerOptions {
        LoggerOptions {
            filter: self.log.filter.clone(),
            max_bytes: self.log.max_bytes,
            max_files: self.log.max_files,
            buffer_lines: self.log.buffer_lines,
        }
    }
}
