//! Board Order
//!
//! Boards hold ordered columns, columns hold ordered tasks, and positions in
//! every scope stay dense under concurrent edits.
//!
//! Layered architecture:
//! - domain: Core entities, scope state and errors
//! - ordering: Position planning and transactional execution
//! - repository: SQLite storage
//! - access: Authorization gate
//! - commands: Authorized, validated handlers

pub mod access;
pub mod commands;
pub mod config;
pub mod domain;
pub mod ordering;
pub mod repository;
mod state;

pub use config::{Config, ConfigError};
pub use state::AppState;

pub const APP_NAME: &str = "board-order";

/// Install the rolling file logger described by `config`
pub fn init_logging(config: &Config) -> Result<(), rolling_logger::LoggerError> {
    rolling_logger::init_with(&config.log.dir, APP_NAME, &config.logger_options())
}
