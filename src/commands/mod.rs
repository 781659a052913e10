//! Commands Layer
//!
//! Handlers that authorize the caller, validate input and hand positional
//! work to the ordering engines.

mod board_cmd;
mod column_cmd;
mod error;
mod task_cmd;

#[cfg(test)]
mod tests;

pub use board_cmd::*;
pub use column_cmd::*;
pub use error::{CommandError, CommandResult};
pub use task_cmd::*;

use tracing::warn;

pub const MAX_NAME_LEN: usize = 200;
pub const PRIORITY_RANGE: std::ops::RangeInclusive<i32> = 0..=5;

/// Trim a name or title and check it is non-empty and not too long
fn validate_name(field: &'static str, value: &str) -> CommandResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        warn!(field, "rejected empty value");
        return Err(CommandError::invalid(field, "must not be empty"));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        warn!(field, len = trimmed.chars().count(), "rejected long value");
        return Err(CommandError::invalid(
            field,
            format!("must be at most {} characters", MAX_NAME_LEN),
        ));
    }
    Ok(trimmed.to_string())
}

fn validate_priority(priority: i32) -> CommandResult<i32> {
    if !PRIORITY_RANGE.contains(&priority) {
        warn!(priority, "rejected priority");
        return Err(CommandError::invalid(
            "priority",
            format!(
                "must be between {} and {}",
                PRIORITY_RANGE.start(),
                PRIORITY_RANGE.end()
            ),
        ));
    }
    Ok(priority)
}
