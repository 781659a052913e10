//! Command errors
//!
//! One error type for every command, with an HTTP-style status code so a
//! transport can answer without inspecting variants.

use thiserror::Error;

use crate::access::AccessError;
use crate::domain::{BoardId, ErrorKind, OrderError, UserId};

pub type CommandResult<T> = Result<T, CommandError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("user {user} may not do this on board {board_id}")]
    Forbidden { user: UserId, board_id: BoardId },

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl CommandError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            CommandError::Forbidden { .. } => 403,
            CommandError::Invalid { .. } => 400,
            CommandError::Order(err) => match err.kind() {
                ErrorKind::NotFound => 404,
                ErrorKind::InvalidInput => 400,
                ErrorKind::Conflict => 409,
                ErrorKind::Unavailable => 503,
                ErrorKind::Internal => 500,
            },
        }
    }
}

impl From<AccessError> for CommandError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::NotFound(subject) => CommandError::Order(OrderError::NotFound { subject }),
            AccessError::Forbidden { user, board_id } => CommandError::Forbidden { user, board_id },
            AccessError::Store(err) => CommandError::Order(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConflictReason, Subject};

    #[test]
    fn test_status_codes() {
        assert_eq!(CommandError::from(OrderError::not_found("task", 1)).status_code(), 404);
        assert_eq!(CommandError::invalid("title", "empty").status_code(), 400);
        assert_eq!(
            CommandError::Forbidden { user: 1, board_id: 2 }.status_code(),
            403
        );

        let stale = OrderError::Conflict {
            subject: Subject::new("task", 1),
            reason: ConflictReason::StaleScope { expected: 1, actual: 2 },
        };
        assert_eq!(CommandError::from(stale).status_code(), 409);
        assert_eq!(CommandError::from(OrderError::unavailable("io")).status_code(), 503);

        let broken = OrderError::Invariant {
            scope: Subject::new("column", 1),
            detail: "gap".to_string(),
        };
        assert_eq!(CommandError::from(broken).status_code(), 500);
    }

    #[test]
    fn test_access_errors_convert() {
        let err: CommandError = AccessError::NotFound(Subject::new("board", 4)).into();
        assert_eq!(err, CommandError::Order(OrderError::not_found("board", 4)));

        let err: CommandError = AccessError::Forbidden { user: 1, board_id: 4 }.into();
        assert_eq!(err.status_code(), 403);
    }
}
