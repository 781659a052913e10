//! Authorization Gate
//!
//! Decides whether a caller may act on a board, column or task before any
//! ordering work starts. Every target resolves to its board; the owner and
//! the board's members are allowed.

mod gate;

pub use gate::MembershipGate;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{BoardId, ColumnId, OrderError, Role, Subject, TaskId, UserId};

/// What the caller wants to act on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Target {
    Board(BoardId),
    Column(ColumnId),
    Task(TaskId),
}

impl Target {
    pub fn subject(&self) -> Subject {
        match *self {
            Target::Board(id) => Subject::new("board", id),
            Target::Column(id) => Subject::new("column", id),
            Target::Task(id) => Subject::new("task", id),
        }
    }
}

/// A granted request: the board the target belongs to and the caller's role on it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Access {
    pub board_id: BoardId,
    pub role: Role,
}

impl Access {
    pub fn is_owner(&self) -> bool {
        self.role == Role::Owner
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("{0} not found")]
    NotFound(Subject),

    #[error("user {user} has no access to board {board_id}")]
    Forbidden { user: UserId, board_id: BoardId },

    #[error(transparent)]
    Store(#[from] OrderError),
}

#[async_trait]
pub trait AccessGate: Send + Sync {
    async fn authorize(&self, caller: UserId, target: Target) -> Result<Access, AccessError>;
}
