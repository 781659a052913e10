//! Board Entity
//!
//! Boards own an ordered set of columns and a list of members.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::column::Column;
use super::entity::Entity;
use super::slot::{BoardId, UserId};
use super::task::Task;

/// Membership role on a board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    #[default]
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Member => "member",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "owner" => Role::Owner,
            "member" => Role::Member,
            other => {
                warn!(role = other, "unknown role, treating as member");
                Role::Member
            }
        }
    }
}

/// A board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub name: String,
    pub owner_id: UserId,
    pub created_at: i64,
}

impl Entity for Board {
    type Id = BoardId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// A column together with its tasks in display order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnView {
    #[serde(flatten)]
    pub column: Column,
    pub tasks: Vec<Task>,
}

/// One user's membership on a board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub user_id: UserId,
    pub role: Role,
}

/// A board with its columns and tasks in display order, as seen by one caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardView {
    pub board: Board,
    pub role: Role,
    pub members: Vec<Membership>,
    pub columns: Vec<ColumnView>,
}
