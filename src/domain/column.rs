//! Column Entity
//!
//! Columns are ordered within their board.

use serde::{Deserialize, Serialize};

use super::entity::{Entity, Positioned};
use super::slot::{BoardId, ColumnId, Position, ScopeId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub board_id: BoardId,
    pub name: String,
    pub position: Position,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Fields for a new column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDraft {
    pub name: String,
}

impl ColumnDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Entity for Column {
    type Id = ColumnId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl Positioned for Column {
    type Draft = ColumnDraft;

    const KIND: &'static str = "column";
    const SCOPE_KIND: &'static str = "board";

    fn scope_id(&self) -> ScopeId {
        self.board_id
    }

    fn position(&self) -> Position {
        self.position
    }
}
