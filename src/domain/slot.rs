//! Slots and scope snapshots
//!
//! The ordering engine sees every positioned entity as a `Slot`: an id, the
//! scope it belongs to and its position there.

use serde::{Deserialize, Serialize};
use std::fmt;

pub type ItemId = i64;
pub type ScopeId = i64;
pub type Position = i64;
pub type UserId = i64;
pub type BoardId = i64;
pub type ColumnId = i64;
pub type TaskId = i64;

/// Placement of one item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub id: ItemId,
    pub scope_id: ScopeId,
    pub position: Position,
}

impl Slot {
    pub fn new(id: ItemId, scope_id: ScopeId, position: Position) -> Self {
        Self {
            id,
            scope_id,
            position,
        }
    }
}

/// All items of one scope in display order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeState {
    pub scope_id: ScopeId,
    pub items: Vec<Slot>,
}

impl ScopeState {
    /// Build a snapshot, sorting by `(position, id)`
    pub fn new(scope_id: ScopeId, mut items: Vec<Slot>) -> Self {
        items.sort_by_key(|slot| (slot.position, slot.id));
        Self { scope_id, items }
    }

    pub fn empty(scope_id: ScopeId) -> Self {
        Self {
            scope_id,
            items: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item ids in display order
    pub fn ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|slot| slot.id).collect()
    }

    /// Display rank of an item, which equals its position on a dense scope
    pub fn rank_of(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|slot| slot.id == id)
    }

    pub fn get(&self, id: ItemId) -> Option<&Slot> {
        self.items.iter().find(|slot| slot.id == id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.get(id).is_some()
    }
}

/// A named reference to an item or scope, used in errors and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Subject {
    pub kind: &'static str,
    pub id: i64,
}

impl Subject {
    pub fn new(kind: &'static str, id: i64) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_state_sorts_by_position_then_id() {
        let state = ScopeState::new(
            1,
            vec![Slot::new(30, 1, 2), Slot::new(10, 1, 0), Slot::new(5, 1, 2)],
        );
        assert_eq!(state.ids(), vec![10, 5, 30]);
        assert_eq!(state.rank_of(30), Some(2));
        assert_eq!(state.rank_of(99), None);
    }

    #[test]
    fn test_subject_display() {
        assert_eq!(Subject::new("column", 7).to_string(), "column 7");
    }
}
