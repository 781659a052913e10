//! Task Entity
//!
//! Tasks are ordered within their column. `board_id` mirrors the column's
//! board so membership checks need a single lookup.

use serde::{Deserialize, Serialize};

use super::entity::{Entity, Positioned};
use super::slot::{BoardId, ColumnId, Position, ScopeId, TaskId, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub column_id: ColumnId,
    pub board_id: BoardId,
    pub title: String,
    pub description: Option<String>,
    pub priority: i32,
    pub assignee_id: Option<UserId>,
    /// Due date as unix milliseconds
    pub due_date: Option<i64>,
    pub created_by: UserId,
    pub position: Position,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Fields for a new task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub created_by: UserId,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, created_by: UserId) -> Self {
        Self {
            title: title.into(),
            description: None,
            created_by,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update of a task's non-ordering fields.
///
/// Outer `None` leaves a field untouched; `Some(None)` clears a nullable one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<i32>,
    pub assignee_id: Option<Option<UserId>>,
    pub due_date: Option<Option<i64>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.assignee_id.is_none()
            && self.due_date.is_none()
    }

    /// Apply the patch to a loaded task
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(assignee_id) = self.assignee_id {
            task.assignee_id = assignee_id;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
    }
}

impl Entity for Task {
    type Id = TaskId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl Positioned for Task {
    type Draft = TaskDraft;

    const KIND: &'static str = "task";
    const SCOPE_KIND: &'static str = "column";

    fn scope_id(&self) -> ScopeId {
        self.column_id
    }

    fn position(&self) -> Position {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Task {
        Task {
            id: 1,
            column_id: 2,
            board_id: 3,
            title: "Write docs".to_string(),
            description: Some("draft".to_string()),
            priority: 1,
            assignee_id: None,
            due_date: None,
            created_by: 9,
            position: 4,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_task_slot() {
        let task = sample();
        let slot = task.slot();
        assert_eq!((slot.id, slot.scope_id, slot.position), (1, 2, 4));
    }

    #[test]
    fn test_patch_leaves_position_alone() {
        let mut task = sample();
        let patch = TaskPatch {
            title: Some("Ship docs".to_string()),
            description: Some(None),
            assignee_id: Some(Some(7)),
            ..Default::default()
        };
        assert!(!patch.is_empty());

        patch.apply_to(&mut task);
        assert_eq!(task.title, "Ship docs");
        assert_eq!(task.description, None);
        assert_eq!(task.assignee_id, Some(7));
        assert_eq!(task.priority, 1);
        assert_eq!(task.position, 4);
    }

    #[test]
    fn test_empty_patch() {
        assert!(TaskPatch::default().is_empty());
    }
}
