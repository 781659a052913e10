//! Commands for Task operations

use crate::access::Target;
use crate::domain::{ColumnId, Position, Task, TaskDraft, TaskId, TaskPatch, UserId};
use crate::ordering::Outcome;
use crate::AppState;

use super::{validate_name, validate_priority, CommandResult};

/// Append a task to the end of a column
pub async fn create_task(
    state: &AppState,
    caller: UserId,
    column_id: ColumnId,
    title: String,
    description: Option<String>,
) -> CommandResult<Task> {
    let title = validate_name("title", &title)?;
    state.gate.authorize(caller, Target::Column(column_id)).await?;

    let mut draft = TaskDraft::new(title, caller);
    if let Some(description) = description.filter(|d| !d.trim().is_empty()) {
        draft = draft.with_description(description);
    }
    Ok(state.tasks.append(column_id, draft).await?)
}

/// Edit task fields; column and position stay as they are
pub async fn update_task(
    state: &AppState,
    caller: UserId,
    task_id: TaskId,
    mut patch: TaskPatch,
) -> CommandResult<Task> {
    if let Some(title) = &patch.title {
        patch.title = Some(validate_name("title", title)?);
    }
    if let Some(priority) = patch.priority {
        validate_priority(priority)?;
    }
    state.gate.authorize(caller, Target::Task(task_id)).await?;
    Ok(state.task_repo.update(task_id, patch).await?)
}

/// Move a task to `to_position` in `to_column`, from wherever it is now
pub async fn move_task(
    state: &AppState,
    caller: UserId,
    task_id: TaskId,
    to_column: ColumnId,
    to_position: Position,
) -> CommandResult<Outcome> {
    state.gate.authorize(caller, Target::Task(task_id)).await?;
    state.gate.authorize(caller, Target::Column(to_column)).await?;
    Ok(state.tasks.relocate(task_id, to_column, to_position).await?)
}

/// Put a column's tasks in exactly the given order
pub async fn reorder_tasks(
    state: &AppState,
    caller: UserId,
    column_id: ColumnId,
    ordered: Vec<TaskId>,
) -> CommandResult<Outcome> {
    state.gate.authorize(caller, Target::Column(column_id)).await?;
    Ok(state.tasks.reorder(column_id, &ordered).await?)
}

/// Delete a task and close the gap in its column
pub async fn delete_task(state: &AppState, caller: UserId, task_id: TaskId) -> CommandResult<Outcome> {
    state.gate.authorize(caller, Target::Task(task_id)).await?;
    Ok(state.tasks.remove(task_id).await?)
}
