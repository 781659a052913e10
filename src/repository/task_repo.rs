//! Task Repository
//!
//! Non-positional task updates.

use rusqlite::params;

use crate::domain::{OrderError, OrderResult, Positioned, Subject, Task, TaskId, TaskPatch};

use super::db::now_ms;
use super::entity_repo::EntityRepository;
use super::store::store_error;
use super::table::Table;

pub type TaskRepository = EntityRepository<Task>;

impl EntityRepository<Task> {
    /// Apply `patch` to a task. Column and position never change here.
    pub async fn update(&self, id: TaskId, patch: TaskPatch) -> OrderResult<Task> {
        let subject = Subject::new(Task::KIND, id);
        self.store
            .write(subject, move |conn| {
                let mut task = Task::find(conn, id)
                    .map_err(|e| store_error(subject, e))?
                    .ok_or(OrderError::NotFound { subject })?;
                if patch.is_empty() {
                    return Ok(task);
                }

                patch.apply_to(&mut task);
                task.updated_at = now_ms();
                conn.execute(
                    "UPDATE tasks SET title = ?1, description = ?2, priority = ?3, assignee_id = ?4,
                        due_date = ?5, updated_at = ?6
                     WHERE id = ?7",
                    params![
                        task.title,
                        task.description,
                        task.priority,
                        task.assignee_id,
                        task.due_date,
                        task.updated_at,
                        task.id
                    ],
                )
                .map_err(|e| store_error(subject, e))?;
                Ok(task)
            })
            .await
    }
}
