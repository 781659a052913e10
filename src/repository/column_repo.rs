//! Column Repository
//!
//! Non-positional column updates.

use rusqlite::params;

use crate::domain::{Column, ColumnId, OrderError, OrderResult, Positioned, Subject};

use super::db::now_ms;
use super::entity_repo::EntityRepository;
use super::store::store_error;
use super::table::Table;

pub type ColumnRepository = EntityRepository<Column>;

impl EntityRepository<Column> {
    /// Rename a column, leaving its position alone
    pub async fn rename(&self, id: ColumnId, name: String) -> OrderResult<Column> {
        let subject = Subject::new(Column::KIND, id);
        self.store
            .write(subject, move |conn| {
                let changed = conn
                    .execute(
                        "UPDATE board_columns SET name = ?1, updated_at = ?2 WHERE id = ?3",
                        params![name, now_ms(), id],
                    )
                    .map_err(|e| store_error(subject, e))?;
                if changed == 0 {
                    return Err(OrderError::NotFound { subject });
                }

                Column::find(conn, id)
                    .map_err(|e| store_error(subject, e))?
                    .ok_or(OrderError::NotFound { subject })
            })
            .await
    }
}
