//! Table mappings for positioned entities
//!
//! Everything the generic SQLite code needs to know about a positioned
//! table: its name, its scope column, how a scope resolves to a container and
//! how rows map to entities.

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::{Column, ColumnDraft, ItemId, Position, Positioned, ScopeId, Task, TaskDraft};

pub trait Table: Positioned {
    const TABLE: &'static str;
    const SCOPE_COLUMN: &'static str;

    /// Returns the container of the scope bound to `?1`, no row if missing.
    /// Two scopes are compatible only when they share a container.
    const CONTAINER_SQL: &'static str;

    /// Column list read by `from_row`
    const COLUMNS: &'static str;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    fn insert(
        conn: &Connection,
        scope: ScopeId,
        position: Position,
        draft: &Self::Draft,
        now: i64,
    ) -> rusqlite::Result<Self>;

    fn find(conn: &Connection, id: ItemId) -> rusqlite::Result<Option<Self>> {
        let sql = format!("SELECT {} FROM {} WHERE id = ?1", Self::COLUMNS, Self::TABLE);
        conn.query_row(&sql, params![id], Self::from_row).optional()
    }

    /// Entities of one scope in display order
    fn list_in(conn: &Connection, scope: ScopeId) -> rusqlite::Result<Vec<Self>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?1 ORDER BY position, id",
            Self::COLUMNS,
            Self::TABLE,
            Self::SCOPE_COLUMN
        );
        let mut stmt = conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(params![scope], Self::from_row)?;
        rows.collect()
    }
}

impl Table for Column {
    const TABLE: &'static str = "board_columns";
    const SCOPE_COLUMN: &'static str = "board_id";
    // A board is its own container: columns never change boards
    const CONTAINER_SQL: &'static str = "SELECT id FROM boards WHERE id = ?1";
    const COLUMNS: &'static str = "id, board_id, name, position, created_at, updated_at";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Column {
            id: row.get(0)?,
            board_id: row.get(1)?,
            name: row.get(2)?,
            position: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }

    fn insert(
        conn: &Connection,
        scope: ScopeId,
        position: Position,
        draft: &ColumnDraft,
        now: i64,
    ) -> rusqlite::Result<Self> {
        conn.execute(
            "INSERT INTO board_columns (board_id, name, position, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![scope, draft.name, position, now],
        )?;

        Ok(Column {
            id: conn.last_insert_rowid(),
            board_id: scope,
            name: draft.name.clone(),
            position,
            created_at: now,
            updated_at: now,
        })
    }
}

impl Table for Task {
    const TABLE: &'static str = "tasks";
    const SCOPE_COLUMN: &'static str = "column_id";
    const CONTAINER_SQL: &'static str = "SELECT board_id FROM board_columns WHERE id = ?1";
    const COLUMNS: &'static str = "id, column_id, board_id, title, description, priority, \
         assignee_id, due_date, created_by, position, created_at, updated_at";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Task {
            id: row.get(0)?,
            column_id: row.get(1)?,
            board_id: row.get(2)?,
            title: row.get(3)?,
            description: row.get(4)?,
            priority: row.get(5)?,
            assignee_id: row.get(6)?,
            due_date: row.get(7)?,
            created_by: row.get(8)?,
            position: row.get(9)?,
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
        })
    }

    fn insert(
        conn: &Connection,
        scope: ScopeId,
        position: Position,
        draft: &TaskDraft,
        now: i64,
    ) -> rusqlite::Result<Self> {
        let board_id: i64 = conn.query_row(Self::CONTAINER_SQL, params![scope], |row| row.get(0))?;

        conn.execute(
            "INSERT INTO tasks (column_id, board_id, title, description, priority, created_by, position, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6, ?7, ?7)",
            params![scope, board_id, draft.title, draft.description, draft.created_by, position, now],
        )?;

        Ok(Task {
            id: conn.last_insert_rowid(),
            column_id: scope,
            board_id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            priority: 0,
            assignee_id: None,
            due_date: None,
            created_by: draft.created_by,
            position,
            created_at: now,
            updated_at: now,
        })
    }
}
