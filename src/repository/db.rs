//! Database Connection and Setup
//!
//! Opens SQLite connections and runs migrations.

use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Path that selects a private in-memory database
pub const MEMORY_PATH: &str = ":memory:";

/// Current time as unix milliseconds
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Open a connection with pragmas applied and the schema migrated
pub fn open_connection(path: &Path, busy_timeout: Duration) -> rusqlite::Result<Connection> {
    let in_memory = path == Path::new(MEMORY_PATH);
    let conn = if in_memory {
        Connection::open_in_memory()?
    } else {
        Connection::open(path)?
    };

    conn.busy_timeout(busy_timeout)?;
    conn.pragma_update(None, "foreign_keys", true)?;

    if !in_memory {
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!(path = %path.display(), mode, "opened database");
    }

    run_migrations(&conn)?;
    Ok(conn)
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> rusqlite::Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
    for name in names {
        if name? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Run database migrations
pub fn run_migrations(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS boards (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            owner_id INTEGER NOT NULL,
            created_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS board_members (
            board_id INTEGER NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
            user_id INTEGER NOT NULL,
            role TEXT NOT NULL DEFAULT 'member',
            PRIMARY KEY (board_id, user_id)
        );

        CREATE TABLE IF NOT EXISTS board_columns (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            board_id INTEGER NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            position INTEGER NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            column_id INTEGER NOT NULL REFERENCES board_columns(id) ON DELETE CASCADE,
            board_id INTEGER NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            description TEXT,
            priority INTEGER NOT NULL DEFAULT 0,
            created_by INTEGER NOT NULL,
            position INTEGER NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_board_members_user ON board_members(user_id);
        CREATE INDEX IF NOT EXISTS idx_board_columns_board ON board_columns(board_id, position);
        CREATE INDEX IF NOT EXISTS idx_tasks_column ON tasks(column_id, position);
        CREATE INDEX IF NOT EXISTS idx_tasks_board ON tasks(board_id);",
    )?;

    // Assignment and due dates arrived after the first schema
    if !column_exists(conn, "tasks", "assignee_id")? {
        conn.execute("ALTER TABLE tasks ADD COLUMN assignee_id INTEGER", [])?;
    }

    if !column_exists(conn, "tasks", "due_date")? {
        conn.execute("ALTER TABLE tasks ADD COLUMN due_date INTEGER", [])?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = open_connection(Path::new(MEMORY_PATH), Duration::from_millis(100)).unwrap();
        run_migrations(&conn).unwrap();

        assert!(column_exists(&conn, "tasks", "due_date").unwrap());
        assert!(column_exists(&conn, "tasks", "assignee_id").unwrap());
        assert!(!column_exists(&conn, "tasks", "missing").unwrap());
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let conn = open_connection(Path::new(MEMORY_PATH), Duration::from_millis(100)).unwrap();
        let enabled: bool = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert!(enabled);
    }
}
