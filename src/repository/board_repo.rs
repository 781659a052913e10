//! Board Repository
//!
//! Boards, memberships and the nested board view.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::{
    Board, BoardId, BoardView, Column, ColumnView, Membership, OrderError, OrderResult, Role,
    Subject, Task, UserId,
};

use super::db::now_ms;
use super::store::{store_error, SqliteStore};
use super::table::Table;
use super::traits::Repository;

const BOARD: &str = "board";

#[derive(Clone)]
pub struct BoardRepository {
    store: SqliteStore,
}

fn row_to_board(row: &Row<'_>) -> rusqlite::Result<Board> {
    Ok(Board {
        id: row.get(0)?,
        name: row.get(1)?,
        owner_id: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn list_members(conn: &Connection, board_id: BoardId) -> rusqlite::Result<Vec<Membership>> {
    let mut stmt = conn.prepare_cached(
        "SELECT user_id, role FROM board_members WHERE board_id = ?1 ORDER BY user_id",
    )?;
    let members = stmt
        .query_map(params![board_id], |row| {
            let role: String = row.get(1)?;
            Ok(Membership {
                user_id: row.get(0)?,
                role: Role::from_str(&role),
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(members)
}

fn find_board(conn: &Connection, id: BoardId) -> rusqlite::Result<Option<Board>> {
    conn.query_row(
        "SELECT id, name, owner_id, created_at FROM boards WHERE id = ?1",
        params![id],
        row_to_board,
    )
    .optional()
}

impl BoardRepository {
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }

    /// Create a board and record its owner as a member
    pub async fn create(&self, owner_id: UserId, name: String) -> OrderResult<Board> {
        let subject = Subject::new("user", owner_id);
        self.store
            .write(subject, move |conn| {
                let created_at = now_ms();
                conn.execute(
                    "INSERT INTO boards (name, owner_id, created_at) VALUES (?1, ?2, ?3)",
                    params![name, owner_id, created_at],
                )
                .map_err(|e| store_error(subject, e))?;
                let id = conn.last_insert_rowid();

                conn.execute(
                    "INSERT INTO board_members (board_id, user_id, role) VALUES (?1, ?2, ?3)",
                    params![id, owner_id, Role::Owner.as_str()],
                )
                .map_err(|e| store_error(subject, e))?;

                Ok(Board {
                    id,
                    name,
                    owner_id,
                    created_at,
                })
            })
            .await
    }

    /// Boards the user owns or is a member of, oldest first
    pub async fn list_for_user(&self, user_id: UserId) -> OrderResult<Vec<Board>> {
        let subject = Subject::new("user", user_id);
        self.store
            .read(subject, move |conn| {
                let mut stmt = conn
                    .prepare_cached(
                        "SELECT b.id, b.name, b.owner_id, b.created_at FROM boards b
                         WHERE b.owner_id = ?1
                            OR EXISTS (SELECT 1 FROM board_members m WHERE m.board_id = b.id AND m.user_id = ?1)
                         ORDER BY b.id",
                    )
                    .map_err(|e| store_error(subject, e))?;
                let boards = stmt
                    .query_map(params![user_id], row_to_board)
                    .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
                    .map_err(|e| store_error(subject, e))?;
                Ok(boards)
            })
            .await
    }

    /// Delete a board; its columns, tasks and memberships cascade
    pub async fn delete(&self, id: BoardId) -> OrderResult<()> {
        let subject = Subject::new(BOARD, id);
        self.store
            .write(subject, move |conn| {
                let deleted = conn
                    .execute("DELETE FROM boards WHERE id = ?1", params![id])
                    .map_err(|e| store_error(subject, e))?;
                if deleted == 0 {
                    return Err(OrderError::NotFound { subject });
                }
                Ok(())
            })
            .await
    }

    /// Add a member or change an existing member's role
    pub async fn add_member(&self, board_id: BoardId, user_id: UserId, role: Role) -> OrderResult<()> {
        let subject = Subject::new(BOARD, board_id);
        self.store
            .write(subject, move |conn| {
                if find_board(conn, board_id)
                    .map_err(|e| store_error(subject, e))?
                    .is_none()
                {
                    return Err(OrderError::NotFound { subject });
                }

                conn.execute(
                    "INSERT INTO board_members (board_id, user_id, role) VALUES (?1, ?2, ?3)
                     ON CONFLICT(board_id, user_id) DO UPDATE SET role = excluded.role",
                    params![board_id, user_id, role.as_str()],
                )
                .map_err(|e| store_error(subject, e))?;
                Ok(())
            })
            .await
    }

    /// The board with its members, columns and tasks, read in one transaction
    pub async fn load_view(&self, board_id: BoardId, role: Role) -> OrderResult<BoardView> {
        let subject = Subject::new(BOARD, board_id);
        self.store
            .read(subject, move |conn| {
                let fail = |e: rusqlite::Error| store_error(subject, e);
                let board = find_board(conn, board_id)
                    .map_err(fail)?
                    .ok_or(OrderError::NotFound { subject })?;
                let members = list_members(conn, board_id).map_err(fail)?;

                let columns = Column::list_in(conn, board_id)
                    .map_err(fail)?
                    .into_iter()
                    .map(|column| -> OrderResult<ColumnView> {
                        let tasks = Task::list_in(conn, column.id).map_err(fail)?;
                        Ok(ColumnView { column, tasks })
                    })
                    .collect::<OrderResult<Vec<_>>>()?;

                Ok(BoardView {
                    board,
                    role,
                    members,
                    columns,
                })
            })
            .await
    }
}

#[async_trait]
impl Repository<Board> for BoardRepository {
    async fn find_by_id(&self, id: BoardId) -> OrderResult<Option<Board>> {
        let subject = Subject::new(BOARD, id);
        self.store
            .read(subject, move |conn| {
                find_board(conn, id).map_err(|e| store_error(subject, e))
            })
            .await
    }
}
