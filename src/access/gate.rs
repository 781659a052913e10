//! Membership-based gate over SQLite

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;

use crate::domain::{BoardId, OrderResult, Role, UserId};
use crate::repository::{store_error, SqliteStore};

use super::{Access, AccessError, AccessGate, Target};

#[derive(Clone)]
pub struct MembershipGate {
    store: SqliteStore,
}

impl MembershipGate {
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }
}

fn board_of(conn: &Connection, target: Target) -> rusqlite::Result<Option<BoardId>> {
    let (sql, id) = match target {
        Target::Board(id) => ("SELECT id FROM boards WHERE id = ?1", id),
        Target::Column(id) => ("SELECT board_id FROM board_columns WHERE id = ?1", id),
        Target::Task(id) => ("SELECT board_id FROM tasks WHERE id = ?1", id),
    };
    conn.query_row(sql, params![id], |row| row.get(0)).optional()
}

fn role_on(conn: &Connection, board_id: BoardId, user: UserId) -> rusqlite::Result<Option<Role>> {
    let owner: UserId = conn.query_row(
        "SELECT owner_id FROM boards WHERE id = ?1",
        params![board_id],
        |row| row.get(0),
    )?;
    if owner == user {
        return Ok(Some(Role::Owner));
    }

    let role: Option<String> = conn
        .query_row(
            "SELECT role FROM board_members WHERE board_id = ?1 AND user_id = ?2",
            params![board_id, user],
            |row| row.get(0),
        )
        .optional()?;
    Ok(role.map(|role| Role::from_str(&role)))
}

#[async_trait]
impl AccessGate for MembershipGate {
    async fn authorize(&self, caller: UserId, target: Target) -> Result<Access, AccessError> {
        let subject = target.subject();
        let resolved: OrderResult<Option<(BoardId, Option<Role>)>> = self
            .store
            .read(subject, move |conn| {
                let lookup = || -> rusqlite::Result<_> {
                    let Some(board_id) = board_of(conn, target)? else {
                        return Ok(None);
                    };
                    Ok(Some((board_id, role_on(conn, board_id, caller)?)))
                };
                lookup().map_err(|e| store_error(subject, e))
            })
            .await;

        match resolved? {
            None => Err(AccessError::NotFound(subject)),
            Some((board_id, Some(role))) => Ok(Access { board_id, role }),
            Some((board_id, None)) => {
                warn!(user = caller, board_id, %subject, "access denied");
                Err(AccessError::Forbidden {
                    user: caller,
                    board_id,
                })
            }
        }
    }
}
