//! SQLite store
//!
//! One connection behind an async mutex, shared by the ordering engines and
//! the repositories. Write transactions start with `BEGIN IMMEDIATE` so the
//! SQLite writer lock is held from the first read until commit.

use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row, TransactionBehavior};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, error};

use crate::domain::{
    ItemId, OrderError, OrderResult, Position, ScopeId, ScopeState, Slot, Subject,
};
use crate::ordering::{OrderingStore, ScopeTx, WriteSet};

use super::db::{now_ms, open_connection, MEMORY_PATH};
use super::table::Table;

pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared handle to the database
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    lock_timeout: Duration,
}

impl SqliteStore {
    pub fn new(conn: Connection, lock_timeout: Duration) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            lock_timeout,
        }
    }

    /// Open `path` (or `:memory:`), apply pragmas and migrate
    pub fn open(path: &Path, busy_timeout: Duration, lock_timeout: Duration) -> OrderResult<Self> {
        let conn = open_connection(path, busy_timeout).map_err(|e| {
            error!(path = %path.display(), error = %e, "failed to open database");
            OrderError::unavailable(format!("open {}: {}", path.display(), e))
        })?;
        Ok(Self::new(conn, lock_timeout))
    }

    pub fn in_memory() -> OrderResult<Self> {
        Self::open(Path::new(MEMORY_PATH), DEFAULT_BUSY_TIMEOUT, DEFAULT_LOCK_TIMEOUT)
    }

    async fn lock(&self, subject: Subject) -> OrderResult<MutexGuard<'_, Connection>> {
        match tokio::time::timeout(self.lock_timeout, self.conn.lock()).await {
            Ok(guard) => Ok(guard),
            Err(_) => {
                debug!(%subject, timeout = ?self.lock_timeout, "timed out waiting for connection");
                Err(OrderError::contended(subject))
            }
        }
    }

    /// Run `work` in an immediate transaction
    pub async fn write<T, F>(&self, subject: Subject, work: F) -> OrderResult<T>
    where
        T: Send,
        F: FnOnce(&Connection) -> OrderResult<T> + Send,
    {
        let mut conn = self.lock(subject).await?;
        run_in_transaction(&mut conn, TransactionBehavior::Immediate, subject, work)
    }

    /// Run `work` in a deferred transaction, so all reads see one snapshot
    pub async fn read<T, F>(&self, subject: Subject, work: F) -> OrderResult<T>
    where
        T: Send,
        F: FnOnce(&Connection) -> OrderResult<T> + Send,
    {
        let mut conn = self.lock(subject).await?;
        run_in_transaction(&mut conn, TransactionBehavior::Deferred, subject, work)
    }
}

fn run_in_transaction<T>(
    conn: &mut Connection,
    behavior: TransactionBehavior,
    subject: Subject,
    work: impl FnOnce(&Connection) -> OrderResult<T>,
) -> OrderResult<T> {
    let tx = conn
        .transaction_with_behavior(behavior)
        .map_err(|e| store_error(subject, e))?;
    // Dropping `tx` on the error path rolls back
    let value = work(&tx)?;
    tx.commit().map_err(|e| store_error(subject, e))?;
    Ok(value)
}

/// Map a SQLite failure onto the ordering error taxonomy
pub(crate) fn store_error(subject: Subject, err: rusqlite::Error) -> OrderError {
    match err.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
            OrderError::contended(subject)
        }
        _ => {
            error!(%subject, error = %err, "store failure");
            OrderError::unavailable(err.to_string())
        }
    }
}

fn slot_from_row(row: &Row<'_>) -> rusqlite::Result<Slot> {
    Ok(Slot::new(row.get(0)?, row.get(1)?, row.get(2)?))
}

/// `ScopeTx` over an open transaction
pub(crate) struct SqliteTx<'c, K> {
    conn: &'c Connection,
    subject: Subject,
    _kind: PhantomData<fn() -> K>,
}

impl<'c, K: Table> SqliteTx<'c, K> {
    pub(crate) fn new(conn: &'c Connection, subject: Subject) -> Self {
        Self {
            conn,
            subject,
            _kind: PhantomData,
        }
    }

    fn fail(&self, err: rusqlite::Error) -> OrderError {
        store_error(self.subject, err)
    }
}

impl<K: Table> ScopeTx<K> for SqliteTx<'_, K> {
    fn get_item(&self, id: ItemId) -> OrderResult<Option<Slot>> {
        let sql = format!(
            "SELECT id, {}, position FROM {} WHERE id = ?1",
            K::SCOPE_COLUMN,
            K::TABLE
        );
        self.conn
            .query_row(&sql, params![id], slot_from_row)
            .optional()
            .map_err(|e| self.fail(e))
    }

    fn list_scope(&self, scope: ScopeId) -> OrderResult<ScopeState> {
        let sql = format!(
            "SELECT id, {scope}, position FROM {table} WHERE {scope} = ?1 ORDER BY position, id",
            scope = K::SCOPE_COLUMN,
            table = K::TABLE
        );
        let mut stmt = self.conn.prepare_cached(&sql).map_err(|e| self.fail(e))?;
        let items = stmt
            .query_map(params![scope], slot_from_row)
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(|e| self.fail(e))?;
        Ok(ScopeState::new(scope, items))
    }

    fn count_scope(&self, scope: ScopeId) -> OrderResult<usize> {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE {} = ?1", K::TABLE, K::SCOPE_COLUMN);
        let count: i64 = self
            .conn
            .query_row(&sql, params![scope], |row| row.get(0))
            .map_err(|e| self.fail(e))?;
        Ok(count as usize)
    }

    fn scope_container(&self, scope: ScopeId) -> OrderResult<Option<i64>> {
        self.conn
            .query_row(K::CONTAINER_SQL, params![scope], |row| row.get(0))
            .optional()
            .map_err(|e| self.fail(e))
    }

    fn apply(&self, writes: &WriteSet) -> OrderResult<()> {
        if let Some(id) = writes.delete {
            let sql = format!("DELETE FROM {} WHERE id = ?1", K::TABLE);
            let deleted = self
                .conn
                .execute(&sql, params![id])
                .map_err(|e| self.fail(e))?;
            if deleted == 0 {
                return Err(OrderError::not_found(K::KIND, id));
            }
        }

        if writes.writes.is_empty() {
            return Ok(());
        }

        let now = now_ms();
        let sql = format!(
            "UPDATE {} SET {} = ?1, position = ?2, updated_at = ?3 WHERE id = ?4",
            K::TABLE,
            K::SCOPE_COLUMN
        );
        let mut stmt = self.conn.prepare_cached(&sql).map_err(|e| self.fail(e))?;
        for slot in &writes.writes {
            let changed = stmt
                .execute(params![slot.scope_id, slot.position, now, slot.id])
                .map_err(|e| self.fail(e))?;
            if changed == 0 {
                return Err(OrderError::not_found(K::KIND, slot.id));
            }
        }
        Ok(())
    }

    fn insert(&self, scope: ScopeId, position: Position, draft: &K::Draft) -> OrderResult<K> {
        K::insert(self.conn, scope, position, draft, now_ms()).map_err(|e| self.fail(e))
    }

    fn load(&self, id: ItemId) -> OrderResult<Option<K>> {
        K::find(self.conn, id).map_err(|e| self.fail(e))
    }
}

#[async_trait]
impl<K: Table> OrderingStore<K> for SqliteStore {
    async fn transact<T, F>(&self, subject: Subject, work: F) -> OrderResult<T>
    where
        T: Send,
        F: FnOnce(&dyn ScopeTx<K>) -> OrderResult<T> + Send,
    {
        self.write(subject, move |conn| work(&SqliteTx::<K>::new(conn, subject)))
            .await
    }

    async fn inspect<T, F>(&self, subject: Subject, work: F) -> OrderResult<T>
    where
        T: Send,
        F: FnOnce(&dyn ScopeTx<K>) -> OrderResult<T> + Send,
    {
        self.read(subject, move |conn| work(&SqliteTx::<K>::new(conn, subject)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Column;

    #[tokio::test]
    async fn test_write_rolls_back_on_error() {
        let store = SqliteStore::in_memory().unwrap();
        let subject = Subject::new("board", 1);

        let result: OrderResult<()> = store
            .write(subject, |conn| {
                conn.execute(
                    "INSERT INTO boards (name, owner_id, created_at) VALUES ('a', 1, 0)",
                    [],
                )
                .map_err(|e| store_error(subject, e))?;
                Err(OrderError::unavailable("abort"))
            })
            .await;
        assert!(result.is_err());

        let count: i64 = store
            .read(subject, |conn| {
                conn.query_row("SELECT COUNT(*) FROM boards", [], |row| row.get(0))
                    .map_err(|e| store_error(subject, e))
            })
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_missing_scope_has_no_container() {
        let store = SqliteStore::in_memory().unwrap();
        let container = OrderingStore::<Column>::inspect(&store, Subject::new("board", 9), |tx| {
            tx.scope_container(9)
        })
        .await
        .unwrap();
        assert_eq!(container, None);
    }

    #[test]
    fn test_busy_maps_to_contended() {
        let subject = Subject::new("column", 2);
        let busy = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        );
        assert_eq!(store_error(subject, busy), OrderError::contended(subject));

        let other = rusqlite::Error::InvalidQuery;
        assert!(matches!(
            store_error(subject, other),
            OrderError::Unavailable { .. }
        ));
    }
}
