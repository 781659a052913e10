//! Durable store seam
//!
//! The engine reads and writes through `ScopeTx`, which is only reachable
//! inside a transaction opened by `OrderingStore`. Everything one closure does
//! commits together or not at all.

use async_trait::async_trait;

use crate::domain::{
    ItemId, OrderResult, Position, Positioned, ScopeId, ScopeState, Slot, Subject,
};

use super::plan::WriteSet;

/// Reads and writes inside one open transaction
pub trait ScopeTx<K: Positioned> {
    /// Current slot of an item
    fn get_item(&self, id: ItemId) -> OrderResult<Option<Slot>>;

    /// All items of a scope in display order
    fn list_scope(&self, scope: ScopeId) -> OrderResult<ScopeState>;

    fn count_scope(&self, scope: ScopeId) -> OrderResult<usize>;

    /// Container the scope hangs off, `None` when the scope does not exist.
    ///
    /// Scopes with different containers are not valid targets for each other.
    fn scope_container(&self, scope: ScopeId) -> OrderResult<Option<i64>>;

    /// Apply every write and the optional delete
    fn apply(&self, writes: &WriteSet) -> OrderResult<()>;

    /// Insert a new row at `position`
    fn insert(&self, scope: ScopeId, position: Position, draft: &K::Draft) -> OrderResult<K>;

    /// Load the full entity
    fn load(&self, id: ItemId) -> OrderResult<Option<K>>;
}

/// Opens transactions for the ordering engine
#[async_trait]
pub trait OrderingStore<K: Positioned>: Send + Sync {
    /// Run `work` in a write transaction that also covers its reads.
    ///
    /// Commits when `work` returns `Ok`, rolls back otherwise. Contention is
    /// reported as a conflict on `subject`.
    async fn transact<T, F>(&self, subject: Subject, work: F) -> OrderResult<T>
    where
        T: Send,
        F: FnOnce(&dyn ScopeTx<K>) -> OrderResult<T> + Send;

    /// Run `work` in a read-only transaction
    async fn inspect<T, F>(&self, subject: Subject, work: F) -> OrderResult<T>
    where
        T: Send,
        F: FnOnce(&dyn ScopeTx<K>) -> OrderResult<T> + Send;
}
