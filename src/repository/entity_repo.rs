//! Positioned Entity Repository
//!
//! SQLite-backed `Repository` and `ScopedRepository` for any `Table`.
//! Column and task specific updates live in their own modules.

use std::marker::PhantomData;

use async_trait::async_trait;

use crate::domain::{ItemId, OrderResult, ScopeId, Subject};

use super::store::{store_error, SqliteStore};
use super::table::Table;
use super::traits::{Repository, ScopedRepository};

pub struct EntityRepository<K> {
    pub(super) store: SqliteStore,
    _kind: PhantomData<fn() -> K>,
}

impl<K: Table> EntityRepository<K> {
    pub fn new(store: SqliteStore) -> Self {
        Self {
            store,
            _kind: PhantomData,
        }
    }
}

impl<K> Clone for EntityRepository<K> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _kind: PhantomData,
        }
    }
}

#[async_trait]
impl<K: Table> Repository<K> for EntityRepository<K> {
    async fn find_by_id(&self, id: ItemId) -> OrderResult<Option<K>> {
        let subject = Subject::new(K::KIND, id);
        self.store
            .read(subject, move |conn| {
                K::find(conn, id).map_err(|e| store_error(subject, e))
            })
            .await
    }
}

#[async_trait]
impl<K: Table> ScopedRepository<K> for EntityRepository<K> {
    async fn list_in(&self, scope: ScopeId) -> OrderResult<Vec<K>> {
        let subject = Subject::new(K::SCOPE_KIND, scope);
        self.store
            .read(subject, move |conn| {
                K::list_in(conn, scope).map_err(|e| store_error(subject, e))
            })
            .await
    }
}
