//! Repository Layer - Core Traits
//!
//! Read access shared by every entity repository. Writes that touch
//! positions go through the ordering engine instead.

use async_trait::async_trait;

use crate::domain::{Entity, OrderResult, Positioned, ScopeId};

/// Lookup by id
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Find entity by ID
    async fn find_by_id(&self, id: T::Id) -> OrderResult<Option<T>>;
}

/// Extension for entities that live in an ordered scope
#[async_trait]
pub trait ScopedRepository<T: Positioned>: Repository<T> {
    /// Entities of one scope in display order
    async fn list_in(&self, scope: ScopeId) -> OrderResult<Vec<T>>;
}
