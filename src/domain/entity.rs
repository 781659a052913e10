//! Domain Layer - Core Entity Traits
//!
//! `Entity` is the basic contract for all domain entities.
//! `Positioned` marks entities that live in an ordering scope, which is all
//! the ordering engine needs to know about them.

use super::slot::{ItemId, Position, ScopeId, Slot};

/// Core trait for all domain entities
pub trait Entity: Sized + Send + Sync + Clone {
    /// The type of the entity's unique identifier
    type Id: Copy + Eq + std::hash::Hash + Send + Sync;

    /// Returns the entity's unique identifier
    fn id(&self) -> Self::Id;
}

/// An entity ordered among the siblings of one parent scope
pub trait Positioned: Entity<Id = ItemId> + 'static {
    /// Fields supplied when appending a new entity to a scope
    type Draft: Send + Sync;

    /// Name of the entity kind, e.g. "task"
    const KIND: &'static str;

    /// Name of the scope kind, e.g. "column"
    const SCOPE_KIND: &'static str;

    /// The scope this entity is ordered in
    fn scope_id(&self) -> ScopeId;

    /// Zero-based position within the scope
    fn position(&self) -> Position;

    fn slot(&self) -> Slot {
        Slot::new(self.id(), self.scope_id(), self.position())
    }
}
