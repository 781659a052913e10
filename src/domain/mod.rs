//! Domain Layer
//!
//! Contains all domain entities and core abstractions.
//! This layer has NO storage dependencies.

mod board;
mod column;
mod entity;
mod error;
mod slot;
mod task;

pub use board::{Board, BoardView, ColumnView, Membership, Role};
pub use column::{Column, ColumnDraft};
pub use entity::{Entity, Positioned};
pub use error::{
    ConflictReason, ErrorKind, OrderError, OrderResult, PermutationMismatch, TargetReason,
};
pub use slot::{
    BoardId, ColumnId, ItemId, Position, ScopeId, ScopeState, Slot, Subject, TaskId, UserId,
};
pub use task::{Task, TaskDraft, TaskPatch};
