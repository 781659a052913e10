//! Ordering Engine
//!
//! Keeps positions inside every scope dense (`0..n`, no gaps, no duplicates)
//! across appends, moves, reorders and deletes:
//! - plan: pure write-set computation
//! - engine: transactional execution with retry
//! - store: the transaction seam the engine runs against
//! - invariant: dense-position checks

mod engine;
mod invariant;
pub mod plan;
mod store;


pub use engine::{EngineOptions, OrderingEngine, Outcome, RetryPolicy};
pub use invariant::{check_dense, is_dense};
pub use plan::{Plan, WriteSet};
pub use store::{OrderingStore, ScopeTx};
