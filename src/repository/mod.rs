//! Repository Layer
//!
//! SQLite storage: connection setup, the ordering store adapter and the
//! entity repositories.

mod board_repo;
mod column_repo;
mod db;
mod entity_repo;
mod store;
mod table;
mod task_repo;
mod traits;

#[cfg(test)]
mod tests;

pub use board_repo::BoardRepository;
pub use column_repo::ColumnRepository;
pub use db::{now_ms, open_connection, run_migrations, MEMORY_PATH};
pub use entity_repo::EntityRepository;
pub(crate) use store::store_error;
pub use store::{SqliteStore, DEFAULT_BUSY_TIMEOUT, DEFAULT_LOCK_TIMEOUT};
pub use table::Table;
pub use task_repo::TaskRepository;
pub use traits::{Repository, ScopedRepository};
