//! Application state shared across commands

use std::sync::Arc;

use tracing::info;

use crate::access::{AccessGate, MembershipGate};
use crate::config::Config;
use crate::domain::{Column, OrderResult, Task};
use crate::ordering::{EngineOptions, OrderingEngine};
use crate::repository::{BoardRepository, ColumnRepository, SqliteStore, TaskRepository};

pub struct AppState {
    pub store: SqliteStore,
    pub boards: BoardRepository,
    pub column_repo: ColumnRepository,
    pub task_repo: TaskRepository,
    pub columns: OrderingEngine<Column, SqliteStore>,
    pub tasks: OrderingEngine<Task, SqliteStore>,
    pub gate: Arc<dyn AccessGate>,
}

impl AppState {
    /// Open the configured database and wire everything on top of it
    pub fn open(config: &Config) -> OrderResult<Self> {
        let store = SqliteStore::open(
            &config.database.path,
            config.busy_timeout(),
            config.lock_timeout(),
        )?;
        info!(path = %config.database.path.display(), "database ready");
        Ok(Self::with_store(store, config.engine_options()))
    }

    /// Wire repositories, engines and the membership gate over `store`
    pub fn with_store(store: SqliteStore, options: EngineOptions) -> Self {
        let gate = Arc::new(MembershipGate::new(store.clone()));
        Self::with_gate(store, options, gate)
    }

    /// Same as `with_store` with a caller-provided gate
    pub fn with_gate(store: SqliteStore, options: EngineOptions, gate: Arc<dyn AccessGate>) -> Self {
        Self {
            boards: BoardRepository::new(store.clone()),
            column_repo: ColumnRepository::new(store.clone()),
            task_repo: TaskRepository::new(store.clone()),
            columns: OrderingEngine::new(store.clone(), options),
            tasks: OrderingEngine::new(store.clone(), options),
            gate,
            store,
        }
    }
}
