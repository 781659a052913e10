//! Ordering Engine
//!
//! Runs every ordering operation as read, plan and write inside a single
//! store transaction. Contended transactions are retried from scratch, so
//! each attempt plans against fresh state.

use std::marker::PhantomData;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::{
    ConflictReason, ItemId, OrderError, OrderResult, Position, Positioned, ScopeId, ScopeState,
    Slot, Subject, TargetReason,
};

use super::invariant;
use super::plan::{self, item_subject, scope_subject, Plan};
use super::store::{OrderingStore, ScopeTx};

/// How often and how patiently contended operations are retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Single attempt, no retry
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Backoff before attempt `attempt + 1`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(250),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    pub retry: RetryPolicy,
    /// Re-read touched scopes after writing and roll back unless dense
    pub verify_after_write: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            verify_after_write: true,
        }
    }
}

/// Committed result of an ordering operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    /// Final slot of the moved item, or the removed slot after a delete
    pub moved: Option<Slot>,
    /// State of every touched scope after commit
    pub scopes: Vec<ScopeState>,
    /// Number of position writes issued
    pub writes: usize,
}

impl Outcome {
    pub fn scope(&self, scope_id: ScopeId) -> Option<&ScopeState> {
        self.scopes.iter().find(|scope| scope.scope_id == scope_id)
    }
}

/// Ordering engine for one kind of positioned entity
pub struct OrderingEngine<K, S> {
    store: S,
    options: EngineOptions,
    _kind: PhantomData<fn() -> K>,
}

impl<K, S> OrderingEngine<K, S>
where
    K: Positioned,
    S: OrderingStore<K>,
{
    pub fn new(store: S, options: EngineOptions) -> Self {
        Self {
            store,
            options,
            _kind: PhantomData,
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Insert a new entity at the tail of `scope`
    pub async fn append(&self, scope: ScopeId, draft: K::Draft) -> OrderResult<K> {
        let verify = self.options.verify_after_write;
        let entity = self
            .run(scope_subject::<K>(scope), "append", move |tx| {
                ensure_scope(tx, scope)?;
                let (position, writes) = plan::append(&tx.list_scope(scope)?);
                if !writes.is_empty() {
                    warn!(kind = K::SCOPE_KIND, scope, repaired = writes.writes.len(), "repairing gaps before append");
                    tx.apply(&writes)?;
                }
                let entity = tx.insert(scope, position, &draft)?;
                if verify {
                    invariant::verify::<K>(&tx.list_scope(scope)?)?;
                }
                Ok(entity)
            })
            .await?;

        info!(kind = K::KIND, id = entity.id(), scope, position = entity.position(), "appended");
        Ok(entity)
    }

    /// Move `item` from `from` to `to` inside `scope`.
    ///
    /// `from` and `scope` are the caller's view of the item; a mismatch is a
    /// conflict rather than a silent correction.
    pub async fn move_within(
        &self,
        item: ItemId,
        from: Position,
        to: Position,
        scope: ScopeId,
    ) -> OrderResult<Outcome> {
        let verify = self.options.verify_after_write;
        let outcome = self
            .run(item_subject::<K>(item), "move_within", move |tx| {
                let slot = current_slot(tx, item)?;
                if slot.scope_id != scope {
                    return Err(stale_scope::<K>(item, scope, slot.scope_id));
                }
                let state = tx.list_scope(scope)?;
                let plan = plan::move_within::<K>(&state, item, from, to)?;
                commit_plan(tx, plan, verify)
            })
            .await?;

        info!(kind = K::KIND, item, scope, from, to, writes = outcome.writes, "moved within scope");
        Ok(outcome)
    }

    /// Move `item` from `from_scope` into `to_scope` at `to`.
    ///
    /// Both scopes must hang off the same container. With equal scopes this
    /// behaves exactly like `move_within` from the current position.
    pub async fn move_across(
        &self,
        item: ItemId,
        from_scope: ScopeId,
        to_scope: ScopeId,
        to: Position,
    ) -> OrderResult<Outcome> {
        let verify = self.options.verify_after_write;
        let outcome = self
            .run(item_subject::<K>(item), "move_across", move |tx| {
                let slot = current_slot(tx, item)?;
                if slot.scope_id != from_scope {
                    return Err(stale_scope::<K>(item, from_scope, slot.scope_id));
                }
                let plan = plan_relocation(tx, slot, to_scope, to)?;
                commit_plan(tx, plan, verify)
            })
            .await?;

        info!(kind = K::KIND, item, from_scope, to_scope, to, writes = outcome.writes, "moved across scopes");
        Ok(outcome)
    }

    /// Move `item` to `to` in `to_scope` from wherever it currently is
    pub async fn relocate(
        &self,
        item: ItemId,
        to_scope: ScopeId,
        to: Position,
    ) -> OrderResult<Outcome> {
        let verify = self.options.verify_after_write;
        let outcome = self
            .run(item_subject::<K>(item), "relocate", move |tx| {
                let slot = current_slot(tx, item)?;
                let plan = plan_relocation(tx, slot, to_scope, to)?;
                commit_plan(tx, plan, verify)
            })
            .await?;

        info!(kind = K::KIND, item, to_scope, to, writes = outcome.writes, "relocated");
        Ok(outcome)
    }

    /// Give `ordered[k]` position `k`; `ordered` must be a permutation of the scope
    pub async fn reorder(&self, scope: ScopeId, ordered: &[ItemId]) -> OrderResult<Outcome> {
        let verify = self.options.verify_after_write;
        let outcome = self
            .run(scope_subject::<K>(scope), "reorder", move |tx| {
                ensure_scope(tx, scope)?;
                let state = tx.list_scope(scope)?;
                let plan = plan::reorder::<K>(&state, ordered)?;
                commit_plan(tx, plan, verify)
            })
            .await?;

        info!(kind = K::SCOPE_KIND, scope, writes = outcome.writes, "reordered");
        Ok(outcome)
    }

    /// Delete `item` from `scope` and close the gap it leaves
    pub async fn delete(&self, item: ItemId, scope: ScopeId) -> OrderResult<Outcome> {
        let verify = self.options.verify_after_write;
        let outcome = self
            .run(item_subject::<K>(item), "delete", move |tx| {
                let slot = current_slot(tx, item)?;
                if slot.scope_id != scope {
                    return Err(stale_scope::<K>(item, scope, slot.scope_id));
                }
                let plan = plan::delete::<K>(&tx.list_scope(scope)?, item)?;
                commit_plan(tx, plan, verify)
            })
            .await?;

        info!(kind = K::KIND, item, scope, writes = outcome.writes, "deleted");
        Ok(outcome)
    }

    /// Delete `item` from whatever scope currently holds it
    pub async fn remove(&self, item: ItemId) -> OrderResult<Outcome> {
        let verify = self.options.verify_after_write;
        let outcome = self
            .run(item_subject::<K>(item), "remove", move |tx| {
                let slot = current_slot(tx, item)?;
                let plan = plan::delete::<K>(&tx.list_scope(slot.scope_id)?, item)?;
                commit_plan(tx, plan, verify)
            })
            .await?;

        info!(kind = K::KIND, item, writes = outcome.writes, "removed");
        Ok(outcome)
    }

    /// Renumber `scope` to `0..n`, repairing gaps and duplicates
    pub async fn reindex(&self, scope: ScopeId) -> OrderResult<Outcome> {
        let verify = self.options.verify_after_write;
        let outcome = self
            .run(scope_subject::<K>(scope), "reindex", move |tx| {
                ensure_scope(tx, scope)?;
                let plan = plan::reindex(&tx.list_scope(scope)?);
                commit_plan(tx, plan, verify)
            })
            .await?;

        if outcome.writes > 0 {
            warn!(kind = K::SCOPE_KIND, scope, writes = outcome.writes, "reindexed scope with gaps");
        }
        Ok(outcome)
    }

    /// Current state of `scope`
    pub async fn snapshot(&self, scope: ScopeId) -> OrderResult<ScopeState> {
        self.store
            .inspect(scope_subject::<K>(scope), move |tx| {
                ensure_scope(tx, scope)?;
                tx.list_scope(scope)
            })
            .await
    }

    /// Number of items in `scope`
    pub async fn count(&self, scope: ScopeId) -> OrderResult<usize> {
        self.store
            .inspect(scope_subject::<K>(scope), move |tx| {
                ensure_scope(tx, scope)?;
                tx.count_scope(scope)
            })
            .await
    }

    /// Load a full entity
    pub async fn load(&self, id: ItemId) -> OrderResult<K> {
        self.store
            .inspect(item_subject::<K>(id), move |tx| {
                tx.load(id)?.ok_or_else(|| OrderError::NotFound {
                    subject: item_subject::<K>(id),
                })
            })
            .await
    }

    /// Run `work` in a transaction, retrying transient failures from scratch
    async fn run<T, F>(&self, subject: Subject, op: &'static str, work: F) -> OrderResult<T>
    where
        T: Send,
        F: Fn(&dyn ScopeTx<K>) -> OrderResult<T> + Send + Sync,
    {
        let retry = self.options.retry;
        let mut attempt = 1;
        loop {
            match self.store.transact(subject, &work).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < retry.max_attempts => {
                    let delay = retry.delay_for(attempt);
                    warn!(%subject, op, attempt, error = %err, ?delay, "retrying ordering operation");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    debug!(%subject, op, attempt, error = %err, "ordering operation failed");
                    return Err(err);
                }
            }
        }
    }
}

fn current_slot<K: Positioned>(tx: &dyn ScopeTx<K>, item: ItemId) -> OrderResult<Slot> {
    tx.get_item(item)?.ok_or_else(|| OrderError::NotFound {
        subject: item_subject::<K>(item),
    })
}

fn ensure_scope<K: Positioned>(tx: &dyn ScopeTx<K>, scope: ScopeId) -> OrderResult<i64> {
    tx.scope_container(scope)?.ok_or_else(|| OrderError::NotFound {
        subject: scope_subject::<K>(scope),
    })
}

fn stale_scope<K: Positioned>(item: ItemId, expected: ScopeId, actual: ScopeId) -> OrderError {
    OrderError::Conflict {
        subject: item_subject::<K>(item),
        reason: ConflictReason::StaleScope { expected, actual },
    }
}

/// Plan a move of `slot` to `to` in `to_scope`, same scope or not
fn plan_relocation<K: Positioned>(
    tx: &dyn ScopeTx<K>,
    slot: Slot,
    to_scope: ScopeId,
    to: Position,
) -> OrderResult<Plan> {
    let source = tx.list_scope(slot.scope_id)?;
    if slot.scope_id == to_scope {
        return plan::move_across::<K>(&source, &source, slot.id, to);
    }

    let target_container = ensure_scope(tx, to_scope)?;
    let source_container = ensure_scope(tx, slot.scope_id)?;
    if source_container != target_container {
        return Err(OrderError::InvalidTarget {
            item: item_subject::<K>(slot.id),
            scope: scope_subject::<K>(to_scope),
            reason: TargetReason::ForeignContainer {
                from: source_container,
                to: target_container,
            },
        });
    }

    let target = tx.list_scope(to_scope)?;
    plan::move_across::<K>(&source, &target, slot.id, to)
}

/// Apply a plan and report what committed
fn commit_plan<K: Positioned>(
    tx: &dyn ScopeTx<K>,
    plan: Plan,
    verify: bool,
) -> OrderResult<Outcome> {
    let writes = plan.writes.writes.len();
    if plan.writes.is_empty() {
        return Ok(Outcome {
            moved: plan.moved,
            scopes: plan.scopes,
            writes,
        });
    }

    debug!(kind = K::KIND, writes, delete = ?plan.writes.delete, "applying write set");
    tx.apply(&plan.writes)?;

    let scopes = if verify {
        plan.scopes
            .iter()
            .map(|expected| -> OrderResult<ScopeState> {
                let state = tx.list_scope(expected.scope_id)?;
                invariant::verify::<K>(&state)?;
                Ok(state)
            })
            .collect::<OrderResult<Vec<_>>>()?
    } else {
        plan.scopes
    };

    Ok(Outcome {
        moved: plan.moved,
        scopes,
        writes,
    })
}
