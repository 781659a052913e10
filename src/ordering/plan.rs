//! Ordering planner
//!
//! Pure functions from scope snapshots and a request to the set of position
//! writes that leaves every touched scope dense. Nothing here touches storage.
//!
//! Plans are computed on display order (`(position, id)`), so a write is only
//! emitted for rows whose placement actually changes. On a dense scope this is
//! exactly the shifted block plus the moved row.

use std::collections::HashSet;

use crate::domain::{
    ConflictReason, ItemId, OrderError, OrderResult, PermutationMismatch, Position, Positioned,
    ScopeId, ScopeState, Slot, Subject,
};

/// Position writes plus an optional row removal, applied as one unit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSet {
    /// New placement of every row whose scope or position changes
    pub writes: Vec<Slot>,
    pub delete: Option<ItemId>,
}

impl WriteSet {
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty() && self.delete.is_none()
    }
}

/// Planned effect of one operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// Final slot of the item being moved, or the removed slot on delete
    pub moved: Option<Slot>,
    pub writes: WriteSet,
    /// Resulting state of every touched scope
    pub scopes: Vec<ScopeState>,
}

pub(crate) fn item_subject<K: Positioned>(id: ItemId) -> Subject {
    Subject::new(K::KIND, id)
}

pub(crate) fn scope_subject<K: Positioned>(id: ScopeId) -> Subject {
    Subject::new(K::SCOPE_KIND, id)
}

/// Assign ranks `0..n` to `order`, returning the new state and changed slots
fn renumber(scope_id: ScopeId, order: &[Slot]) -> (ScopeState, Vec<Slot>) {
    let mut items = Vec::with_capacity(order.len());
    let mut writes = Vec::new();

    for (rank, slot) in order.iter().enumerate() {
        let placed = Slot::new(slot.id, scope_id, rank as Position);
        if placed != *slot {
            writes.push(placed);
        }
        items.push(placed);
    }

    (ScopeState { scope_id, items }, writes)
}

fn locate<K: Positioned>(scope: &ScopeState, item: ItemId) -> OrderResult<usize> {
    scope
        .rank_of(item)
        .ok_or_else(|| OrderError::NotFound {
            subject: item_subject::<K>(item),
        })
}

/// Tail position for a new row. Repairs gaps first so the tail is free.
pub fn append(scope: &ScopeState) -> (Position, WriteSet) {
    let (state, writes) = renumber(scope.scope_id, &scope.items);
    (
        state.len() as Position,
        WriteSet {
            writes,
            delete: None,
        },
    )
}

/// Move `item` from `from` to `to` inside one scope.
///
/// Same result as removing the item from the ordered list and reinserting
/// it at `to`. `from` is the caller's view and must match either the stored
/// position or the current rank; the two differ only in a gapped scope,
/// which the move renumbers.
pub fn move_within<K: Positioned>(
    scope: &ScopeState,
    item: ItemId,
    from: Position,
    to: Position,
) -> OrderResult<Plan> {
    let rank = locate::<K>(scope, item)?;

    let max = scope.len() as Position - 1;
    if to < 0 || to > max {
        return Err(OrderError::InvalidPosition {
            scope: scope_subject::<K>(scope.scope_id),
            position: to,
            max,
        });
    }

    if from != rank as Position && from != scope.items[rank].position {
        return Err(OrderError::Conflict {
            subject: item_subject::<K>(item),
            reason: ConflictReason::StalePosition {
                expected: from,
                actual: scope.items[rank].position,
            },
        });
    }

    let mut order = scope.items.clone();
    let slot = order.remove(rank);
    order.insert(to as usize, slot);

    let (state, writes) = renumber(scope.scope_id, &order);
    Ok(Plan {
        moved: Some(state.items[to as usize]),
        writes: WriteSet {
            writes,
            delete: None,
        },
        scopes: vec![state],
    })
}

/// Move `item` out of `source` into `target` at `to`.
///
/// When both snapshots are the same scope this is exactly `move_within`
/// from the item's current rank, bounds included.
pub fn move_across<K: Positioned>(
    source: &ScopeState,
    target: &ScopeState,
    item: ItemId,
    to: Position,
) -> OrderResult<Plan> {
    let rank = locate::<K>(source, item)?;

    if source.scope_id == target.scope_id {
        return move_within::<K>(source, item, rank as Position, to);
    }

    let max = target.len() as Position;
    if to < 0 || to > max {
        return Err(OrderError::InvalidPosition {
            scope: scope_subject::<K>(target.scope_id),
            position: to,
            max,
        });
    }

    let mut remaining = source.items.clone();
    let slot = remaining.remove(rank);
    let mut order = target.items.clone();
    order.insert(to as usize, slot);

    let (source_state, mut writes) = renumber(source.scope_id, &remaining);
    let (target_state, target_writes) = renumber(target.scope_id, &order);
    writes.extend(target_writes);

    Ok(Plan {
        moved: Some(target_state.items[to as usize]),
        writes: WriteSet {
            writes,
            delete: None,
        },
        scopes: vec![source_state, target_state],
    })
}

/// Give the item at index `k` of `ordered` position `k`.
///
/// `ordered` must be exactly a permutation of the scope's ids.
pub fn reorder<K: Positioned>(scope: &ScopeState, ordered: &[ItemId]) -> OrderResult<Plan> {
    let subject = scope_subject::<K>(scope.scope_id);
    let mismatch = |mismatch: PermutationMismatch| OrderError::InvalidPermutation {
        scope: subject,
        mismatch,
    };

    let mut seen = HashSet::with_capacity(ordered.len());
    let mut order = Vec::with_capacity(ordered.len());
    for &id in ordered {
        let slot = scope
            .get(id)
            .ok_or_else(|| mismatch(PermutationMismatch::Foreign(id)))?;
        if !seen.insert(id) {
            return Err(mismatch(PermutationMismatch::Duplicate(id)));
        }
        order.push(*slot);
    }

    if let Some(missing) = scope.items.iter().find(|slot| !seen.contains(&slot.id)) {
        return Err(mismatch(PermutationMismatch::Missing(missing.id)));
    }

    let (state, writes) = renumber(scope.scope_id, &order);
    Ok(Plan {
        moved: None,
        writes: WriteSet {
            writes,
            delete: None,
        },
        scopes: vec![state],
    })
}

/// Remove `item` and close its slot
pub fn delete<K: Positioned>(scope: &ScopeState, item: ItemId) -> OrderResult<Plan> {
    let rank = locate::<K>(scope, item)?;

    let mut remaining = scope.items.clone();
    let removed = remaining.remove(rank);

    let (state, writes) = renumber(scope.scope_id, &remaining);
    Ok(Plan {
        moved: Some(removed),
        writes: WriteSet {
            writes,
            delete: Some(item),
        },
        scopes: vec![state],
    })
}

/// Renumber a scope to `0..n` in display order
pub fn reindex(scope: &ScopeState) -> Plan {
    let (state, writes) = renumber(scope.scope_id, &scope.items);
    Plan {
        moved: None,
        writes: WriteSet {
            writes,
            delete: None,
        },
        scopes: vec![state],
    }
}
