//! Dense-position invariant
//!
//! A scope of N items must hold positions `0..N` exactly once each.

use crate::domain::{OrderError, OrderResult, Positioned, ScopeState};

use super::plan::scope_subject;

/// Describe the first way `scope` breaks the invariant
pub fn check_dense(scope: &ScopeState) -> Result<(), String> {
    for (rank, slot) in scope.items.iter().enumerate() {
        if slot.scope_id != scope.scope_id {
            return Err(format!(
                "item {} belongs to scope {}",
                slot.id, slot.scope_id
            ));
        }
        if slot.position != rank as i64 {
            return Err(format!(
                "item {} at position {} where {} was expected",
                slot.id, slot.position, rank
            ));
        }
    }
    Ok(())
}

pub fn is_dense(scope: &ScopeState) -> bool {
    check_dense(scope).is_ok()
}

/// `check_dense` as an ordering error for scopes of `K`
pub(crate) fn verify<K: Positioned>(scope: &ScopeState) -> OrderResult<()> {
    check_dense(scope).map_err(|detail| OrderError::Invariant {
        scope: scope_subject::<K>(scope.scope_id),
        detail,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Slot, Task};

    #[test]
    fn test_dense_scope() {
        let scope = ScopeState::new(1, vec![Slot::new(5, 1, 1), Slot::new(4, 1, 0)]);
        assert!(is_dense(&scope));
        assert!(is_dense(&ScopeState::empty(1)));
    }

    #[test]
    fn test_gap_and_duplicate() {
        let gap = ScopeState::new(1, vec![Slot::new(1, 1, 0), Slot::new(2, 1, 2)]);
        assert_eq!(
            check_dense(&gap).unwrap_err(),
            "item 2 at position 2 where 1 was expected"
        );

        let duplicate = ScopeState::new(1, vec![Slot::new(1, 1, 0), Slot::new(2, 1, 0)]);
        assert!(!is_dense(&duplicate));
    }

    #[test]
    fn test_verify_names_scope() {
        let gap = ScopeState::new(3, vec![Slot::new(1, 3, 1)]);
        let err = verify::<Task>(&gap).unwrap_err();
        assert_eq!(
            err.to_string(),
            "ordering invariant violated in column 3: item 1 at position 1 where 0 was expected"
        );
    }
}
