//! Ordering errors
//!
//! Every failure names its kind and the offending item or scope so callers
//! can decide between rejecting and retrying.

use std::fmt;
use thiserror::Error;

use super::slot::{ItemId, Position, ScopeId, Subject};

/// Result type for ordering and store operations
pub type OrderResult<T> = Result<T, OrderError>;

/// Coarse classification used by callers to pick a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidInput,
    Conflict,
    Unavailable,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// Referenced item or scope does not exist
    #[error("{subject} not found")]
    NotFound { subject: Subject },

    /// Requested position is outside `0..=max`
    #[error("position {position} is outside 0..={max} in {scope}")]
    InvalidPosition {
        scope: Subject,
        position: Position,
        max: Position,
    },

    /// Cross-scope move to an incompatible scope
    #[error("{item} cannot move to {scope}: {reason}")]
    InvalidTarget {
        item: Subject,
        scope: Subject,
        reason: TargetReason,
    },

    /// Reorder list is not an exact permutation of the scope
    #[error("reorder of {scope} is not a permutation: {mismatch}")]
    InvalidPermutation {
        scope: Subject,
        mismatch: PermutationMismatch,
    },

    /// Lost a concurrency race or acted on a stale view
    #[error("conflict on {subject}: {reason}")]
    Conflict {
        subject: Subject,
        reason: ConflictReason,
    },

    /// Store or transport failure
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },

    /// Positions were not dense after a write; the transaction was rolled back
    #[error("ordering invariant violated in {scope}: {detail}")]
    Invariant { scope: Subject, detail: String },
}

impl OrderError {
    pub fn not_found(kind: &'static str, id: i64) -> Self {
        Self::NotFound {
            subject: Subject::new(kind, id),
        }
    }

    pub fn contended(subject: Subject) -> Self {
        Self::Conflict {
            subject,
            reason: ConflictReason::Contended,
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidPosition { .. }
            | Self::InvalidTarget { .. }
            | Self::InvalidPermutation { .. } => ErrorKind::InvalidInput,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Unavailable { .. } => ErrorKind::Unavailable,
            Self::Invariant { .. } => ErrorKind::Internal,
        }
    }

    /// Whether repeating the same request against fresh state can succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Conflict {
                reason: ConflictReason::Contended,
                ..
            } | Self::Unavailable { .. }
        )
    }
}

/// Why a cross-scope target was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetReason {
    /// Target scope hangs off a different container than the source
    ForeignContainer { from: i64, to: i64 },
}

impl fmt::Display for TargetReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetReason::ForeignContainer { from, to } => write!(
                f,
                "source belongs to container {} but target belongs to {}",
                from, to
            ),
        }
    }
}

/// First difference found between a reorder list and the scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermutationMismatch {
    Duplicate(ItemId),
    Foreign(ItemId),
    Missing(ItemId),
}

impl fmt::Display for PermutationMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermutationMismatch::Duplicate(id) => write!(f, "id {} listed twice", id),
            PermutationMismatch::Foreign(id) => write!(f, "id {} is not in the scope", id),
            PermutationMismatch::Missing(id) => write!(f, "id {} is missing", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictReason {
    /// Another transaction held the store
    Contended,
    /// Caller's `from` position no longer matches
    StalePosition { expected: Position, actual: Position },
    /// Caller's `from` scope no longer matches
    StaleScope { expected: ScopeId, actual: ScopeId },
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictReason::Contended => write!(f, "store busy"),
            ConflictReason::StalePosition { expected, actual } => {
                write!(f, "expected position {} but found {}", expected, actual)
            }
            ConflictReason::StaleScope { expected, actual } => {
                write!(f, "expected scope {} but found {}", expected, actual)
            }
        }
    }
}
