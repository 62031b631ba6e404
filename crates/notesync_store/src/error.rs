//! Store error types.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by the durable store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The requested row does not exist (or is tombstoned, for notes).
    #[error("not found")]
    NotFound,

    /// A uniqueness constraint was violated.
    #[error("already exists")]
    AlreadyExists,

    /// The backing store is unreachable. The only transient error: callers
    /// retry the whole operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Returns true if the caller should retry the operation.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}
