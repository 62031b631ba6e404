//! Reconciler error types.

use notesync_store::StoreError;
use thiserror::Error;

/// Result type for reconciler operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by the reconciler.
///
/// Per-item problems (malformed ids, lost last-write-wins races) are
/// handled inline and never reach here; the only way a sync call fails is
/// the store becoming unreachable mid-batch.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The backing store failed. Transient: the client retries the whole
    /// sync call, which is safe because every step is idempotent.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Returns true if retrying the call may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            EngineError::Store(err) => err.is_transient(),
        }
    }
}
