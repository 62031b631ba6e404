//! # NoteSync Engine
//!
//! The sync reconciler: applies a client's offline edits under
//! last-write-wins, computes the return delta, and notifies the user's
//! other live connections.
//!
//! ## Reconciliation model
//!
//! A sync call is **push-then-pull** in a single pass:
//! 1. Apply the client's changed notes (per-note last-write-wins on
//!    `updated_at`; a tombstone is never resurrected)
//! 2. Apply the client's deletions (idempotent soft deletes)
//! 3. Assemble the delta of everything newer than the client's checkpoint
//!
//! ## Key invariants
//!
//! - Concurrent edits converge to the copy with the strictly newer
//!   `updated_at`, regardless of arrival order; an equal timestamp keeps
//!   the stored copy
//! - Deleting twice is a no-op, not an error
//! - The response `serverTimestamp` is captured before the delta is
//!   assembled, so a write landing mid-assembly reappears in the next
//!   delta instead of being lost
//! - Per-item failures (bad ids, lost races) never abort the batch; only
//!   an unavailable store fails the call

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod reconciler;

pub use error::{EngineError, EngineResult};
pub use reconciler::Reconciler;
