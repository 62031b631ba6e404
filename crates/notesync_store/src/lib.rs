//! # NoteSync Store
//!
//! Durable-store contracts for NoteSync, plus the in-memory reference
//! implementation.
//!
//! The sync core is stateless per request; correctness under concurrent
//! requests from different devices relies entirely on the store's atomic
//! per-row operations, never on in-process locking by callers. The traits
//! here are that contract:
//!
//! - [`NoteStore`] — atomic last-write-wins upsert, soft delete, and
//!   since-queries, keyed by owner + id
//! - [`UserStore`] — account rows
//! - [`RevocationStore`] — token blacklist rows and per-user revoke-all
//!   markers
//!
//! [`MemoryStore`] implements all three behind `parking_lot` locks and
//! backs tests and single-process deployments. A SQL-backed store plugs in
//! at the same trait boundary.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod memory;
mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use traits::{NoteStore, RevocationStore, UpsertOutcome, UserStore};
