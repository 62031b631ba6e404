//! Durable-store trait contracts.

use crate::error::StoreResult;
use chrono::{DateTime, Utc};
use notesync_model::{Note, User};
use uuid::Uuid;

/// What an upsert did with the incoming note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No note with that id existed for the owner; the note was created.
    Created,
    /// The incoming copy was strictly newer and replaced the stored one.
    Updated,
    /// The incoming copy lost last-write-wins (older than or equal to the
    /// stored copy, or the target is a tombstone) and was dropped.
    Discarded,
}

impl UpsertOutcome {
    /// Returns true if the store was mutated.
    pub fn applied(&self) -> bool {
        !matches!(self, UpsertOutcome::Discarded)
    }
}

/// Note rows, keyed by owner + id.
pub trait NoteStore: Send + Sync {
    /// Atomically upserts a note under last-write-wins.
    ///
    /// Rules, applied as one atomic compare-and-write per row:
    /// - no stored note: create, [`UpsertOutcome::Created`]
    /// - stored note is a tombstone: discard — a tombstone is never
    ///   undeleted by sync
    /// - stored note is live: apply only if
    ///   `incoming.updated_at > stored.updated_at`; an equal timestamp
    ///   keeps the stored copy (the deterministic tie-break), an older one
    ///   is discarded silently
    ///
    /// An applied update replaces the checklist item set wholesale.
    fn upsert(&self, note: Note) -> StoreResult<UpsertOutcome>;

    /// Fetches a live note. Tombstones and absent rows are both
    /// [`crate::StoreError::NotFound`].
    fn get(&self, owner_id: Uuid, id: Uuid) -> StoreResult<Note>;

    /// Lists live notes with `updated_at > since`, ordered by sort order.
    /// `None` means all live notes (first sync).
    fn list_updated_since(
        &self,
        owner_id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> StoreResult<Vec<Note>>;

    /// Soft-deletes a note: sets `deleted_at` and `updated_at` to `at`.
    ///
    /// Returns `false` — not an error — when the note is absent or already
    /// tombstoned, so repeated deletion of the same id is idempotent.
    fn soft_delete(&self, owner_id: Uuid, id: Uuid, at: DateTime<Utc>) -> StoreResult<bool>;

    /// Lists tombstone ids with `deleted_at > since`. `None` means every
    /// tombstone the owner has.
    fn list_deleted_since(
        &self,
        owner_id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> StoreResult<Vec<Uuid>>;
}

/// Account rows.
pub trait UserStore: Send + Sync {
    /// Inserts a user. Fails [`crate::StoreError::AlreadyExists`] when the
    /// username is taken.
    fn create_user(&self, user: User) -> StoreResult<()>;

    /// Looks a user up by login name.
    fn get_by_username(&self, username: &str) -> StoreResult<User>;

    /// Looks a user up by id.
    fn get_by_id(&self, id: Uuid) -> StoreResult<User>;

    /// Replaces a user's credential hash.
    fn update_password(&self, id: Uuid, password_hash: String) -> StoreResult<()>;
}

/// Token blacklist rows and per-user revoke-all markers.
///
/// A token is rejected if its id has a blacklist row **or** its issue
/// instant precedes the subject's most recent revoke-all cutoff. The
/// cutoff form avoids enumerating every token ever issued to a user.
pub trait RevocationStore: Send + Sync {
    /// Blacklists one token id until its own expiry. Idempotent.
    fn revoke(&self, token_id: Uuid, user_id: Uuid, expires_at: DateTime<Utc>) -> StoreResult<()>;

    /// Returns true if the token id is blacklisted.
    fn is_revoked(&self, token_id: Uuid) -> StoreResult<bool>;

    /// Records a revoke-all marker: every token issued before `cutoff` is
    /// invalid. A later cutoff supersedes an earlier one.
    fn revoke_all(&self, user_id: Uuid, cutoff: DateTime<Utc>) -> StoreResult<()>;

    /// Returns the user's most recent revoke-all cutoff, if any.
    fn revoke_all_cutoff(&self, user_id: Uuid) -> StoreResult<Option<DateTime<Utc>>>;

    /// Deletes blacklist rows past their own expiry and revoke-all markers
    /// past their retention window. Garbage collection only: the expiry
    /// check already rejects everything an expired row would. Returns the
    /// number of rows removed.
    fn cleanup_expired(&self, now: DateTime<Utc>) -> StoreResult<usize>;
}
