//! In-memory reference store.

use crate::error::{StoreError, StoreResult};
use crate::traits::{NoteStore, RevocationStore, UpsertOutcome, UserStore};
use chrono::{DateTime, Duration, Utc};
use notesync_model::{Note, User};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

/// How long a revoke-all marker outlives its cutoff before the sweep may
/// drop it. Must exceed the longest refresh-token TTL, otherwise a still
/// unexpired token could outlive the marker that revokes it.
const REVOKE_ALL_RETENTION_DAYS: i64 = 30;

#[derive(Debug, Clone)]
struct BlacklistRow {
    user_id: Uuid,
    expires_at: DateTime<Utc>,
}

/// In-memory implementation of every store trait.
///
/// Each map is guarded by its own `RwLock`; every trait operation takes a
/// single lock once, which makes it atomic with respect to concurrent
/// callers the same way a per-row database write is.
#[derive(Default)]
pub struct MemoryStore {
    notes: RwLock<HashMap<(Uuid, Uuid), Note>>,
    users: RwLock<HashMap<Uuid, User>>,
    blacklist: RwLock<HashMap<Uuid, BlacklistRow>>,
    revoke_all_cutoffs: RwLock<HashMap<Uuid, DateTime<Utc>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl NoteStore for MemoryStore {
    fn upsert(&self, note: Note) -> StoreResult<UpsertOutcome> {
        let mut notes = self.notes.write();
        let key = (note.owner_id, note.id);

        match notes.get(&key) {
            None => {
                notes.insert(key, note);
                Ok(UpsertOutcome::Created)
            }
            Some(stored) if stored.is_deleted() => {
                tracing::debug!(note_id = %note.id, "upsert against tombstone discarded");
                Ok(UpsertOutcome::Discarded)
            }
            Some(stored) if note.updated_at > stored.updated_at => {
                notes.insert(key, note);
                Ok(UpsertOutcome::Updated)
            }
            Some(_) => Ok(UpsertOutcome::Discarded),
        }
    }

    fn get(&self, owner_id: Uuid, id: Uuid) -> StoreResult<Note> {
        self.notes
            .read()
            .get(&(owner_id, id))
            .filter(|note| !note.is_deleted())
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn list_updated_since(
        &self,
        owner_id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> StoreResult<Vec<Note>> {
        let notes = self.notes.read();
        let mut result: Vec<Note> = notes
            .values()
            .filter(|note| note.owner_id == owner_id && !note.is_deleted())
            .filter(|note| since.is_none_or(|cutoff| note.updated_at > cutoff))
            .cloned()
            .collect();
        result.sort_by_key(|note| note.sort_order);
        Ok(result)
    }

    fn soft_delete(&self, owner_id: Uuid, id: Uuid, at: DateTime<Utc>) -> StoreResult<bool> {
        let mut notes = self.notes.write();
        match notes.get_mut(&(owner_id, id)) {
            Some(note) if !note.is_deleted() => {
                note.deleted_at = Some(at);
                note.updated_at = at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn list_deleted_since(
        &self,
        owner_id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> StoreResult<Vec<Uuid>> {
        let notes = self.notes.read();
        Ok(notes
            .values()
            .filter(|note| note.owner_id == owner_id)
            .filter_map(|note| note.deleted_at.map(|at| (note.id, at)))
            .filter(|(_, at)| since.is_none_or(|cutoff| *at > cutoff))
            .map(|(id, _)| id)
            .collect())
    }
}

impl UserStore for MemoryStore {
    fn create_user(&self, user: User) -> StoreResult<()> {
        let mut users = self.users.write();
        if users.values().any(|u| u.username == user.username) || users.contains_key(&user.id) {
            return Err(StoreError::AlreadyExists);
        }
        users.insert(user.id, user);
        Ok(())
    }

    fn get_by_username(&self, username: &str) -> StoreResult<User> {
        self.users
            .read()
            .values()
            .find(|u| u.username == username)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn get_by_id(&self, id: Uuid) -> StoreResult<User> {
        self.users.read().get(&id).cloned().ok_or(StoreError::NotFound)
    }

    fn update_password(&self, id: Uuid, password_hash: String) -> StoreResult<()> {
        let mut users = self.users.write();
        let user = users.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.password_hash = password_hash;
        user.updated_at = Utc::now();
        Ok(())
    }
}

impl RevocationStore for MemoryStore {
    fn revoke(&self, token_id: Uuid, user_id: Uuid, expires_at: DateTime<Utc>) -> StoreResult<()> {
        self.blacklist.write().entry(token_id).or_insert(BlacklistRow {
            user_id,
            expires_at,
        });
        Ok(())
    }

    fn is_revoked(&self, token_id: Uuid) -> StoreResult<bool> {
        Ok(self.blacklist.read().contains_key(&token_id))
    }

    fn revoke_all(&self, user_id: Uuid, cutoff: DateTime<Utc>) -> StoreResult<()> {
        let mut cutoffs = self.revoke_all_cutoffs.write();
        let entry = cutoffs.entry(user_id).or_insert(cutoff);
        if cutoff > *entry {
            *entry = cutoff;
        }
        Ok(())
    }

    fn revoke_all_cutoff(&self, user_id: Uuid) -> StoreResult<Option<DateTime<Utc>>> {
        Ok(self.revoke_all_cutoffs.read().get(&user_id).copied())
    }

    fn cleanup_expired(&self, now: DateTime<Utc>) -> StoreResult<usize> {
        let mut removed = 0;

        {
            let mut blacklist = self.blacklist.write();
            let before = blacklist.len();
            blacklist.retain(|_, row| row.expires_at >= now);
            removed += before - blacklist.len();
        }

        {
            let retention = Duration::days(REVOKE_ALL_RETENTION_DAYS);
            let mut cutoffs = self.revoke_all_cutoffs.write();
            let before = cutoffs.len();
            cutoffs.retain(|_, cutoff| *cutoff + retention >= now);
            removed += before - cutoffs.len();
        }

        Ok(removed)
    }
}
