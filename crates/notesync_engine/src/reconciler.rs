//! Last-write-wins reconciliation.

use crate::error::EngineResult;
use chrono::Utc;
use notesync_hub::{Hub, PushMessage};
use notesync_model::{wire_time, NoteDto, SyncRequest, SyncResponse};
use notesync_store::{NoteStore, UpsertOutcome};
use std::sync::Arc;
use uuid::Uuid;

/// Applies client edits and computes return deltas over a [`NoteStore`],
/// fanning resulting change notifications out through the [`Hub`].
///
/// Stateless apart from its collaborators; one instance serves every
/// user concurrently.
pub struct Reconciler<S> {
    store: Arc<S>,
    hub: Arc<Hub>,
}

impl<S: NoteStore> Reconciler<S> {
    /// Creates a reconciler over the given store and hub.
    pub fn new(store: Arc<S>, hub: Arc<Hub>) -> Self {
        Reconciler { store, hub }
    }

    /// Runs one sync call for `user_id`.
    ///
    /// `origin` is the live connection the request arrived alongside, if
    /// any; it is excluded from the broadcasts so a device never receives
    /// an echo of its own edits. Requests without an attached connection
    /// (plain HTTP sync) pass `None` and every connection is notified.
    ///
    /// Malformed items are skipped, not fatal: a change with an unusable
    /// note id and a deletion id that does not parse are logged and
    /// dropped, and the rest of the batch proceeds. Only a store outage
    /// fails the call.
    pub fn sync(
        &self,
        user_id: Uuid,
        request: SyncRequest,
        origin: Option<Uuid>,
    ) -> EngineResult<SyncResponse> {
        let since = match request.last_sync.as_deref() {
            None => None,
            Some(text) => {
                let parsed = wire_time::parse(text);
                if parsed.is_none() {
                    tracing::debug!(%user_id, checkpoint = text, "unparseable checkpoint, treating as first sync");
                }
                parsed
            }
        };

        for dto in request.changes {
            let note = match dto.into_note(user_id) {
                Ok(note) => note,
                Err(err) => {
                    tracing::debug!(%user_id, %err, "skipping change with unusable id");
                    continue;
                }
            };
            let wire = NoteDto::from_note(&note);
            match self.store.upsert(note)? {
                UpsertOutcome::Created => {
                    self.hub
                        .broadcast(user_id, &PushMessage::created(wire), origin);
                }
                UpsertOutcome::Updated => {
                    self.hub
                        .broadcast(user_id, &PushMessage::updated(wire), origin);
                }
                UpsertOutcome::Discarded => {}
            }
        }

        let deleted_at = Utc::now();
        for raw in request.deleted_ids {
            let Ok(id) = Uuid::parse_str(&raw) else {
                tracing::debug!(%user_id, raw, "skipping unparseable deletion id");
                continue;
            };
            if self.store.soft_delete(user_id, id, deleted_at)? {
                self.hub
                    .broadcast(user_id, &PushMessage::deleted(id), origin);
            }
        }

        // Checkpoint before reading the delta: anything written after
        // this instant may or may not appear below, but it will be past
        // the checkpoint and so reappears in the client's next delta.
        let server_timestamp = Utc::now();

        let notes = self
            .store
            .list_updated_since(user_id, since)?
            .iter()
            .map(NoteDto::from_note)
            .collect();
        let deleted_note_ids = self
            .store
            .list_deleted_since(user_id, since)?
            .iter()
            .map(Uuid::to_string)
            .collect();

        Ok(SyncResponse {
            notes,
            deleted_note_ids,
            server_timestamp: wire_time::format(server_timestamp),
        })
    }
}
