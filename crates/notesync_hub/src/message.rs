//! Push message envelope.

use notesync_model::NoteDto;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A push frame: `{ "type": ..., "payload"?: ... }`.
///
/// The payload shape depends on the type, so the envelope is a tagged sum
/// type at the serialization boundary rather than a dynamically-typed
/// payload. Unknown types fail decoding; the pump logs and drops such
/// frames without closing the connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum PushMessage {
    /// A note appeared on another device.
    NoteCreated {
        /// The new note.
        note: NoteDto,
    },
    /// A note changed on another device.
    NoteUpdated {
        /// The changed note.
        note: NoteDto,
    },
    /// A note was deleted on another device.
    NoteDeleted {
        /// Id of the deleted note.
        #[serde(rename = "noteId")]
        note_id: String,
    },
    /// Liveness probe. Sent periodically by the server; clients may also
    /// send their own, answered in kind.
    Ping,
    /// Liveness response.
    Pong,
}

impl PushMessage {
    /// Builds a `note_created` frame.
    pub fn created(note: NoteDto) -> Self {
        PushMessage::NoteCreated { note }
    }

    /// Builds a `note_updated` frame.
    pub fn updated(note: NoteDto) -> Self {
        PushMessage::NoteUpdated { note }
    }

    /// Builds a `note_deleted` frame.
    pub fn deleted(note_id: Uuid) -> Self {
        PushMessage::NoteDeleted {
            note_id: note_id.to_string(),
        }
    }
}
