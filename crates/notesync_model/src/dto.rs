//! Wire DTOs for the sync endpoint.
//!
//! Field names match the client wire contract (camelCase). Timestamps are
//! strings in the [`crate::wire_time`] format.

use crate::note::{ChecklistItem, Note, NoteKind};
use crate::user::User;
use crate::wire_time;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error converting a DTO into a domain type.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DtoError {
    /// The note id is not a valid UUID. The item cannot be keyed and must
    /// be skipped by the caller.
    #[error("invalid note id: {0:?}")]
    InvalidNoteId(String),
}

/// A note as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteDto {
    /// Note id (UUID string).
    pub id: String,
    /// Title.
    pub title: String,
    /// Body text.
    pub content: String,
    /// `"note"` or `"checklist"`.
    #[serde(rename = "noteType")]
    pub note_type: String,
    /// Pinned flag.
    #[serde(rename = "isPinned")]
    pub is_pinned: bool,
    /// Archived flag.
    #[serde(rename = "isArchived")]
    pub is_archived: bool,
    /// Display order.
    #[serde(rename = "sortOrder")]
    pub sort_order: i32,
    /// Creation timestamp, wire format.
    #[serde(rename = "createdAt")]
    pub created_at: String,
    /// Last-mutation timestamp, wire format. The LWW vector.
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
    /// Checklist items; omitted when empty.
    #[serde(
        rename = "checklistItems",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub checklist_items: Option<Vec<ChecklistItemDto>>,
}

/// A checklist item as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItemDto {
    /// Item id (UUID string).
    pub id: String,
    /// Item text.
    pub text: String,
    /// Completion flag.
    #[serde(rename = "isCompleted")]
    pub is_completed: bool,
    /// Display order.
    #[serde(rename = "sortOrder")]
    pub sort_order: i32,
    /// Creation timestamp, wire format.
    #[serde(rename = "createdAt")]
    pub created_at: String,
    /// Last-mutation timestamp, wire format.
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

/// A sync call: the client's offline edits plus its checkpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncRequest {
    /// Notes changed on the client since its last sync.
    #[serde(default)]
    pub changes: Vec<NoteDto>,
    /// Ids of notes deleted on the client since its last sync.
    #[serde(rename = "deletedIDs", default)]
    pub deleted_ids: Vec<String>,
    /// The `serverTimestamp` of the client's previous response; absent on
    /// first sync.
    #[serde(rename = "lastSync", skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<String>,
}

/// The response delta: everything newer than the presented checkpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncResponse {
    /// Live notes with `updatedAt` past the checkpoint.
    pub notes: Vec<NoteDto>,
    /// Tombstoned ids with `deletedAt` past the checkpoint.
    #[serde(rename = "deletedNoteIDs")]
    pub deleted_note_ids: Vec<String>,
    /// The new checkpoint; the client presents it as `lastSync` next time.
    #[serde(rename = "serverTimestamp")]
    pub server_timestamp: String,
}

/// Public user projection (no credential material).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDto {
    /// User id (UUID string).
    pub id: String,
    /// Login name.
    pub username: String,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
        }
    }
}

impl NoteDto {
    /// Builds the wire form of a note. Tombstone state never crosses the
    /// wire as a field; deletions travel as bare ids.
    pub fn from_note(note: &Note) -> Self {
        let checklist_items = if note.checklist_items.is_empty() {
            None
        } else {
            Some(
                note.checklist_items
                    .iter()
                    .map(ChecklistItemDto::from_item)
                    .collect(),
            )
        };

        Self {
            id: note.id.to_string(),
            title: note.title.clone(),
            content: note.content.clone(),
            note_type: note.kind.as_wire().to_string(),
            is_pinned: note.pinned,
            is_archived: note.archived,
            sort_order: note.sort_order,
            created_at: wire_time::format(note.created_at),
            updated_at: wire_time::format(note.updated_at),
            checklist_items,
        }
    }

    /// Converts into a domain note owned by `owner_id`.
    ///
    /// Lenient where the wire contract is lenient: malformed timestamps
    /// fall back to now and a malformed item id gets a fresh id. Only a
    /// malformed note id is fatal, since the note cannot be keyed.
    pub fn into_note(self, owner_id: Uuid) -> Result<Note, DtoError> {
        let id = Uuid::parse_str(&self.id).map_err(|_| DtoError::InvalidNoteId(self.id.clone()))?;

        let now = Utc::now();
        let created_at = wire_time::parse(&self.created_at).unwrap_or(now);
        let updated_at = wire_time::parse(&self.updated_at).unwrap_or(now);

        let checklist_items = self
            .checklist_items
            .unwrap_or_default()
            .into_iter()
            .map(|item| item.into_item(id))
            .collect();

        Ok(Note {
            id,
            owner_id,
            title: self.title,
            content: self.content,
            kind: NoteKind::from_wire(&self.note_type),
            pinned: self.is_pinned,
            archived: self.is_archived,
            sort_order: self.sort_order,
            created_at,
            updated_at,
            deleted_at: None,
            checklist_items,
        })
    }
}

impl ChecklistItemDto {
    /// Builds the wire form of a checklist item.
    pub fn from_item(item: &ChecklistItem) -> Self {
        Self {
            id: item.id.to_string(),
            text: item.text.clone(),
            is_completed: item.completed,
            sort_order: item.sort_order,
            created_at: wire_time::format(item.created_at),
            updated_at: wire_time::format(item.updated_at),
        }
    }

    fn into_item(self, note_id: Uuid) -> ChecklistItem {
        let now = Utc::now();
        ChecklistItem {
            id: Uuid::parse_str(&self.id).unwrap_or_else(|_| Uuid::new_v4()),
            note_id,
            text: self.text,
            completed: self.is_completed,
            sort_order: self.sort_order,
            created_at: wire_time::parse(&self.created_at).unwrap_or(now),
            updated_at: wire_time::parse(&self.updated_at).unwrap_or(now),
        }
    }
}
