//! Note and checklist-item domain types.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// The kind of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoteKind {
    /// Free-form text note.
    #[default]
    Text,
    /// Checklist note; its content lives in `checklist_items`.
    Checklist,
}

impl NoteKind {
    /// Returns the wire string for this kind.
    pub fn as_wire(&self) -> &'static str {
        match self {
            NoteKind::Text => "note",
            NoteKind::Checklist => "checklist",
        }
    }

    /// Parses a wire string. Unknown strings decode as [`NoteKind::Text`].
    pub fn from_wire(text: &str) -> Self {
        match text {
            "checklist" => NoteKind::Checklist,
            _ => NoteKind::Text,
        }
    }
}

/// A note owned by a single user.
///
/// `updated_at` is the last-write-wins vector: it is set by whichever
/// party writes last and compared on every concurrent upsert. `deleted_at`
/// marks a tombstone; tombstones are retained so other devices can learn
/// about the deletion instead of treating absence as "never existed".
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    /// Note id, unique per owner.
    pub id: Uuid,
    /// Owning user.
    pub owner_id: Uuid,
    /// Title.
    pub title: String,
    /// Free-form body (empty for checklist notes).
    pub content: String,
    /// Text or checklist.
    pub kind: NoteKind,
    /// Pinned flag.
    pub pinned: bool,
    /// Archived flag. Un-archiving is a visible field change, never a
    /// deletion reversal.
    pub archived: bool,
    /// Client-controlled display order.
    pub sort_order: i32,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Last mutation instant; the LWW comparison vector.
    pub updated_at: DateTime<Utc>,
    /// Tombstone instant, if soft-deleted.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Checklist items, owned exclusively by this note. An applied note
    /// update replaces this set wholesale.
    pub checklist_items: Vec<ChecklistItem>,
}

impl Note {
    /// Returns true if this note is a tombstone.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// A single checklist entry, owned by its parent note.
#[derive(Debug, Clone, PartialEq)]
pub struct ChecklistItem {
    /// Item id.
    pub id: Uuid,
    /// Parent note.
    pub note_id: Uuid,
    /// Item text.
    pub text: String,
    /// Completion flag.
    pub completed: bool,
    /// Display order within the note.
    pub sort_order: i32,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Last mutation instant.
    pub updated_at: DateTime<Utc>,
}
