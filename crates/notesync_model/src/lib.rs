//! # NoteSync Model
//!
//! Domain types and wire DTOs for NoteSync.
//!
//! This crate provides:
//! - `Note`, `ChecklistItem`, and `User` domain types
//! - Wire DTOs for the sync endpoint (`SyncRequest`, `SyncResponse`)
//! - The millisecond ISO 8601 timestamp format used on the wire
//!
//! This is a pure data crate with no I/O operations. Conversion between
//! DTOs and domain types is deliberately lenient where the wire contract
//! is lenient: malformed timestamps fall back to the current instant and
//! malformed checklist-item ids are replaced, but a malformed note id
//! rejects the whole DTO so the reconciler can skip it.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod dto;
mod note;
mod user;
pub mod wire_time;

pub use dto::{ChecklistItemDto, DtoError, NoteDto, SyncRequest, SyncResponse, UserDto};
pub use note::{ChecklistItem, Note, NoteKind};
pub use user::User;
