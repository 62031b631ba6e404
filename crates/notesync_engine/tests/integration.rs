//! Integration tests for the sync reconciler.
//!
//! Each device is modelled as a `SyncRequest`-producing client holding the
//! `serverTimestamp` checkpoint from its previous call; the tests walk
//! complete offline-edit-then-reconnect scenarios through the reconciler.

use notesync_engine::Reconciler;
use notesync_hub::{Connection, Hub, PushMessage};
use notesync_model::{wire_time, NoteDto, SyncRequest};
use notesync_store::{MemoryStore, NoteStore};
use proptest::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

fn reconciler() -> (Reconciler<MemoryStore>, Arc<MemoryStore>, Arc<Hub>) {
    let store = Arc::new(MemoryStore::new());
    let hub = Arc::new(Hub::new());
    (
        Reconciler::new(Arc::clone(&store), Arc::clone(&hub)),
        store,
        hub,
    )
}

fn note(id: Uuid, title: &str, updated_at: &str) -> NoteDto {
    NoteDto {
        id: id.to_string(),
        title: title.into(),
        content: format!("{title} body"),
        note_type: "note".into(),
        is_pinned: false,
        is_archived: false,
        sort_order: 0,
        created_at: "2025-06-01T00:00:00.000Z".into(),
        updated_at: updated_at.into(),
        checklist_items: None,
    }
}

/// Two devices edit the same note offline; both reconnect; both converge
/// to the newer edit regardless of which device syncs first.
#[test]
fn offline_conflict_converges_to_the_newer_edit() {
    let (reconciler, _store, _hub) = reconciler();
    let user = Uuid::new_v4();
    let id = Uuid::new_v4();

    // Shared starting point.
    let seed = reconciler
        .sync(
            user,
            SyncRequest {
                changes: vec![note(id, "original", "2025-06-01T08:00:00.000Z")],
                ..SyncRequest::default()
            },
            None,
        )
        .unwrap();

    // Device A edits at 09:00, device B at 10:00, both offline. A
    // reconnects first.
    let from_a = reconciler
        .sync(
            user,
            SyncRequest {
                changes: vec![note(id, "edit from A", "2025-06-01T09:00:00.000Z")],
                last_sync: Some(seed.server_timestamp.clone()),
                ..SyncRequest::default()
            },
            None,
        )
        .unwrap();
    assert_eq!(from_a.notes[0].title, "edit from A");

    let from_b = reconciler
        .sync(
            user,
            SyncRequest {
                changes: vec![note(id, "edit from B", "2025-06-01T10:00:00.000Z")],
                last_sync: Some(seed.server_timestamp),
                ..SyncRequest::default()
            },
            None,
        )
        .unwrap();
    assert_eq!(from_b.notes[0].title, "edit from B");

    // A syncs again and receives B's winning copy.
    let catch_up = reconciler
        .sync(
            user,
            SyncRequest {
                last_sync: Some(from_a.server_timestamp),
                ..SyncRequest::default()
            },
            None,
        )
        .unwrap();
    assert_eq!(catch_up.notes.len(), 1);
    assert_eq!(catch_up.notes[0].title, "edit from B");
}

/// A deletes a note while B edits it offline. The deletion wins: B's late
/// edit is discarded and B learns about the tombstone in its next delta.
#[test]
fn deletion_beats_a_concurrent_offline_edit() {
    let (reconciler, store, _hub) = reconciler();
    let user = Uuid::new_v4();
    let id = Uuid::new_v4();

    let seed = reconciler
        .sync(
            user,
            SyncRequest {
                changes: vec![note(id, "shared", "2025-06-01T08:00:00.000Z")],
                ..SyncRequest::default()
            },
            None,
        )
        .unwrap();

    // Device A deletes.
    reconciler
        .sync(
            user,
            SyncRequest {
                deleted_ids: vec![id.to_string()],
                last_sync: Some(seed.server_timestamp.clone()),
                ..SyncRequest::default()
            },
            None,
        )
        .unwrap();

    // Device B pushes its offline edit, stamped after the delete.
    let later = wire_time::format(chrono::Utc::now() + chrono::Duration::hours(1));
    let from_b = reconciler
        .sync(
            user,
            SyncRequest {
                changes: vec![note(id, "edited after delete", &later)],
                last_sync: Some(seed.server_timestamp),
                ..SyncRequest::default()
            },
            None,
        )
        .unwrap();

    assert!(from_b.notes.is_empty());
    assert_eq!(from_b.deleted_note_ids, vec![id.to_string()]);
    assert!(store.get(user, id).is_err());
}

/// A live device receives pushes for another device's sync, and the
/// syncing device's own connection stays quiet.
#[test]
fn live_device_is_notified_of_remote_changes() {
    let (reconciler, _store, hub) = reconciler();
    let user = Uuid::new_v4();
    let (desktop, mut desktop_rx) = Connection::new(user, 8);
    let (phone, mut phone_rx) = Connection::new(user, 8);
    hub.admit(&desktop);
    hub.admit(&phone);

    let id = Uuid::new_v4();
    reconciler
        .sync(
            user,
            SyncRequest {
                changes: vec![note(id, "from the phone", "2025-06-01T12:00:00.000Z")],
                ..SyncRequest::default()
            },
            Some(phone.id),
        )
        .unwrap();

    match desktop_rx.try_recv().unwrap() {
        PushMessage::NoteCreated { note } => assert_eq!(note.id, id.to_string()),
        other => panic!("unexpected push: {other:?}"),
    }
    assert!(phone_rx.try_recv().is_err());
}

/// Users never see each other's notes, deltas, or pushes.
#[test]
fn sync_is_isolated_per_user() {
    let (reconciler, _store, hub) = reconciler();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let (bob_conn, mut bob_rx) = Connection::new(bob, 8);
    hub.admit(&bob_conn);

    reconciler
        .sync(
            alice,
            SyncRequest {
                changes: vec![note(Uuid::new_v4(), "private", "2025-06-01T12:00:00.000Z")],
                ..SyncRequest::default()
            },
            None,
        )
        .unwrap();

    let bobs = reconciler.sync(bob, SyncRequest::default(), None).unwrap();
    assert!(bobs.notes.is_empty());
    assert!(bob_rx.try_recv().is_err());
}

proptest! {
    /// Any interleaving of timestamped writes to one note converges to the
    /// write with the greatest timestamp (the first such write under the
    /// keep-stored tie-break).
    #[test]
    fn lww_converges_to_the_maximum_timestamp(
        offsets in prop::collection::vec(0u32..10_000, 1..20),
    ) {
        let (reconciler, store, _hub) = reconciler();
        let user = Uuid::new_v4();
        let id = Uuid::new_v4();
        let base = chrono::DateTime::parse_from_rfc3339("2025-06-01T00:00:00Z")
            .unwrap()
            .with_timezone(&chrono::Utc);

        let mut winner: Option<(u32, String)> = None;
        for (i, offset) in offsets.iter().enumerate() {
            let title = format!("write {i}");
            let stamp = wire_time::format(base + chrono::Duration::seconds(i64::from(*offset)));
            reconciler.sync(
                user,
                SyncRequest {
                    changes: vec![note(id, &title, &stamp)],
                    ..SyncRequest::default()
                },
                None,
            ).unwrap();

            // Strictly-greater wins; ties keep the incumbent.
            if winner.as_ref().is_none_or(|(best, _)| offset > best) {
                winner = Some((*offset, title));
            }
        }

        let stored = store.get(user, id).unwrap();
        prop_assert_eq!(stored.title, winner.unwrap().1);
    }
}
