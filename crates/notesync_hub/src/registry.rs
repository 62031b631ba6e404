//! The connection registry.

use crate::connection::Connection;
use crate::message::PushMessage;
use parking_lot::RwLock;
use std::collections::HashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Registry of live push channels, keyed by user then connection id.
///
/// Reads (broadcast iteration) are frequent; writes (admit/remove) are
/// rare, so the map sits behind a reader/writer lock. Broadcast never
/// blocks: it enqueues with `try_send` and drops on a full queue.
#[derive(Default)]
pub struct Hub {
    connections: RwLock<HashMap<Uuid, HashMap<Uuid, mpsc::Sender<PushMessage>>>>,
}

impl Hub {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection's outbound queue.
    ///
    /// Callers must only admit connections whose bearer token has already
    /// passed access validation; the registry itself never sees
    /// credentials. A connection is never registered pre-authentication.
    pub fn admit(&self, connection: &Connection) {
        let mut connections = self.connections.write();
        connections
            .entry(connection.user_id)
            .or_default()
            .insert(connection.id, connection.queue());
        tracing::debug!(user_id = %connection.user_id, connection_id = %connection.id, "connection admitted");
    }

    /// Deregisters a connection and releases its queue. Idempotent:
    /// removing an unknown connection is a no-op.
    pub fn remove(&self, user_id: Uuid, connection_id: Uuid) {
        let mut connections = self.connections.write();
        if let Some(user_connections) = connections.get_mut(&user_id) {
            if user_connections.remove(&connection_id).is_some() {
                tracing::debug!(%user_id, %connection_id, "connection removed");
            }
            if user_connections.is_empty() {
                connections.remove(&user_id);
            }
        }
    }

    /// Delivers `message` to every registered connection of `user_id`
    /// except `exclude` (the originating device, so it does not receive an
    /// echo of its own edit).
    ///
    /// Best-effort: a full queue drops the message for that connection —
    /// the client recovers through its next sync. Returns the number of
    /// connections the message was enqueued for.
    pub fn broadcast(&self, user_id: Uuid, message: &PushMessage, exclude: Option<Uuid>) -> usize {
        let connections = self.connections.read();
        let Some(user_connections) = connections.get(&user_id) else {
            return 0;
        };

        let mut delivered = 0;
        for (connection_id, queue) in user_connections {
            if Some(*connection_id) == exclude {
                continue;
            }
            match queue.try_send(message.clone()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::debug!(%user_id, %connection_id, "outbound queue full, dropping push");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    // Pump already exited; remove will catch up shortly.
                    tracing::debug!(%user_id, %connection_id, "push to closing connection dropped");
                }
            }
        }
        delivered
    }

    /// Number of live connections for one user.
    pub fn connection_count(&self, user_id: Uuid) -> usize {
        self.connections
            .read()
            .get(&user_id)
            .map_or(0, HashMap::len)
    }

    /// Total live connections across all users.
    pub fn total_connections(&self) -> usize {
        self.connections.read().values().map(HashMap::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admit_and_remove() {
        let hub = Hub::new();
        let user = Uuid::new_v4();
        let (conn, _rx) = Connection::new(user, 4);

        hub.admit(&conn);
        assert_eq!(hub.connection_count(user), 1);
        assert_eq!(hub.total_connections(), 1);

        hub.remove(user, conn.id);
        assert_eq!(hub.connection_count(user), 0);
        assert_eq!(hub.total_connections(), 0);

        // Idempotent.
        hub.remove(user, conn.id);
        hub.remove(Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(hub.total_connections(), 0);
    }

    #[tokio::test]
    async fn broadcast_excludes_originator() {
        let hub = Hub::new();
        let user = Uuid::new_v4();
        let (origin, mut origin_rx) = Connection::new(user, 4);
        let (other, mut other_rx) = Connection::new(user, 4);
        hub.admit(&origin);
        hub.admit(&other);

        let delivered = hub.broadcast(user, &PushMessage::Ping, Some(origin.id));
        assert_eq!(delivered, 1);
        assert_eq!(other_rx.recv().await, Some(PushMessage::Ping));
        assert!(origin_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn broadcast_reaches_every_other_connection() {
        let hub = Hub::new();
        let user = Uuid::new_v4();
        let (origin, _origin_rx) = Connection::new(user, 4);
        let mut receivers = Vec::new();
        hub.admit(&origin);
        for _ in 0..3 {
            let (conn, rx) = Connection::new(user, 4);
            hub.admit(&conn);
            receivers.push(rx);
        }

        let delivered = hub.broadcast(user, &PushMessage::Ping, Some(origin.id));
        assert_eq!(delivered, 3);
        for rx in &mut receivers {
            assert_eq!(rx.recv().await, Some(PushMessage::Ping));
        }
    }

    #[test]
    fn broadcast_is_scoped_to_user() {
        let hub = Hub::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let (conn, mut rx) = Connection::new(bob, 4);
        hub.admit(&conn);

        assert_eq!(hub.broadcast(alice, &PushMessage::Ping, None), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn full_queue_drops_instead_of_blocking() {
        let hub = Hub::new();
        let user = Uuid::new_v4();
        let (conn, _rx) = Connection::new(user, 1);
        hub.admit(&conn);

        assert_eq!(hub.broadcast(user, &PushMessage::Ping, None), 1);
        // Queue of one is now full; the next push is dropped, not queued.
        assert_eq!(hub.broadcast(user, &PushMessage::Ping, None), 0);
    }
}
