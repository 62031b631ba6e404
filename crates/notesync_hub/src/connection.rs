//! Per-connection state and the duplex frame pump.

use crate::message::PushMessage;
use crate::registry::Hub;
use crate::transport::{FrameReader, FrameWriter};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use uuid::Uuid;

/// Default outbound queue capacity per connection.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Handle to one live connection: its identity plus the sending side of
/// its bounded outbound queue. The receiving side is owned by the pump.
pub struct Connection {
    /// Unique id of this connection, distinct per device/tab.
    pub id: Uuid,
    /// The authenticated user behind the connection.
    pub user_id: Uuid,
    queue: mpsc::Sender<PushMessage>,
}

impl Connection {
    /// Creates a connection handle with a fresh id and a bounded queue of
    /// `capacity` messages, returning the handle and the pump's receiver.
    pub fn new(user_id: Uuid, capacity: usize) -> (Self, mpsc::Receiver<PushMessage>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Connection {
                id: Uuid::new_v4(),
                user_id,
                queue: tx,
            },
            rx,
        )
    }

    /// A clone of the outbound queue sender.
    pub fn queue(&self) -> mpsc::Sender<PushMessage> {
        self.queue.clone()
    }
}

/// Liveness timing for the pump.
///
/// The server pings every `ping_period` and expects proof of life (a
/// `pong` frame) within `pong_wait`; `ping_period` must be shorter than
/// `pong_wait` so a healthy peer always has a ping to answer before its
/// deadline lapses.
#[derive(Debug, Clone, Copy)]
pub struct KeepaliveConfig {
    /// Interval between server-sent pings.
    pub ping_period: Duration,
    /// How long the peer may stay silent before the connection is closed.
    /// Only a `pong` frame refreshes the deadline.
    pub pong_wait: Duration,
}

impl KeepaliveConfig {
    /// Creates a keepalive configuration, checking the period ordering in
    /// debug builds.
    pub fn new(ping_period: Duration, pong_wait: Duration) -> Self {
        debug_assert!(
            ping_period < pong_wait,
            "ping period must stay below pong wait"
        );
        KeepaliveConfig {
            ping_period,
            pong_wait,
        }
    }
}

impl Default for KeepaliveConfig {
    fn default() -> Self {
        KeepaliveConfig::new(Duration::from_secs(54), Duration::from_secs(60))
    }
}

fn encode(message: &PushMessage) -> Option<String> {
    match serde_json::to_string(message) {
        Ok(frame) => Some(frame),
        Err(err) => {
            tracing::error!(%err, "failed to encode push frame");
            None
        }
    }
}

/// Drives one connection until it ends. The caller registers the
/// connection with [`Hub::admit`] before handing it here; the pump owns
/// the other end of that registration and always deregisters on exit.
///
/// Two loops run concurrently under one task:
/// - **inbound**: reads frames from the peer, answering `ping` and
///   treating `pong` as proof of life; malformed frames are logged and
///   dropped without closing the connection
/// - **outbound**: drains the bounded queue to the peer and emits
///   periodic pings
///
/// Whichever loop finishes first (peer close, transport error, lapsed
/// keepalive deadline) ends the pump.
pub async fn run_connection<R, W>(
    hub: Arc<Hub>,
    connection: Connection,
    mut queue: mpsc::Receiver<PushMessage>,
    mut reader: R,
    mut writer: W,
    keepalive: KeepaliveConfig,
) where
    R: FrameReader,
    W: FrameWriter,
{
    debug_assert!(
        keepalive.ping_period < keepalive.pong_wait,
        "ping period must stay below pong wait"
    );
    let user_id = connection.user_id;
    let connection_id = connection.id;

    // Replies to peer pings go through the same queue as broadcasts so
    // the outbound loop stays the sole writer.
    let replies = connection.queue();

    let inbound = async {
        let mut deadline = Instant::now() + keepalive.pong_wait;
        loop {
            tokio::select! {
                frame = reader.recv() => match frame {
                    Ok(Some(text)) => match serde_json::from_str::<PushMessage>(&text) {
                        Ok(PushMessage::Pong) => {
                            deadline = Instant::now() + keepalive.pong_wait;
                        }
                        Ok(PushMessage::Ping) => {
                            let _ = replies.try_send(PushMessage::Pong);
                        }
                        Ok(_) => {
                            tracing::debug!(%user_id, %connection_id, "ignoring unexpected inbound frame");
                        }
                        Err(err) => {
                            tracing::debug!(%user_id, %connection_id, %err, "dropping malformed inbound frame");
                        }
                    },
                    Ok(None) => {
                        tracing::debug!(%user_id, %connection_id, "peer closed connection");
                        break;
                    }
                    Err(err) => {
                        tracing::debug!(%user_id, %connection_id, %err, "inbound read failed");
                        break;
                    }
                },
                _ = tokio::time::sleep_until(deadline) => {
                    tracing::debug!(%user_id, %connection_id, "keepalive deadline lapsed");
                    break;
                }
            }
        }
    };

    let outbound = async {
        let mut pings = tokio::time::interval_at(
            Instant::now() + keepalive.ping_period,
            keepalive.ping_period,
        );
        loop {
            tokio::select! {
                message = queue.recv() => {
                    let Some(message) = message else { break };
                    let Some(frame) = encode(&message) else { continue };
                    if writer.send(frame).await.is_err() {
                        break;
                    }
                }
                _ = pings.tick() => {
                    let Some(frame) = encode(&PushMessage::Ping) else { continue };
                    if writer.send(frame).await.is_err() {
                        break;
                    }
                }
            }
        }
    };

    tokio::select! {
        () = inbound => {}
        () = outbound => {}
    }

    hub.remove(user_id, connection_id);
    tracing::debug!(%user_id, %connection_id, "connection pump finished");
}
