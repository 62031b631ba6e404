//! Frame transport boundary.
//!
//! The hub never touches sockets. The outer websocket layer implements
//! [`FrameReader`] and [`FrameWriter`] over its upgraded connection and
//! hands both halves to [`crate::run_connection`]. The [`memory`] module
//! provides a channel-backed pair for tests and in-process use.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// A transport-level failure. Any occurrence closes the connection.
#[derive(Error, Debug, Clone)]
#[error("transport error: {0}")]
pub struct FrameError(pub String);

/// The inbound half of a connection: yields text frames from the peer.
#[async_trait]
pub trait FrameReader: Send {
    /// Receives the next frame. `Ok(None)` means the peer closed cleanly;
    /// an error means the read failed.
    async fn recv(&mut self) -> Result<Option<String>, FrameError>;
}

/// The outbound half of a connection: writes text frames to the peer.
#[async_trait]
pub trait FrameWriter: Send {
    /// Writes one frame.
    async fn send(&mut self, frame: String) -> Result<(), FrameError>;
}

/// Channel-backed transport for tests and in-process peers.
pub mod memory {
    use super::*;

    /// Reader over an in-memory channel.
    pub struct ChannelReader(mpsc::Receiver<String>);

    /// Writer over an in-memory channel.
    pub struct ChannelWriter(mpsc::Sender<String>);

    #[async_trait]
    impl FrameReader for ChannelReader {
        async fn recv(&mut self) -> Result<Option<String>, FrameError> {
            Ok(self.0.recv().await)
        }
    }

    #[async_trait]
    impl FrameWriter for ChannelWriter {
        async fn send(&mut self, frame: String) -> Result<(), FrameError> {
            self.0
                .send(frame)
                .await
                .map_err(|_| FrameError("peer closed".into()))
        }
    }

    /// One endpoint of an in-memory duplex link.
    pub struct Endpoint {
        /// Frames arriving from the peer.
        pub reader: ChannelReader,
        /// Frames going to the peer.
        pub writer: ChannelWriter,
    }

    /// Creates a connected pair of endpoints.
    pub fn pair(capacity: usize) -> (Endpoint, Endpoint) {
        let (a_tx, b_rx) = mpsc::channel(capacity);
        let (b_tx, a_rx) = mpsc::channel(capacity);
        (
            Endpoint {
                reader: ChannelReader(a_rx),
                writer: ChannelWriter(a_tx),
            },
            Endpoint {
                reader: ChannelReader(b_rx),
                writer: ChannelWriter(b_tx),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::memory;
    use super::*;

    #[tokio::test]
    async fn memory_pair_is_duplex() {
        let (mut left, mut right) = memory::pair(4);

        left.writer.send("hello".into()).await.unwrap();
        assert_eq!(right.reader.recv().await.unwrap(), Some("hello".into()));

        right.writer.send("hi".into()).await.unwrap();
        assert_eq!(left.reader.recv().await.unwrap(), Some("hi".into()));
    }

    #[tokio::test]
    async fn dropped_peer_reads_none() {
        let (left, mut right) = memory::pair(4);
        drop(left);
        assert_eq!(right.reader.recv().await.unwrap(), None);
    }
}
