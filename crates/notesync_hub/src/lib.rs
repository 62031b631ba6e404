//! # NoteSync Hub
//!
//! Live-connection registry and change-notification fan-out.
//!
//! This crate provides:
//! - [`Hub`]: the per-user registry of live push channels
//! - [`PushMessage`]: the type-tagged wire envelope
//! - [`run_connection`]: the duplex per-connection pump (concurrent read
//!   and write loops joined by a bounded queue)
//!
//! ## Delivery model
//!
//! Delivery is best-effort. Every connection has a small bounded outbound
//! queue; a broadcast to a full queue drops the message for that
//! connection instead of blocking the broadcaster. A slow or disconnected
//! client is expected to re-synchronize through the sync reconciler on
//! reconnect rather than rely on guaranteed push delivery.
//!
//! The registry is the only significant in-process mutable shared state
//! in the system. It is an explicit object constructed once at startup
//! and injected wherever connections are admitted or broadcasts sent —
//! never a global.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod connection;
mod message;
mod registry;
pub mod transport;

pub use connection::{run_connection, Connection, KeepaliveConfig, DEFAULT_QUEUE_CAPACITY};
pub use message::PushMessage;
pub use registry::Hub;
pub use transport::{FrameError, FrameReader, FrameWriter};
