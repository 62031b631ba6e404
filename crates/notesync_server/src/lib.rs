//! # NoteSync Server
//!
//! The backend service core: wires the token service, sync reconciler,
//! and connection hub together behind one façade the outer HTTP/websocket
//! framework calls into.
//!
//! This crate provides:
//! - [`Config`]: environment-driven configuration with development
//!   defaults and a production guard on the signing secret
//! - [`NoteServer`]: the composed service (accounts, tokens, sync, push)
//! - [`admission`]: bearer-token extraction for connection upgrades
//! - [`spawn_cleanup`]: the periodic blacklist sweep task
//!
//! Routing, TLS, CORS, and rate limiting stay in the outer framework;
//! everything here is transport-agnostic.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod admission;
mod cleanup;
mod config;
mod error;
mod server;

pub use cleanup::spawn_cleanup;
pub use config::{Config, ConfigError, Environment};
pub use error::{ServerError, ServerResult};
pub use server::{NoteServer, RefreshedTokens, SessionTokens};
