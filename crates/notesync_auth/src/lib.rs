//! # NoteSync Auth
//!
//! Bearer-token lifecycle service for NoteSync.
//!
//! This crate provides:
//! - An explicit [`Claims`] struct (subject, token id, kind, issue and
//!   expiry instants) signed with HMAC-SHA256
//! - [`AuthService`]: issue, validate, rotate, and revoke token pairs
//! - Revocation via a per-token blacklist and per-user revoke-all cutoffs
//! - Account operations the token contract serves: register, login,
//!   password change
//!
//! ## Token model
//!
//! Access tokens are short-lived and never individually rotated; refresh
//! tokens are single-use — each successful rotation issues a new pair and
//! blacklists the old refresh token's id. A token's validity is always
//! re-checked against revocation state even when its signature and expiry
//! are valid.
//!
//! The error taxonomy is part of the contract: [`AuthError::TokenExpired`]
//! means "refresh and retry", while [`AuthError::TokenRevoked`] and
//! [`AuthError::InvalidToken`] force full re-authentication.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod claims;
mod error;
mod hasher;
pub mod password;
mod service;
mod token;

pub use claims::{Claims, TokenKind};
pub use error::{AuthError, AuthResult};
pub use hasher::{Argon2Hasher, CredentialHasher};
pub use service::{AuthService, TokenConfig, TokenPair};
