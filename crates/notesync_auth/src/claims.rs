//! Token claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived request credential.
    Access,
    /// Long-lived, single-use rotation credential.
    Refresh,
}

/// The signed payload of a token.
///
/// An explicit struct rather than a claim map, so a required field can
/// never silently be absent. Field names follow the registered-claim
/// convention; instants travel as unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Unique id of this issuance; the revocation key.
    #[serde(rename = "jti")]
    pub token_id: Uuid,
    /// The user this token authenticates.
    #[serde(rename = "sub")]
    pub subject: Uuid,
    /// Access or refresh.
    #[serde(rename = "typ")]
    pub kind: TokenKind,
    /// Issue instant; compared against revoke-all cutoffs.
    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,
    /// Expiry instant.
    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

impl Claims {
    /// Builds claims for a fresh issuance of the given kind.
    pub fn new(subject: Uuid, kind: TokenKind, issued_at: DateTime<Utc>, ttl: chrono::Duration) -> Self {
        Self {
            token_id: Uuid::new_v4(),
            subject,
            kind,
            issued_at,
            expires_at: issued_at + ttl,
        }
    }

    /// Returns true if the token is past its expiry at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
