//! User identity type.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// An account. Owned by the durable store; the sync core references users
/// but never mutates them.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// User id.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// Opaque credential hash (PHC string). Produced and checked by the
    /// credential hasher, never interpreted here.
    pub password_hash: String,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Last mutation instant.
    pub updated_at: DateTime<Utc>,
}
