//! Auth error taxonomy.

use notesync_store::StoreError;
use thiserror::Error;

/// Result type for auth operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors surfaced by the token service and account operations.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Unknown user or wrong password. Deliberately indistinguishable.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Registration against a taken username.
    #[error("username already exists")]
    UserExists,

    /// Malformed or forged token, or the wrong token kind. Reject
    /// immediately; retrying cannot help.
    #[error("invalid token")]
    InvalidToken,

    /// The token is past its expiry. An access token in this state should
    /// be refreshed, not re-authenticated.
    #[error("token expired")]
    TokenExpired,

    /// The token id is blacklisted or the token predates a revoke-all
    /// cutoff. Forces full re-authentication.
    #[error("token revoked")]
    TokenRevoked,

    /// A new password failed the complexity policy.
    #[error("weak password: {0}")]
    WeakPassword(#[from] crate::password::PasswordError),

    /// The presented current password is wrong.
    #[error("current password is incorrect")]
    PasswordMismatch,

    /// Credential hasher failure.
    #[error("credential hasher failure: {0}")]
    Hasher(String),

    /// Durable-store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthError {
    /// Returns true when the caller must discard its session and fully
    /// re-authenticate; false for [`AuthError::TokenExpired`], which an
    /// access-token caller should answer with a refresh attempt instead.
    pub fn requires_reauth(&self) -> bool {
        matches!(self, AuthError::TokenRevoked | AuthError::InvalidToken)
    }
}
