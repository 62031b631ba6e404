//! Service-level error type.

use notesync_auth::AuthError;
use notesync_engine::EngineError;
use notesync_store::StoreError;
use thiserror::Error;

/// Result type for service operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors the outer framework maps onto transport status codes.
#[derive(Error, Debug)]
pub enum ServerError {
    /// A token or account operation failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A sync call failed.
    #[error(transparent)]
    Sync(#[from] EngineError),

    /// A connection upgrade was refused. The reason is one of the
    /// machine-readable strings in [`crate::admission`].
    #[error("connection refused: {reason}")]
    ConnectionRefused {
        /// Machine-readable refusal reason, sent to the client verbatim.
        reason: &'static str,
    },
}

impl ServerError {
    /// Returns true when the fault lies with the request (4xx territory)
    /// rather than the service (5xx).
    pub fn is_client_error(&self) -> bool {
        match self {
            ServerError::Auth(AuthError::Store(err)) => !err.is_transient(),
            ServerError::Auth(_) => true,
            ServerError::Sync(err) => !err.is_transient(),
            ServerError::ConnectionRefused { .. } => true,
        }
    }
}
