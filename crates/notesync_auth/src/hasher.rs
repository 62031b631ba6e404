//! Credential hashing.
//!
//! The hash algorithm is an opaque collaborator behind the
//! [`CredentialHasher`] trait; the token service only ever sees PHC
//! strings. [`Argon2Hasher`] is the default implementation.

use crate::error::{AuthError, AuthResult};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Hashes and verifies login credentials.
pub trait CredentialHasher: Send + Sync {
    /// Hashes a password into a self-describing PHC string.
    fn hash(&self, password: &str) -> AuthResult<String>;

    /// Verifies a password against a stored PHC string.
    fn verify(&self, password: &str, hash: &str) -> AuthResult<bool>;
}

/// Argon2id-backed hasher with default parameters.
#[derive(Default)]
pub struct Argon2Hasher {
    inner: Argon2<'static>,
}

impl Argon2Hasher {
    /// Creates a hasher with the crate-default Argon2id parameters.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.inner
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| AuthError::Hasher(err.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> AuthResult<bool> {
        let parsed = PasswordHash::new(hash).map_err(|err| AuthError::Hasher(err.to_string()))?;
        Ok(self
            .inner
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}
