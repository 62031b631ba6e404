//! The token service.

use crate::claims::{Claims, TokenKind};
use crate::error::{AuthError, AuthResult};
use crate::hasher::CredentialHasher;
use crate::password::PasswordPolicy;
use crate::token;
use chrono::{DateTime, Duration, Utc};
use notesync_model::User;
use notesync_store::{RevocationStore, StoreError, UserStore};
use std::sync::Arc;
use uuid::Uuid;

/// Token service configuration.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// HMAC signing secret.
    pub secret: Vec<u8>,
    /// Access-token lifetime.
    pub access_ttl: Duration,
    /// Refresh-token lifetime.
    pub refresh_ttl: Duration,
}

impl TokenConfig {
    /// Creates a configuration with the default lifetimes (60-minute
    /// access, 7-day refresh).
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            access_ttl: Duration::minutes(60),
            refresh_ttl: Duration::days(7),
        }
    }

    /// Sets the access-token lifetime.
    pub fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_ttl = ttl;
        self
    }

    /// Sets the refresh-token lifetime.
    pub fn with_refresh_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_ttl = ttl;
        self
    }
}

/// An issued access/refresh pair.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TokenPair {
    /// The short-lived request credential.
    pub access_token: String,
    /// The single-use rotation credential.
    pub refresh_token: String,
    /// Seconds until the access token expires.
    pub expires_in: u64,
}

/// Issues, validates, rotates, and revokes bearer-token pairs, and runs
/// the account operations that hand tokens out.
///
/// Stateless per request: all revocation state lives in the
/// [`RevocationStore`], so any number of service instances over the same
/// store agree.
pub struct AuthService<U, R, H> {
    users: Arc<U>,
    revocations: Arc<R>,
    hasher: H,
    config: TokenConfig,
    policy: PasswordPolicy,
}

impl<U, R, H> AuthService<U, R, H>
where
    U: UserStore,
    R: RevocationStore,
    H: CredentialHasher,
{
    /// Creates a token service with the default password policy.
    pub fn new(users: Arc<U>, revocations: Arc<R>, hasher: H, config: TokenConfig) -> Self {
        Self {
            users,
            revocations,
            hasher,
            config,
            policy: PasswordPolicy::default(),
        }
    }

    /// Overrides the password policy.
    pub fn with_policy(mut self, policy: PasswordPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Issues a fresh access/refresh pair for `user_id`. Each token
    /// carries its own unique id.
    pub fn issue_pair(&self, user_id: Uuid) -> AuthResult<TokenPair> {
        let now = Utc::now();
        let access = Claims::new(user_id, TokenKind::Access, now, self.config.access_ttl);
        let refresh = Claims::new(user_id, TokenKind::Refresh, now, self.config.refresh_ttl);

        Ok(TokenPair {
            access_token: token::encode(&access, &self.config.secret)?,
            refresh_token: token::encode(&refresh, &self.config.secret)?,
            expires_in: self.config.access_ttl.num_seconds().max(0) as u64,
        })
    }

    /// Validates an access token and returns its subject.
    pub fn validate_access(&self, token: &str) -> AuthResult<Uuid> {
        self.validate(token, TokenKind::Access)
    }

    /// Validates a refresh token and returns its subject.
    pub fn validate_refresh(&self, token: &str) -> AuthResult<Uuid> {
        self.validate(token, TokenKind::Refresh)
    }

    fn validate(&self, token: &str, kind: TokenKind) -> AuthResult<Uuid> {
        let claims = token::decode(token, &self.config.secret)?;
        if claims.kind != kind {
            return Err(AuthError::InvalidToken);
        }
        if claims.is_expired(Utc::now()) {
            return Err(AuthError::TokenExpired);
        }
        self.check_revocation(&claims)?;
        Ok(claims.subject)
    }

    /// Checks blacklist and revoke-all state. Signature and expiry being
    /// fine is never enough on its own.
    fn check_revocation(&self, claims: &Claims) -> AuthResult<()> {
        match self.revocations.is_revoked(claims.token_id) {
            Ok(true) => {
                tracing::warn!(user_id = %claims.subject, "revoked token presented");
                return Err(AuthError::TokenRevoked);
            }
            Ok(false) => {}
            // Fail open on a blacklist outage: an otherwise-valid token
            // keeps working while revocation state is unreachable.
            Err(StoreError::Unavailable(reason)) => {
                tracing::warn!(%reason, "blacklist unavailable, skipping revocation check");
            }
            Err(err) => return Err(err.into()),
        }

        match self.revocations.revoke_all_cutoff(claims.subject) {
            Ok(Some(cutoff)) if claims.issued_at < cutoff => {
                tracing::warn!(user_id = %claims.subject, "token predates revoke-all cutoff");
                Err(AuthError::TokenRevoked)
            }
            Ok(_) => Ok(()),
            Err(StoreError::Unavailable(reason)) => {
                tracing::warn!(%reason, "blacklist unavailable, skipping cutoff check");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Rotates a refresh token: validates it, issues a new pair, and
    /// blacklists the old refresh token's id (single use). The access
    /// token that was paired with it is left to expire naturally.
    pub fn rotate_pair(&self, refresh_token: &str) -> AuthResult<TokenPair> {
        let claims = token::decode(refresh_token, &self.config.secret)?;
        if claims.kind != TokenKind::Refresh {
            return Err(AuthError::InvalidToken);
        }
        if claims.is_expired(Utc::now()) {
            return Err(AuthError::TokenExpired);
        }
        self.check_revocation(&claims)?;

        let pair = self.issue_pair(claims.subject)?;

        if let Err(err) =
            self.revocations
                .revoke(claims.token_id, claims.subject, claims.expires_at)
        {
            // The new pair is already out; losing the blacklist row only
            // extends the old token's life until its own expiry.
            tracing::error!(%err, user_id = %claims.subject, "failed to blacklist rotated refresh token");
        }

        Ok(pair)
    }

    /// Blacklists one token's id (logout of one session). Tolerant:
    /// malformed or forged tokens are ignored rather than reported, so
    /// logout never fails because a token was already dead.
    pub fn revoke_one(&self, token: &str) -> AuthResult<()> {
        let Ok(claims) = token::decode(token, &self.config.secret) else {
            return Ok(());
        };
        self.revocations
            .revoke(claims.token_id, claims.subject, claims.expires_at)?;
        tracing::info!(user_id = %claims.subject, kind = ?claims.kind, "token revoked");
        Ok(())
    }

    /// Records a revoke-all marker: every token of `user_id` issued before
    /// `cutoff` becomes invalid regardless of its own expiry.
    pub fn revoke_all(&self, user_id: Uuid, cutoff: DateTime<Utc>) -> AuthResult<()> {
        self.revocations.revoke_all(user_id, cutoff)?;
        tracing::info!(%user_id, %cutoff, "all tokens revoked");
        Ok(())
    }

    /// Sweeps expired blacklist rows. Pure garbage collection; the expiry
    /// check already rejects anything an expired row would.
    pub fn cleanup_expired(&self, now: DateTime<Utc>) -> AuthResult<usize> {
        Ok(self.revocations.cleanup_expired(now)?)
    }

    /// Creates an account and issues its first token pair.
    pub fn register(&self, username: &str, password: &str) -> AuthResult<(User, TokenPair)> {
        self.policy.validate(password)?;

        match self.users.get_by_username(username) {
            Ok(_) => {
                tracing::warn!(%username, "registration against existing username");
                return Err(AuthError::UserExists);
            }
            Err(StoreError::NotFound) => {}
            Err(err) => return Err(err.into()),
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: self.hasher.hash(password)?,
            created_at: now,
            updated_at: now,
        };

        match self.users.create_user(user.clone()) {
            Ok(()) => {}
            Err(StoreError::AlreadyExists) => return Err(AuthError::UserExists),
            Err(err) => return Err(err.into()),
        }

        let pair = self.issue_pair(user.id)?;
        tracing::info!(user_id = %user.id, %username, "user registered");
        Ok((user, pair))
    }

    /// Verifies credentials and issues a token pair.
    pub fn login(&self, username: &str, password: &str) -> AuthResult<(User, TokenPair)> {
        let user = match self.users.get_by_username(username) {
            Ok(user) => user,
            Err(StoreError::NotFound) => {
                tracing::warn!(%username, "login for unknown username");
                return Err(AuthError::InvalidCredentials);
            }
            Err(err) => return Err(err.into()),
        };

        if !self.hasher.verify(password, &user.password_hash)? {
            tracing::warn!(%username, "login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let pair = self.issue_pair(user.id)?;
        tracing::info!(user_id = %user.id, %username, "login succeeded");
        Ok((user, pair))
    }

    /// Changes a password after verifying the current one, then revokes
    /// every outstanding token for the user.
    pub fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> AuthResult<()> {
        self.policy.validate(new_password)?;

        let user = self.users.get_by_id(user_id)?;
        if !self.hasher.verify(current_password, &user.password_hash)? {
            tracing::warn!(%user_id, "password change with wrong current password");
            return Err(AuthError::PasswordMismatch);
        }

        let new_hash = self.hasher.hash(new_password)?;
        self.users.update_password(user_id, new_hash)?;
        self.revoke_all(user_id, Utc::now())?;
        tracing::info!(%user_id, "password changed");
        Ok(())
    }
}
