//! The composed service façade.

use crate::admission::{self, Admission, AdmissionRequest};
use crate::config::Config;
use crate::error::{ServerError, ServerResult};
use chrono::{DateTime, Utc};
use notesync_auth::{AuthError, AuthService, CredentialHasher, TokenConfig, TokenPair};
use notesync_engine::Reconciler;
use notesync_hub::{run_connection, Connection, FrameReader, FrameWriter, Hub};
use notesync_model::{SyncRequest, SyncResponse, UserDto};
use notesync_store::{NoteStore, RevocationStore, UserStore};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Response to a successful registration or login.
#[derive(Debug, Clone, Serialize)]
pub struct SessionTokens {
    /// The authenticated account.
    pub user: UserDto,
    /// The issued pair.
    #[serde(flatten)]
    pub tokens: TokenPair,
}

/// Response to a successful refresh; `token_type` tells the client how to
/// present the access token.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshedTokens {
    /// The rotated pair.
    #[serde(flatten)]
    pub tokens: TokenPair,
    /// Always `"Bearer"`.
    pub token_type: &'static str,
}

/// The service core: accounts and tokens, sync, and live push, composed
/// over one store.
///
/// Constructed once at startup and shared by reference with every
/// request handler; all per-user state lives in the store and the hub.
pub struct NoteServer<S, H> {
    auth: AuthService<S, S, H>,
    reconciler: Reconciler<S>,
    hub: Arc<Hub>,
    config: Config,
}

impl<S, H> NoteServer<S, H>
where
    S: NoteStore + UserStore + RevocationStore + 'static,
    H: CredentialHasher,
{
    /// Wires the service over `store` with the given credential hasher.
    pub fn new(store: Arc<S>, hasher: H, config: Config) -> Self {
        let token_config = TokenConfig::new(config.token_secret.clone())
            .with_access_ttl(config.access_ttl)
            .with_refresh_ttl(config.refresh_ttl);
        let hub = Arc::new(Hub::new());
        NoteServer {
            auth: AuthService::new(Arc::clone(&store), Arc::clone(&store), hasher, token_config),
            reconciler: Reconciler::new(store, Arc::clone(&hub)),
            hub,
            config,
        }
    }

    /// The connection registry, for framework-level introspection.
    pub fn hub(&self) -> &Arc<Hub> {
        &self.hub
    }

    /// The active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolves a bearer access token to its user. Request middleware
    /// calls this once per authenticated route.
    pub fn authenticate(&self, access_token: &str) -> ServerResult<Uuid> {
        Ok(self.auth.validate_access(access_token)?)
    }

    /// Creates an account and signs it in.
    pub fn register(&self, username: &str, password: &str) -> ServerResult<SessionTokens> {
        let (user, tokens) = self.auth.register(username, password)?;
        Ok(SessionTokens {
            user: UserDto::from(&user),
            tokens,
        })
    }

    /// Verifies credentials and issues a fresh pair.
    pub fn login(&self, username: &str, password: &str) -> ServerResult<SessionTokens> {
        let (user, tokens) = self.auth.login(username, password)?;
        Ok(SessionTokens {
            user: UserDto::from(&user),
            tokens,
        })
    }

    /// Rotates a refresh token into a new pair.
    pub fn refresh(&self, refresh_token: &str) -> ServerResult<RefreshedTokens> {
        let tokens = self.auth.rotate_pair(refresh_token)?;
        Ok(RefreshedTokens {
            tokens,
            token_type: "Bearer",
        })
    }

    /// Signs one session out by blacklisting its tokens. Tolerant of
    /// already-dead tokens, so repeated logout is safe.
    pub fn logout(&self, access_token: &str, refresh_token: Option<&str>) -> ServerResult<()> {
        self.auth.revoke_one(access_token)?;
        if let Some(refresh_token) = refresh_token {
            self.auth.revoke_one(refresh_token)?;
        }
        Ok(())
    }

    /// Signs every session of `user_id` out at once.
    pub fn logout_all(&self, user_id: Uuid) -> ServerResult<()> {
        Ok(self.auth.revoke_all(user_id, Utc::now())?)
    }

    /// Changes the password and invalidates every outstanding token.
    pub fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> ServerResult<()> {
        Ok(self
            .auth
            .change_password(user_id, current_password, new_password)?)
    }

    /// Runs one sync call for an authenticated user. `origin` identifies
    /// the live connection the request belongs to, if any, so that device
    /// is not notified of its own edits.
    pub fn sync(
        &self,
        user_id: Uuid,
        request: SyncRequest,
        origin: Option<Uuid>,
    ) -> ServerResult<SyncResponse> {
        Ok(self.reconciler.sync(user_id, request, origin)?)
    }

    /// Sweeps expired revocation rows; see [`crate::spawn_cleanup`].
    pub fn sweep_revocations(&self, now: DateTime<Utc>) -> ServerResult<usize> {
        Ok(self.auth.cleanup_expired(now)?)
    }

    /// Validates an upgrade request, registers the connection, and spawns
    /// its pump over the given transport halves.
    ///
    /// The connection is live in the hub when this returns; the refusal
    /// reasons are the machine-readable strings in [`crate::admission`].
    pub fn admit_connection<R, W>(
        &self,
        request: &AdmissionRequest,
        reader: R,
        writer: W,
    ) -> ServerResult<Admission>
    where
        R: FrameReader + 'static,
        W: FrameWriter + 'static,
    {
        let Some((token, via_subprotocol)) = admission::extract_token(request) else {
            return Err(ServerError::ConnectionRefused {
                reason: admission::REASON_MISSING_TOKEN,
            });
        };

        let user_id = match self.auth.validate_access(&token) {
            Ok(user_id) => user_id,
            Err(AuthError::TokenRevoked) => {
                return Err(ServerError::ConnectionRefused {
                    reason: admission::REASON_REVOKED,
                })
            }
            Err(AuthError::InvalidToken | AuthError::TokenExpired) => {
                return Err(ServerError::ConnectionRefused {
                    reason: admission::REASON_INVALID_TOKEN,
                })
            }
            Err(err) => return Err(err.into()),
        };

        let (connection, queue) = Connection::new(user_id, self.config.queue_capacity);
        let connection_id = connection.id;
        self.hub.admit(&connection);
        tokio::spawn(run_connection(
            Arc::clone(&self.hub),
            connection,
            queue,
            reader,
            writer,
            self.config.keepalive,
        ));

        tracing::info!(%user_id, %connection_id, "connection established");
        Ok(Admission {
            connection_id,
            user_id,
            echo_subprotocol: via_subprotocol,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notesync_auth::AuthResult;
    use notesync_hub::transport::memory;
    use notesync_hub::PushMessage;
    use notesync_model::NoteDto;
    use notesync_store::MemoryStore;

    const PASSWORD: &str = "Str0ng!Passw0rd";

    // RUST_LOG=debug surfaces pump and broadcast traces when a test fails.
    fn init_logging() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    /// Reversible stand-in hasher; the real argon2 hasher is exercised in
    /// its own crate.
    struct PlainHasher;

    impl CredentialHasher for PlainHasher {
        fn hash(&self, password: &str) -> AuthResult<String> {
            Ok(format!("plain:{password}"))
        }

        fn verify(&self, password: &str, hash: &str) -> AuthResult<bool> {
            Ok(hash == format!("plain:{password}"))
        }
    }

    fn server() -> NoteServer<MemoryStore, PlainHasher> {
        NoteServer::new(
            Arc::new(MemoryStore::new()),
            PlainHasher,
            Config::development("test-secret"),
        )
    }

    fn note(title: &str) -> NoteDto {
        NoteDto {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            content: String::new(),
            note_type: "note".into(),
            is_pinned: false,
            is_archived: false,
            sort_order: 0,
            created_at: "2025-06-01T00:00:00.000Z".into(),
            updated_at: "2025-06-01T00:00:00.000Z".into(),
            checklist_items: None,
        }
    }

    #[test]
    fn register_login_refresh_logout_round_trip() {
        let server = server();

        let session = server.register("ada", PASSWORD).unwrap();
        assert_eq!(session.user.username, "ada");
        let user_id = server.authenticate(&session.tokens.access_token).unwrap();
        assert_eq!(user_id.to_string(), session.user.id);

        let session = server.login("ada", PASSWORD).unwrap();
        let refreshed = server.refresh(&session.tokens.refresh_token).unwrap();
        assert_eq!(refreshed.token_type, "Bearer");
        server
            .authenticate(&refreshed.tokens.access_token)
            .unwrap();

        server
            .logout(
                &refreshed.tokens.access_token,
                Some(&refreshed.tokens.refresh_token),
            )
            .unwrap();
        assert!(matches!(
            server.authenticate(&refreshed.tokens.access_token),
            Err(ServerError::Auth(AuthError::TokenRevoked))
        ));
        // Logout is idempotent.
        server
            .logout(&refreshed.tokens.access_token, None)
            .unwrap();
    }

    #[test]
    fn logout_all_invalidates_every_session() {
        let server = server();
        let first = server.register("ada", PASSWORD).unwrap();
        let second = server.login("ada", PASSWORD).unwrap();
        let user_id = server.authenticate(&first.tokens.access_token).unwrap();

        server.logout_all(user_id).unwrap();

        assert!(server.authenticate(&first.tokens.access_token).is_err());
        assert!(server.authenticate(&second.tokens.access_token).is_err());
    }

    #[test]
    fn change_password_requires_the_current_one() {
        let server = server();
        let session = server.register("ada", PASSWORD).unwrap();
        let user_id = server.authenticate(&session.tokens.access_token).unwrap();

        assert!(matches!(
            server.change_password(user_id, "wrong-guess-0!A", "An0ther!Secret9"),
            Err(ServerError::Auth(AuthError::PasswordMismatch))
        ));

        server
            .change_password(user_id, PASSWORD, "An0ther!Secret9")
            .unwrap();
        // The old session died with the password.
        assert!(server.authenticate(&session.tokens.access_token).is_err());
        server.login("ada", "An0ther!Secret9").unwrap();
    }

    #[test]
    fn sync_flows_through_the_facade() {
        let server = server();
        let session = server.register("ada", PASSWORD).unwrap();
        let user_id = server.authenticate(&session.tokens.access_token).unwrap();

        let response = server
            .sync(
                user_id,
                SyncRequest {
                    changes: vec![note("hello")],
                    ..SyncRequest::default()
                },
                None,
            )
            .unwrap();
        assert_eq!(response.notes.len(), 1);
    }

    #[tokio::test]
    async fn admission_registers_a_live_connection() {
        init_logging();
        let server = server();
        let session = server.register("ada", PASSWORD).unwrap();
        let user_id = server.authenticate(&session.tokens.access_token).unwrap();
        let (endpoint, mut client) = memory::pair(8);

        let request = AdmissionRequest {
            subprotocols: vec![
                admission::TOKEN_SUBPROTOCOL.into(),
                session.tokens.access_token.clone(),
            ],
            ..AdmissionRequest::default()
        };
        let admitted = server
            .admit_connection(&request, endpoint.reader, endpoint.writer)
            .unwrap();
        assert_eq!(admitted.user_id, user_id);
        assert!(admitted.echo_subprotocol);
        assert_eq!(server.hub().connection_count(user_id), 1);

        // A sync from "another device" reaches the live connection.
        server
            .sync(user_id, SyncRequest {
                changes: vec![note("pushed")],
                ..SyncRequest::default()
            }, None)
            .unwrap();
        let frame = client.reader.recv().await.unwrap().unwrap();
        let message: PushMessage = serde_json::from_str(&frame).unwrap();
        assert!(matches!(message, PushMessage::NoteCreated { .. }));
    }

    #[tokio::test]
    async fn admission_refusal_reasons() {
        init_logging();
        let server = server();
        let session = server.register("ada", PASSWORD).unwrap();

        let (endpoint, _client) = memory::pair(8);
        let missing = server
            .admit_connection(&AdmissionRequest::default(), endpoint.reader, endpoint.writer)
            .unwrap_err();
        assert!(matches!(
            missing,
            ServerError::ConnectionRefused {
                reason: admission::REASON_MISSING_TOKEN
            }
        ));

        let (endpoint, _client) = memory::pair(8);
        let forged = server
            .admit_connection(
                &AdmissionRequest {
                    authorization: Some("Bearer not.a.token".into()),
                    ..AdmissionRequest::default()
                },
                endpoint.reader,
                endpoint.writer,
            )
            .unwrap_err();
        assert!(matches!(
            forged,
            ServerError::ConnectionRefused {
                reason: admission::REASON_INVALID_TOKEN
            }
        ));

        server
            .logout(&session.tokens.access_token, None)
            .unwrap();
        let (endpoint, _client) = memory::pair(8);
        let revoked = server
            .admit_connection(
                &AdmissionRequest {
                    authorization: Some(format!("Bearer {}", session.tokens.access_token)),
                    ..AdmissionRequest::default()
                },
                endpoint.reader,
                endpoint.writer,
            )
            .unwrap_err();
        assert!(matches!(
            revoked,
            ServerError::ConnectionRefused {
                reason: admission::REASON_REVOKED
            }
        ));
    }
}
