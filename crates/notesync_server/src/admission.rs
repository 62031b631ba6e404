//! Token extraction for connection upgrades.
//!
//! Browsers cannot set an `Authorization` header on a websocket upgrade,
//! so the token may arrive through the subprotocol list instead: the
//! client offers `access_token, <token>` and the server, when it accepts,
//! echoes `access_token` back as the selected subprotocol.

use uuid::Uuid;

/// Subprotocol name under which clients smuggle the bearer token.
pub const TOKEN_SUBPROTOCOL: &str = "access_token";

/// Refusal reason: no token anywhere in the upgrade request.
pub const REASON_MISSING_TOKEN: &str = "missing token";
/// Refusal reason: the token failed signature, shape, or expiry checks.
pub const REASON_INVALID_TOKEN: &str = "invalid or expired token";
/// Refusal reason: the token was explicitly revoked.
pub const REASON_REVOKED: &str = "token has been revoked";

/// The credential-bearing parts of an upgrade request, extracted by the
/// outer framework.
#[derive(Debug, Clone, Default)]
pub struct AdmissionRequest {
    /// Offered `Sec-WebSocket-Protocol` entries, already split on commas
    /// and trimmed.
    pub subprotocols: Vec<String>,
    /// The `Authorization` header, verbatim, if present.
    pub authorization: Option<String>,
    /// The `token` query parameter, if present.
    pub query_token: Option<String>,
}

/// An accepted connection: its id (for push-exclusion bookkeeping) and
/// the subprotocol to echo back, if the token arrived that way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    /// Id of the registered connection.
    pub connection_id: Uuid,
    /// Authenticated user.
    pub user_id: Uuid,
    /// Whether `access_token` must be echoed as the selected subprotocol.
    pub echo_subprotocol: bool,
}

/// Pulls the bearer token out of an upgrade request.
///
/// Sources are tried in order: the subprotocol list, the `Authorization`
/// header, and last the `token` query parameter. The query parameter is
/// kept for old clients only; URLs end up in access logs, so its use is
/// security-logged.
///
/// Returns the token and whether it came via subprotocol.
pub fn extract_token(request: &AdmissionRequest) -> Option<(String, bool)> {
    if let [first, token, ..] = request.subprotocols.as_slice() {
        if first == TOKEN_SUBPROTOCOL && !token.is_empty() {
            return Some((token.clone(), true));
        }
    }

    if let Some(bearer) = request
        .authorization
        .as_deref()
        .and_then(|header| header.strip_prefix("Bearer "))
    {
        if !bearer.is_empty() {
            return Some((bearer.trim().to_string(), false));
        }
    }

    if let Some(token) = request.query_token.as_deref() {
        if !token.is_empty() {
            tracing::warn!("token passed as query parameter; urls leak into logs");
            return Some((token.to_string(), false));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subprotocol_wins_over_header_and_query() {
        let request = AdmissionRequest {
            subprotocols: vec![TOKEN_SUBPROTOCOL.into(), "proto-token".into()],
            authorization: Some("Bearer header-token".into()),
            query_token: Some("query-token".into()),
        };
        assert_eq!(
            extract_token(&request),
            Some(("proto-token".into(), true))
        );
    }

    #[test]
    fn bearer_header_wins_over_query() {
        let request = AdmissionRequest {
            authorization: Some("Bearer header-token".into()),
            query_token: Some("query-token".into()),
            ..AdmissionRequest::default()
        };
        assert_eq!(
            extract_token(&request),
            Some(("header-token".into(), false))
        );
    }

    #[test]
    fn query_parameter_is_the_last_resort() {
        let request = AdmissionRequest {
            query_token: Some("query-token".into()),
            ..AdmissionRequest::default()
        };
        assert_eq!(
            extract_token(&request),
            Some(("query-token".into(), false))
        );
    }

    #[test]
    fn unusable_sources_are_skipped() {
        // Wrong subprotocol convention, non-bearer header, no query.
        let request = AdmissionRequest {
            subprotocols: vec!["graphql-ws".into()],
            authorization: Some("Basic dXNlcjpwdw==".into()),
            query_token: None,
        };
        assert_eq!(extract_token(&request), None);
        assert_eq!(extract_token(&AdmissionRequest::default()), None);
    }
}
