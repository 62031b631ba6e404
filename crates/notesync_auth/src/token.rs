//! Token signing and verification.
//!
//! A token is `base64url(claims JSON) "." base64url(HMAC-SHA256 sig)`,
//! both parts unpadded. The signature is verified (constant-time) before
//! any claim is trusted.

use crate::claims::Claims;
use crate::error::{AuthError, AuthResult};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Signs claims into the transport form.
pub fn encode(claims: &Claims, secret: &[u8]) -> AuthResult<String> {
    let payload = serde_json::to_vec(claims).map_err(|_| AuthError::InvalidToken)?;
    let signature = sign(&payload, secret)?;
    Ok(format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(&payload),
        URL_SAFE_NO_PAD.encode(signature)
    ))
}

/// Verifies a token's signature and decodes its claims.
///
/// This checks authenticity only; kind, expiry, and revocation are the
/// caller's responsibility.
pub fn decode(token: &str, secret: &[u8]) -> AuthResult<Claims> {
    let (payload_b64, signature_b64) = token.split_once('.').ok_or(AuthError::InvalidToken)?;

    let payload = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| AuthError::InvalidToken)?;
    let signature = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| AuthError::InvalidToken)?;

    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| AuthError::InvalidToken)?;
    mac.update(&payload);
    mac.verify_slice(&signature)
        .map_err(|_| AuthError::InvalidToken)?;

    serde_json::from_slice(&payload).map_err(|_| AuthError::InvalidToken)
}

fn sign(payload: &[u8], secret: &[u8]) -> AuthResult<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| AuthError::InvalidToken)?;
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}
