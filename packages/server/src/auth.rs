//! Connection authentication gate.
//!
//! Validates the signed bearer credential presented on the WebSocket
//! handshake. A credential is `base64url(claims).base64url(mac)` where the
//! MAC is HMAC-SHA256 over the claims JSON with the process-wide secret,
//! and the claims carry the subject user id and an expiry. Verification is
//! a pure function of (credential, secret): no storage round-trip, no side
//! effects.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use crate::domain::UserId;

type HmacSha256 = Hmac<Sha256>;

/// How long the connection handshake may wait on credential verification
/// before the connection is refused.
pub const AUTH_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

/// The authenticated subject bound to a connection for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
}

/// Why a credential was refused. Fatal to the connection: the transport is
/// closed and no state is created.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("no credential presented during handshake")]
    Missing,
    #[error("credential failed verification or has expired")]
    Invalid,
    #[error("credential verification did not resolve in time")]
    Timeout,
}

/// Signed claims carried inside a credential.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject user id.
    sub: i64,
    /// Expiry, Unix timestamp in seconds.
    exp: i64,
}

/// Validates bearer credentials against the process-wide secret.
pub struct TokenVerifier {
    secret: Vec<u8>,
}

impl TokenVerifier {
    /// Create a verifier for the given shared secret. Loaded once at
    /// startup, never mutated.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Verify a presented credential and resolve the identity it names.
    pub fn verify(&self, credential: Option<&str>) -> Result<Identity, AuthError> {
        let credential = credential.filter(|c| !c.is_empty()).ok_or(AuthError::Missing)?;

        let (claims_part, mac_part) = credential.split_once('.').ok_or(AuthError::Invalid)?;
        let claims_bytes = URL_SAFE_NO_PAD
            .decode(claims_part)
            .map_err(|_| AuthError::Invalid)?;
        let mac_bytes = URL_SAFE_NO_PAD
            .decode(mac_part)
            .map_err(|_| AuthError::Invalid)?;

        let mut mac = HmacSha256::new_from_slice(&self.secret).map_err(|_| AuthError::Invalid)?;
        mac.update(&claims_bytes);
        // Constant-time comparison.
        mac.verify_slice(&mac_bytes).map_err(|_| AuthError::Invalid)?;

        let claims: Claims =
            serde_json::from_slice(&claims_bytes).map_err(|_| AuthError::Invalid)?;
        if claims.exp < chrono::Utc::now().timestamp() {
            return Err(AuthError::Invalid);
        }

        Ok(Identity {
            user_id: UserId::new(claims.sub),
        })
    }
}

/// Mint a credential for a user, valid for `ttl`.
///
/// The production issuer lives in the identity service; this helper exists
/// for tests and local development tooling.
pub fn issue_token(secret: &[u8], user_id: i64, ttl: std::time::Duration) -> String {
    let claims = Claims {
        sub: user_id,
        exp: chrono::Utc::now().timestamp() + ttl.as_secs() as i64,
    };
    sign_claims(secret, &claims)
}

fn sign_claims(secret: &[u8], claims: &Claims) -> String {
    let claims_bytes = serde_json::to_vec(claims).unwrap_or_default();
    // HMAC accepts any key length; the fallback arm is unreachable.
    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return String::new();
    };
    mac.update(&claims_bytes);
    let tag = mac.finalize().into_bytes();
    format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(&claims_bytes),
        URL_SAFE_NO_PAD.encode(tag)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret";

    fn mint(user_id: i64, exp_offset_secs: i64) -> String {
        let claims = Claims {
            sub: user_id,
            exp: chrono::Utc::now().timestamp() + exp_offset_secs,
        };
        sign_claims(SECRET, &claims)
    }

    #[test]
    fn test_valid_credential_resolves_subject_identity() {
        // given:
        let verifier = TokenVerifier::new(SECRET);
        let token = mint(42, 3600);

        // when:
        let identity = verifier.verify(Some(&token)).unwrap();

        // then:
        assert_eq!(identity.user_id, UserId::new(42));
    }

    #[test]
    fn test_missing_credential_is_refused() {
        // given:
        let verifier = TokenVerifier::new(SECRET);

        // then:
        assert_eq!(verifier.verify(None).unwrap_err(), AuthError::Missing);
        assert_eq!(verifier.verify(Some("")).unwrap_err(), AuthError::Missing);
    }

    #[test]
    fn test_tampered_signature_is_refused() {
        // given:
        let verifier = TokenVerifier::new(SECRET);
        let token = mint(42, 3600);
        let (claims_part, _) = token.split_once('.').unwrap();
        let forged = format!("{claims_part}.{}", URL_SAFE_NO_PAD.encode(b"not-a-mac"));

        // when:
        let result = verifier.verify(Some(&forged));

        // then:
        assert_eq!(result.unwrap_err(), AuthError::Invalid);
    }

    #[test]
    fn test_credential_signed_with_other_secret_is_refused() {
        // given:
        let verifier = TokenVerifier::new(SECRET);
        let token = issue_token(b"other-secret", 42, std::time::Duration::from_secs(3600));

        // when:
        let result = verifier.verify(Some(&token));

        // then:
        assert_eq!(result.unwrap_err(), AuthError::Invalid);
    }

    #[test]
    fn test_expired_credential_is_refused() {
        // given: expired an hour ago
        let verifier = TokenVerifier::new(SECRET);
        let token = mint(42, -3600);

        // when:
        let result = verifier.verify(Some(&token));

        // then:
        assert_eq!(result.unwrap_err(), AuthError::Invalid);
    }

    #[test]
    fn test_garbage_credential_is_refused() {
        // given:
        let verifier = TokenVerifier::new(SECRET);

        // then:
        assert_eq!(
            verifier.verify(Some("not a token")).unwrap_err(),
            AuthError::Invalid
        );
        assert_eq!(
            verifier.verify(Some("a.b.c.d")).unwrap_err(),
            AuthError::Invalid
        );
    }

    #[test]
    fn test_issue_token_round_trips_through_verify() {
        // given:
        let verifier = TokenVerifier::new(SECRET);

        // when:
        let token = issue_token(SECRET, 7, std::time::Duration::from_secs(60));
        let identity = verifier.verify(Some(&token)).unwrap();

        // then:
        assert_eq!(identity.user_id, UserId::new(7));
    }
}
