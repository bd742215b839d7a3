//! Bearer-token verification for the hoot backend.
//!
//! Tokens are signed with a process-wide shared secret (HS256) by the auth
//! subsystem and embed the user identity as their payload. Verification is
//! stateless: no session store, no revocation list, every request stands on
//! its own token.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Clock skew tolerance when validating `exp`.
const VALIDATION_LEEWAY_SECS: u64 = 30;

/// User identity embedded in the token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Hex-encoded document id of the user.
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
}

/// Claims carried by a hoot bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Embedded user identity.
    pub payload: Identity,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issued at (Unix timestamp).
    pub iat: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

/// Verify `token` against `secret` and return its claims.
///
/// Fails on bad signatures and on expired tokens, with a small leeway for
/// clock skew between issuer and verifier.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = VALIDATION_LEEWAY_SECS;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;

    Ok(data.claims)
}

/// Sign a token embedding `identity`, valid for `ttl` from now.
///
/// The signing counterpart lives with the auth subsystem in production;
/// this is used by it and by test fixtures.
pub fn issue_token(identity: &Identity, secret: &str, ttl: Duration) -> Result<String, TokenError> {
    let now = Utc::now();
    let claims = Claims {
        payload: identity.clone(),
        exp: (now + ttl).timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
