//! Operator credentials on the wire.
//!
//! An access token is an HS256 JWT addressed to the admin API
//! ([`ADMIN_AUDIENCE`]). Besides the operator it names the refresh session
//! that minted it, so revoking that session (logout, or rotation on refresh)
//! ends every access token issued under it. Refresh tokens are opaque random
//! strings; the server keeps only their SHA-256 digest.

use illustra_core::types::DbId;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::TokenConfig;

/// `aud` claim of every access token.
pub const ADMIN_AUDIENCE: &str = "illustra-admin";

/// Clock skew tolerated when checking `exp`, in seconds.
const LEEWAY_SECS: u64 = 5;

/// Payload of an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Operator id.
    pub sub: DbId,
    /// Id of the `operator_sessions` row the token was issued under.
    pub sid: DbId,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Sign an access token for `operator_id` under session `session_id`.
pub fn sign_access_token(
    config: &TokenConfig,
    operator_id: DbId,
    session_id: DbId,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = AccessClaims {
        sub: operator_id,
        sid: session_id,
        aud: ADMIN_AUDIENCE.to_string(),
        iat: now.timestamp(),
        exp: (now + config.access_ttl).timestamp(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Check signature, audience, and expiry; return the claims.
///
/// Whether the session named by `sid` is still live is up to the caller.
pub fn verify_access_token(
    config: &TokenConfig,
    token: &str,
) -> Result<AccessClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[ADMIN_AUDIENCE]);
    validation.set_required_spec_claims(&["exp", "aud", "sub"]);
    validation.leeway = LEEWAY_SECS;

    let data = decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

/// A freshly minted refresh token.
pub struct RefreshToken {
    /// Handed to the client once, never stored.
    pub secret: String,
    /// Stored in `operator_sessions.refresh_token_hash`.
    pub digest: String,
}

impl RefreshToken {
    /// 256 random bits, hex encoded.
    pub fn generate() -> Self {
        let secret = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        let digest = refresh_token_digest(&secret);
        Self { secret, digest }
    }
}

/// Lowercase hex SHA-256 of a refresh token presented by a client.
pub fn refresh_token_digest(secret: &str) -> String {
    format!("{:x}", Sha256::digest(secret.as_bytes()))
}
