//! Signed access tokens (HS256 JWT).
//!
//! Access tokens are stateless: identity and expiry live in the claims,
//! nothing is persisted. The signing secret is process-wide
//! configuration owned by [`AuthConfig`](crate::auth::AuthConfig).

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::auth::config::AuthConfig;
use crate::auth::error::AuthError;
use crate::auth::roles::Role;

/// Claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject — user id (UUID string).
    pub sub: String,
    /// Role names, lowercase.
    pub roles: Vec<String>,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs() as i64)
}

/// Sign an access token for the given user, returning the token and
/// its lifetime in seconds.
pub fn sign_access_token(
    user_id: Uuid,
    roles: &[Role],
    config: &AuthConfig,
) -> Result<(String, i64), AuthError> {
    let now = unix_now();
    let expires_in = config.access_token_ttl_seconds();
    let claims = AccessTokenClaims {
        sub: user_id.to_string(),
        roles: roles.iter().map(|role| role.as_str().to_string()).collect(),
        iat: now,
        exp: now + expires_in,
    };

    let key = EncodingKey::from_secret(config.signing_secret());
    encode(&Header::new(Algorithm::HS256), &claims, &key)
        .map(|token| (token, expires_in))
        .map_err(|err| AuthError::Crypto(format!("jwt encode: {err}")))
}

/// Decode and verify an access token (signature and expiry).
///
/// Any failure — bad signature, expired, malformed — reads as
/// [`AuthError::InvalidCredentials`]; callers get no oracle.
pub fn decode_access_token(
    token: &str,
    config: &AuthConfig,
) -> Result<AccessTokenClaims, AuthError> {
    let key = DecodingKey::from_secret(config.signing_secret());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["sub", "exp", "iat"]);

    decode::<AccessTokenClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|_| AuthError::InvalidCredentials)
}
