//! JWT access-token validation.

use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;
#[cfg(any(feature = "test-util", test))]
use serde::Serialize;
use uuid::Uuid;

/// Caller identity extracted from a validated access token.
///
/// Carries no role: the role table is the only source of truth for roles.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub user_id: Uuid,
}

/// Errors returned by [`validate_access_token`].
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
}

/// JWT claims payload issued by the hosted identity platform.
///
/// | Field | JWT claim | Meaning |
/// |-------|-----------|---------|
/// | `sub` | `sub` | user ID (UUID string) |
/// | `exp` | `exp` | expiration, seconds since epoch |
///
/// Other claims the platform adds (email, audience, metadata) are ignored.
///
/// [`Serialize`] is only derived with the **`test-util`** feature; production code
/// never issues tokens.
#[derive(Debug, Deserialize)]
#[cfg_attr(any(feature = "test-util", test), derive(Serialize))]
pub struct JwtClaims {
    pub sub: String,
    pub exp: u64,
}

// ── Core decode (private) ────────────────────────────────────────────────

/// Decode and validate a JWT, returning raw claims.
///
/// Validation: HS256, exp checked, required claims: `exp` + `sub`.
/// Default leeway = 60s. Audience is not checked.
fn decode_jwt(token: &str, secret: &str) -> Result<JwtClaims, AuthError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature
        | jsonwebtoken::errors::ErrorKind::InvalidEcdsaKey
        | jsonwebtoken::errors::ErrorKind::InvalidRsaKey(_) => AuthError::InvalidSignature,
        _ => AuthError::Malformed,
    })?;

    Ok(data.claims)
}

/// Validate a bearer access token, returning the parsed caller identity.
pub fn validate_access_token(token: &str, secret: &str) -> Result<TokenInfo, AuthError> {
    let claims = decode_jwt(token, secret)?;
    let user_id = claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| AuthError::Malformed)?;
    Ok(TokenInfo { user_id })
}

/// Sign an HS256 access token for `user_id` valid for `ttl_secs`.
///
/// Test helper only: requires the `test-util` feature.
#[cfg(any(feature = "test-util", test))]
pub fn issue_access_token(user_id: Uuid, secret: &str, ttl_secs: u64) -> String {
    use jsonwebtoken::{EncodingKey, Header, encode};

    let exp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
        + ttl_secs;
    let claims = JwtClaims {
        sub: user_id.to_string(),
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("HS256 encoding with a byte secret cannot fail")
}
