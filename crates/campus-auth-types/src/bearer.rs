//! `Authorization: Bearer` extractor.

use axum::extract::FromRequestParts;
use axum::response::{IntoResponse, Response};
use http::request::Parts;
use http::{StatusCode, header::AUTHORIZATION};

/// Raw bearer credential taken from the `Authorization` header.
///
/// The token is not validated here; callers pass it to
/// [`crate::token::validate_access_token`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(pub String);

/// Rejection for a missing or malformed `Authorization` header (401).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingBearer;

impl IntoResponse for MissingBearer {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": "missing authorization header",
            "kind": "UNAUTHENTICATED",
        });
        (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
    }
}

/// Parse `Bearer <token>`; the scheme is matched case-insensitively.
pub fn parse_bearer(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = MissingBearer;

    // Read the header synchronously and return a 'static future; axum-core 0.5 declares
    // this method as `fn -> impl Future + Send`.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_bearer)
            .map(str::to_owned);

        async move { token.map(BearerToken).ok_or(MissingBearer) }
    }
}
