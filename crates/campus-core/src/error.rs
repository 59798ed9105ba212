use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Build the JSON error body every Campus endpoint returns on failure.
///
/// Shape: `{ "error": <message>, "kind": <SCREAMING_SNAKE code> }`. The admin UI
/// displays `error` verbatim; `kind` is for programmatic callers.
pub fn error_response(status: StatusCode, kind: &str, message: impl Into<String>) -> Response {
    let body = serde_json::json!({
        "error": message.into(),
        "kind": kind,
    });
    (status, axum::Json(body)).into_response()
}
