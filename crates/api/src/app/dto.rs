use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use userdir_auth::IssuedToken;

// -------------------------
// Request DTOs
// -------------------------

/// Login body. Fields are optional so that a missing one becomes our own
/// validation message instead of a deserializer error.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

// -------------------------
// Response helpers
// -------------------------

/// The 202 `{token, type, user?}` shape every token-issuing endpoint uses.
pub fn token_response(issued: IssuedToken, include_user: bool) -> axum::response::Response {
    let mut data = json!({
        "token": issued.token,
        "type": "Bearer",
    });
    if include_user {
        data["user"] = serde_json::to_value(&issued.user).unwrap_or_default();
    }
    (StatusCode::ACCEPTED, Json(data)).into_response()
}
