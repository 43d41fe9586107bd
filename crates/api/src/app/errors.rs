use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use userdir_auth::{AuthError, TokenError};

/// Map an auth-core failure onto a status code and a `{"error": …}` body.
///
/// Internal failures are logged and replaced with a generic message; raw
/// error objects never reach the client.
pub fn auth_error_to_response(err: AuthError) -> axum::response::Response {
    match err {
        AuthError::Validation(_) => json_error(StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
        AuthError::Conflict(_) => json_error(StatusCode::CONFLICT, err.to_string()),
        AuthError::NotFound => json_error(StatusCode::NOT_FOUND, "user not found"),
        AuthError::Unauthorized => json_error(
            StatusCode::UNAUTHORIZED,
            "invalid credentials, please check your email and password",
        ),
        AuthError::Forbidden(_) => json_error(StatusCode::FORBIDDEN, err.to_string()),
        AuthError::Token(TokenError::Expired) => {
            json_error(StatusCode::UNAUTHORIZED, "token expired, please login again")
        }
        AuthError::Token(TokenError::Invalid) => {
            json_error(StatusCode::UNAUTHORIZED, "token invalid, please login again")
        }
        AuthError::Token(TokenError::Missing) => json_error(
            StatusCode::BAD_REQUEST,
            "token missing, please provide a valid token",
        ),
        AuthError::Internal(detail) => {
            tracing::error!(%detail, "request failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
        }
    }
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": message.into(),
        })),
    )
        .into_response()
}
