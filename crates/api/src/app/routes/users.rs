//! User directory CRUD. Reads require super or team, mutations super only
//! (enforced by the guards in the route table).

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use userdir_auth::{AuthError, Registration, UserUpdate};
use userdir_core::UserId;

use crate::app::{errors, AppState};

/// GET /users
pub async fn index(Extension(state): Extension<Arc<AppState>>) -> axum::response::Response {
    match state.store.list() {
        Ok(users) => (StatusCode::OK, Json(users)).into_response(),
        Err(e) => errors::auth_error_to_response(AuthError::from(e)),
    }
}

/// Administrative create (POST /users): same validation and defaults as
/// registration, but no token is issued.
pub async fn store(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<Registration>,
) -> axum::response::Response {
    match state.auth.create_user(body).await {
        Ok(user) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "user created successfully",
                "user": user,
            })),
        )
            .into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// GET /users/:id
pub async fn show(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    match state.store.find_by_id(UserId::from_i64(id)) {
        Ok(Some(user)) => (StatusCode::OK, Json(user)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "user not found"),
        Err(e) => errors::auth_error_to_response(AuthError::from(e)),
    }
}

/// Partial update (PUT /users/:id); password is re-hashed when present.
pub async fn update(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<UserUpdate>,
) -> axum::response::Response {
    match state.auth.update_user(UserId::from_i64(id), body).await {
        Ok(user) => (
            StatusCode::OK,
            Json(json!({
                "message": "user updated successfully",
                "user": user,
            })),
        )
            .into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// DELETE /users/:id
pub async fn destroy(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    match state.store.delete(UserId::from_i64(id)) {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "user deleted successfully" })),
        )
            .into_response(),
        Err(e) => errors::auth_error_to_response(AuthError::from(e)),
    }
}
