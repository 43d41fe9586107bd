//! Registration, login and token-verification handlers.

use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use userdir_auth::{Registration, Role};

use crate::app::{dto, errors, AppState};
use crate::context::AuthContext;

/// POST /auth/register: create an account and log it in.
pub async fn register(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<Registration>,
) -> axum::response::Response {
    match state.auth.register(body).await {
        Ok(issued) => dto::token_response(issued, true),
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// POST /auth/token: plain user login.
pub async fn get_token(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    login_with_roles(state, body, None).await
}

/// POST /auth/admin/token: login restricted to super/team accounts.
pub async fn get_token_admin(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    login_with_roles(state, body, Some(&[Role::Super, Role::Team])).await
}

async fn login_with_roles(
    state: Arc<AppState>,
    body: dto::LoginRequest,
    allowed_roles: Option<&'static [Role]>,
) -> axum::response::Response {
    let (Some(email), Some(password)) = (body.email, body.password) else {
        return errors::json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "email and password are required",
        );
    };

    match state.auth.login(&email, &password, allowed_roles).await {
        Ok(issued) => dto::token_response(issued, false),
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// GET /auth: the authenticated subject's profile.
///
/// The guard already verified the token and re-checked live store state;
/// these handlers only surface what it resolved.
pub async fn get_auth(Extension(ctx): Extension<AuthContext>) -> axum::response::Response {
    (StatusCode::ACCEPTED, Json(ctx.user().clone())).into_response()
}

/// GET /auth/token: token verification for any enabled user.
pub async fn verify_token(Extension(ctx): Extension<AuthContext>) -> axum::response::Response {
    (StatusCode::ACCEPTED, Json(ctx.user().clone())).into_response()
}

/// GET /auth/admin/token: token verification behind the privileged guard.
pub async fn verify_token_admin(
    Extension(ctx): Extension<AuthContext>,
) -> axum::response::Response {
    (StatusCode::ACCEPTED, Json(ctx.user().clone())).into_response()
}
