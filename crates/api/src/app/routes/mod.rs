use axum::{
    routing::{get, post, put},
    Router,
};

use crate::middleware::{self, GuardState};

pub mod auth;
pub mod system;
pub mod users;

/// Assemble the full route table.
///
/// Routers are grouped by guard level and merged; a path can appear in more
/// than one group when its methods are gated differently (e.g. POST
/// /auth/token is open while GET /auth/token requires authentication).
pub fn router(guard: &GuardState) -> Router {
    let open = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/token", post(auth::get_token))
        .route("/auth/admin/token", post(auth::get_token_admin));

    let authenticated = Router::new()
        .route("/auth", get(auth::get_auth))
        .route("/auth/token", get(auth::verify_token))
        .route_layer(axum::middleware::from_fn_with_state(
            guard.clone(),
            middleware::require_auth,
        ));

    let privileged = Router::new()
        .route("/auth/admin/token", get(auth::verify_token_admin))
        .route("/users", get(users::index))
        .route("/users/:id", get(users::show))
        .route_layer(axum::middleware::from_fn_with_state(
            guard.clone(),
            middleware::require_privileged,
        ));

    let admin = Router::new()
        .route("/users", post(users::store))
        .route("/users/:id", put(users::update).delete(users::destroy))
        .route_layer(axum::middleware::from_fn_with_state(
            guard.clone(),
            middleware::require_super,
        ));

    let team = Router::new()
        .route("/", get(system::info))
        .route_layer(axum::middleware::from_fn_with_state(
            guard.clone(),
            middleware::require_team,
        ));

    Router::new()
        .merge(open)
        .merge(authenticated)
        .merge(privileged)
        .merge(admin)
        .merge(team)
}
