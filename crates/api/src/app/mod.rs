//! HTTP application wiring (Axum router + service wiring).
//!
//! Layout:
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses
//! - `middleware` (crate root): the access-control guards

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use userdir_auth::{AuthService, TokenService, UserStore};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;

/// Runtime configuration, resolved from the environment by `main`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub bcrypt_cost: u32,
    pub debug: bool,
}

/// Shared services handed to handlers via request extensions.
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub store: Arc<dyn UserStore>,
    pub debug: bool,
}

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub fn build_app(config: AppConfig, store: Arc<dyn UserStore>) -> Router {
    let tokens = TokenService::new(config.jwt_secret.as_bytes());
    let auth = Arc::new(AuthService::new(
        Arc::clone(&store),
        tokens,
        config.token_ttl_secs,
        config.bcrypt_cost,
    ));

    let guard = middleware::GuardState {
        auth: Arc::clone(&auth),
    };
    let state = Arc::new(AppState {
        auth,
        store,
        debug: config.debug,
    });

    routes::router(&guard)
        .layer(Extension(state))
        .layer(ServiceBuilder::new())
}
