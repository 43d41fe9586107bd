use std::sync::Arc;

use userdir_api::app::{build_app, AppConfig};
use userdir_store::InMemoryUserStore;

#[tokio::main]
async fn main() {
    userdir_observability::init();

    let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
        "dev-secret".to_string()
    });

    let token_ttl_secs = std::env::var("TOKEN_TTL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3600);

    let debug = matches!(
        std::env::var("APP_DEBUG").as_deref(),
        Ok("1") | Ok("true")
    );

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let config = AppConfig {
        jwt_secret,
        token_ttl_secs,
        bcrypt_cost: userdir_auth::password::BCRYPT_COST,
        debug,
    };

    let store = Arc::new(InMemoryUserStore::new());
    let app = build_app(config, store);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {addr}: {e}"));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
