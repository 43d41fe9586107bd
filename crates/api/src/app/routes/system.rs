//! System diagnostics, team-gated.

use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;

use crate::app::{errors, AppState};

/// API surface version reported by the diagnostics endpoint.
const API_VERSION: f64 = 2.0;

/// Store driver, size and process info (GET /).
pub async fn info(Extension(state): Extension<Arc<AppState>>) -> axum::response::Response {
    let stats = match state.store.stats() {
        Ok(stats) => stats,
        Err(e) => {
            tracing::error!(error = %e, "failed to read store stats");
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to read system information",
            );
        }
    };

    let now = Utc::now();
    let size_mb = (stats.approx_bytes as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0;

    (
        StatusCode::OK,
        Json(json!({
            "status": state.debug,
            "date": now.format("%Y-%m-%d").to_string(),
            "time": now.format("%H:%M:%S").to_string(),
            "version": API_VERSION,
            "driver": stats.driver,
            "database_size_mb": size_mb,
            "users": stats.users,
        })),
    )
        .into_response()
}
