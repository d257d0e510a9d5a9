use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::startup::AppState;

/// Liveness plus a `SELECT 1` against the pool.
pub async fn health_check(State(state): State<AppState>) -> Response {
    let db_ok = state.db.health_check().await;
    let (status, label) = if db_ok {
        (StatusCode::OK, "healthy")
    } else {
        tracing::warn!("Health check failed: database unreachable");
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (
        status,
        Json(json!({
            "status": label,
            "service": "caja-server",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
        .into_response()
}
