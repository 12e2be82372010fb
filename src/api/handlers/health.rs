//! Health check handler

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /health - Health check
///
/// Returns 200 OK if storage answers, 503 Service Unavailable if not.
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let version = env!("CARGO_PKG_VERSION").to_string();

    if state.certificates.is_healthy() {
        Ok(Json(HealthResponse {
            status: "healthy".to_string(),
            version,
            error: None,
        }))
    } else {
        tracing::warn!("Health check failed: storage unreachable");
        Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unhealthy".to_string(),
                version,
                error: Some("Storage unavailable".to_string()),
            }),
        ))
    }
}
