//! Health check endpoints

use axum::{extract::State, http::StatusCode, Json};
use tracing::warn;

use crate::api::dto::HealthResponse;
use crate::AppState;

/// Liveness: the process is serving requests
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Readiness: the database answers, when there is one
pub async fn ready_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let Some(database) = &state.database else {
        return (StatusCode::OK, Json(HealthResponse { status: "ready" }));
    };

    match database.ping().await {
        Ok(()) => (StatusCode::OK, Json(HealthResponse { status: "ready" })),
        Err(e) => {
            warn!("Readiness check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse { status: "unavailable" }),
            )
        }
    }
}
