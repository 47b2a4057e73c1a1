use axum::{extract::State, response::Json};
use tracing::{instrument, warn};
use crate::schemas::{AppState, HealthResponse};

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (
            status = 200,
            description = "Service is up; see `database` for connectivity",
            body = HealthResponse
        )
    )
)]
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.db.ping().await {
        Ok(()) => "connected".to_string(),
        Err(e) => {
            warn!("Database ping failed: {}", e);
            "disconnected".to_string()
        }
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
        sessions: state.sessions.active_count(),
    })
}
