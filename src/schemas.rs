use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::auth::session::SessionStore;
use crate::handlers::api::{TreasurePage, TreasureQuery, TreasureResponse};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Server-side login sessions
    pub sessions: SessionStore,
}

/// API response wrapper
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[aliases(
    TreasureApiResponse = ApiResponse<TreasureResponse>,
    TreasureListApiResponse = ApiResponse<Vec<TreasureResponse>>,
    TreasurePageApiResponse = ApiResponse<TreasurePage>
)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: &str) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
            success: false,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
    /// Number of live login sessions
    pub sessions: u64,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::api::list_treasures,
        crate::handlers::api::get_treasure,
        crate::handlers::api::get_user_treasures,
    ),
    components(
        schemas(
            TreasureApiResponse,
            TreasureListApiResponse,
            TreasurePageApiResponse,
            ErrorResponse,
            HealthResponse,
            TreasureResponse,
            TreasurePage,
            TreasureQuery,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "treasures", description = "Read-only treasure catalog endpoints"),
    ),
    info(
        title = "Treasuregram API",
        description = "Read-only JSON view of the treasure catalog",
        version = "0.1.0",
    )
)]
pub struct ApiDoc;
