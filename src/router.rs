use crate::handlers::{
    api::{get_treasure, get_user_treasures, list_treasures},
    auth::{login, login_form, logout},
    health::health_check,
    likes::like_treasure,
    profiles::profile,
    static_assets::app_js,
    treasures::{index, post_treasure, show},
};
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        // Pages
        .route("/", get(index))
        .route("/user/:username/", get(profile))
        .route("/login/", get(login_form).post(login))
        .route("/logout/", get(logout).post(logout))
        .route("/like_treasure/", get(like_treasure).post(like_treasure))
        .route("/:treasure_id/", get(show))
        .route("/post_url/", post(post_treasure))
        .route("/static/js/app.js", get(app_js))
        // Health check
        .route("/health", get(health_check))
        // Read-only JSON API
        .route("/api/v1/treasures", get(list_treasures))
        .route("/api/v1/treasures/:treasure_id", get(get_treasure))
        .route("/api/v1/users/:username/treasures", get(get_user_treasures))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(not_found)
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(request_timeout))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn not_found(current_user: CurrentUser) -> AppError {
    AppError::not_found("Page").seen_by(current_user.username())
}
