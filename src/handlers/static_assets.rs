use axum::{http::header, response::IntoResponse};

const APP_JS: &str = include_str!("../../static/js/app.js");

/// The like-button script.
pub async fn app_js() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/javascript; charset=utf-8")], APP_JS)
}
