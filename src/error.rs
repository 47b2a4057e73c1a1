use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use model::store::StoreError;
use thiserror::Error;
use tracing::{error, warn};

use crate::auth::password::PasswordError;
use crate::templates::{LoginTemplate, NotFoundTemplate};

/// Everything a page handler can fail with. Each variant resolves to a response.
///
/// Variants that render a full page carry the logged-in username, if any,
/// so the navigation matches the rest of the site.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{what} not found")]
    NotFound {
        what: String,
        current_user: Option<String>,
    },

    /// Unknown username or wrong password. Deliberately not told apart.
    #[error("Invalid credentials for '{username}'")]
    InvalidCredentials {
        username: String,
        current_user: Option<String>,
    },

    #[error("Account '{username}' is disabled")]
    InactiveAccount {
        username: String,
        current_user: Option<String>,
    },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Store(StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

impl AppError {
    pub fn not_found(what: impl Into<String>) -> Self {
        AppError::NotFound {
            what: what.into(),
            current_user: None,
        }
    }

    /// Attach the requesting user to an error that renders a page.
    pub fn seen_by(mut self, viewer: Option<String>) -> Self {
        match &mut self {
            AppError::NotFound { current_user, .. }
            | AppError::InvalidCredentials { current_user, .. }
            | AppError::InactiveAccount { current_user, .. } => *current_user = viewer,
            _ => {}
        }
        self
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::TreasureNotFound(id) => AppError::not_found(format!("Treasure {}", id)),
            StoreError::UserNotFound(username) => {
                AppError::not_found(format!("User '{}'", username))
            }
            other => AppError::Store(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound { what, current_user } => {
                warn!("{} not found", what);
                page(StatusCode::NOT_FOUND, &NotFoundTemplate::new(current_user, what))
            }
            AppError::InvalidCredentials {
                username,
                current_user,
            } => page(
                StatusCode::UNAUTHORIZED,
                &LoginTemplate::rejected(
                    current_user,
                    username,
                    "The username and/or password is incorrect.",
                ),
            ),
            AppError::InactiveAccount {
                username,
                current_user,
            } => page(
                StatusCode::FORBIDDEN,
                &LoginTemplate::rejected(current_user, username, "This account has been disabled."),
            ),
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            other => {
                error!("Request failed: {}", other);
                internal_error()
            }
        }
    }
}

fn page<T: Template>(status: StatusCode, template: &T) -> Response {
    match template.render() {
        Ok(body) => (status, Html(body)).into_response(),
        Err(e) => {
            error!("Failed to render error page: {}", e);
            internal_error()
        }
    }
}

fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}
