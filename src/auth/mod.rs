//! Authentication: credential checks and the session a request belongs to.

pub mod password;
pub mod session;

use axum::{extract::FromRequestParts, http::request::Parts};
use model::entities::user;
use model::store;
use sea_orm::ConnectionTrait;
use tracing::{debug, instrument, trace};

use crate::error::AppError;
use crate::schemas::AppState;
use password::verify_password;
use session::{Session, SessionStore, session_token};

/// The authenticated side of a request: the session token and its user.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub token: String,
    pub user: user::Model,
}

/// Who is making the request. `None` means anonymous.
///
/// Sessions of users that were deleted or deactivated since logging in are
/// dropped here, so such requests are anonymous.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<SessionUser>);

impl CurrentUser {
    pub fn user(&self) -> Option<&user::Model> {
        self.0.as_ref().map(|session| &session.user)
    }

    pub fn username(&self) -> Option<String> {
        self.user().map(|user| user.username.clone())
    }

    pub fn token(&self) -> Option<&str> {
        self.0.as_ref().map(|session| session.token.as_str())
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(&parts.headers) else {
            return Ok(CurrentUser(None));
        };

        let Some(user_id) = state.sessions.user_id(&token).await else {
            trace!("Session cookie does not match a live session");
            return Ok(CurrentUser(None));
        };

        match store::get_user(&state.db, user_id).await? {
            Some(user) if user.is_active => Ok(CurrentUser(Some(SessionUser { token, user }))),
            _ => {
                debug!("Dropping session of missing or inactive user {}", user_id);
                state.sessions.destroy(&token).await;
                Ok(CurrentUser(None))
            }
        }
    }
}

/// Check a username and password.
///
/// Returns the user when the password matches, whether or not the account is
/// active; deciding what an inactive account may do is up to the caller.
#[instrument(skip(db, password))]
pub async fn authenticate<C: ConnectionTrait>(
    db: &C,
    username: &str,
    password: &str,
) -> Result<Option<user::Model>, AppError> {
    let Some(user) = store::find_user_by_username(db, username).await? else {
        debug!("No user named '{}'", username);
        return Ok(None);
    };

    if verify_password(password, &user.password_hash)? {
        Ok(Some(user))
    } else {
        debug!("Wrong password for '{}'", username);
        Ok(None)
    }
}

/// Bind a fresh session to `user`, replacing the request's previous session if any.
pub async fn login(sessions: &SessionStore, user: &user::Model, previous: Option<&str>) -> Session {
    if let Some(previous) = previous {
        sessions.destroy(previous).await;
    }
    sessions.create(user.id).await
}

/// End the session, if there is one.
pub async fn logout(sessions: &SessionStore, token: Option<&str>) {
    if let Some(token) = token {
        sessions.destroy(token).await;
    }
}
