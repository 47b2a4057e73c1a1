use axum::{
    Form,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::{info, instrument, trace, warn};

use crate::auth::{self, CurrentUser, session::session_token};
use crate::error::AppError;
use crate::forms::LoginForm;
use crate::schemas::AppState;
use crate::templates::{LoginTemplate, render};

/// Empty login form.
#[instrument(skip(current_user))]
pub async fn login_form(current_user: CurrentUser) -> Result<Html<String>, AppError> {
    render(&LoginTemplate::new(current_user.username()))
}

/// Check the submitted credentials and start a session.
///
/// Every failure renders the login form again with a message: 400 for an
/// incomplete form, 401 for wrong credentials, 403 for a disabled account.
#[instrument(skip(state, current_user, form))]
pub async fn login(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    trace!("Entering login function");

    let credentials = match form.clean() {
        Ok(credentials) => credentials,
        Err(errors) => {
            warn!("Login form rejected: {:?}", errors.messages());
            let page = LoginTemplate::invalid(
                current_user.username(),
                form.username_value(),
                errors.messages(),
            );
            return Ok((StatusCode::BAD_REQUEST, render(&page)?).into_response());
        }
    };

    let authenticated =
        auth::authenticate(&state.db, &credentials.username, &credentials.password).await?;
    let Some(user) = authenticated else {
        warn!("The username and/or password is incorrect for '{}'", credentials.username);
        return Err(AppError::InvalidCredentials {
            username: credentials.username,
            current_user: current_user.username(),
        });
    };

    if !user.is_active {
        warn!("The account '{}' has been disabled", user.username);
        return Err(AppError::InactiveAccount {
            username: user.username,
            current_user: current_user.username(),
        });
    }

    let session = auth::login(&state.sessions, &user, current_user.token()).await;
    info!("User '{}' logged in", user.username);

    Ok((
        [(header::SET_COOKIE, state.sessions.cookie(&session))],
        Redirect::to("/"),
    )
        .into_response())
}

/// End the session, whatever state it is in.
#[instrument(skip(state, headers))]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let token = session_token(&headers);
    auth::logout(&state.sessions, token.as_deref()).await;
    info!("Session ended");

    (
        [(header::SET_COOKIE, state.sessions.expired_cookie())],
        Redirect::to("/"),
    )
        .into_response()
}
