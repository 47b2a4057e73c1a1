use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use model::store;
use tracing::{debug, info, instrument, trace, warn};

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::forms::TreasureForm;
use crate::schemas::AppState;
use crate::templates::{IndexTemplate, ShowTemplate, TreasureFormView, render};

/// The global listing with an empty submission form.
#[instrument(skip(state, current_user))]
pub async fn index(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Html<String>, AppError> {
    trace!("Entering index function");

    let treasures = store::all_treasures(&state.db).await?;
    debug!("Rendering listing with {} treasures", treasures.len());

    render(&IndexTemplate::new(
        current_user.username(),
        treasures,
        TreasureFormView::default(),
    ))
}

/// A single treasure. Anything but a known numeric id is a 404.
#[instrument(skip(state, current_user))]
pub async fn show(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(treasure_id): Path<String>,
) -> Result<Html<String>, AppError> {
    trace!("Entering show function for treasure_id: {}", treasure_id);

    let viewer = current_user.username();
    let id = parse_treasure_id(&treasure_id).ok_or_else(|| {
        AppError::not_found(format!("Treasure '{}'", treasure_id)).seen_by(viewer.clone())
    })?;
    let treasure = store::get_treasure(&state.db, id)
        .await
        .map_err(|e| AppError::from(e).seen_by(viewer.clone()))?;

    render(&ShowTemplate {
        current_user: viewer,
        treasure: treasure.into(),
    })
}

/// Create a treasure owned by the logged-in user.
///
/// Anonymous submissions are sent to the login page. Invalid submissions
/// persist nothing and re-render the listing with the errors.
#[instrument(skip(state, current_user))]
pub async fn post_treasure(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Form(form): Form<TreasureForm>,
) -> Result<Response, AppError> {
    trace!("Entering post_treasure function");

    let Some(owner) = current_user.user() else {
        warn!("Anonymous treasure submission rejected");
        return Ok(Redirect::to("/login/").into_response());
    };

    match form.clean() {
        Ok(new_treasure) => {
            let created = store::create_treasure(&state.db, owner, new_treasure).await?;
            info!(
                "Treasure {} '{}' created by '{}'",
                created.id, created.name, owner.username
            );
            Ok(Redirect::to("/").into_response())
        }
        Err(errors) => {
            warn!(
                "Treasure submission by '{}' rejected: {:?}",
                owner.username,
                errors.messages()
            );
            let treasures = store::all_treasures(&state.db).await?;
            let page = IndexTemplate::new(
                current_user.username(),
                treasures,
                TreasureFormView::rejected(&form, errors),
            );
            Ok((StatusCode::BAD_REQUEST, render(&page)?).into_response())
        }
    }
}

/// Ids are plain ASCII digits, nothing else.
pub(crate) fn parse_treasure_id(raw: &str) -> Option<i32> {
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        raw.parse().ok()
    } else {
        None
    }
}
