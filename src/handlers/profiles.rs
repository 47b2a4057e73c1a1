use axum::{
    extract::{Path, State},
    response::Html,
};
use model::store;
use tracing::{debug, instrument, trace};

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::schemas::AppState;
use crate::templates::{ProfileTemplate, TreasureView, render};

/// Every treasure owned by one user.
#[instrument(skip(state, current_user))]
pub async fn profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(username): Path<String>,
) -> Result<Html<String>, AppError> {
    trace!("Entering profile function for username: {}", username);

    let viewer = current_user.username();
    let owner = store::get_user_by_username(&state.db, &username)
        .await
        .map_err(|e| AppError::from(e).seen_by(viewer.clone()))?;
    let treasures = store::treasures_owned_by(&state.db, &owner).await?;
    debug!("User '{}' owns {} treasures", owner.username, treasures.len());

    render(&ProfileTemplate {
        current_user: viewer,
        treasures: treasures
            .into_iter()
            .map(|treasure| TreasureView::new(treasure, owner.username.clone()))
            .collect(),
        username: owner.username,
    })
}
