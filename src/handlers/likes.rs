use axum::extract::{Query, State};
use model::store;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::AppError;
use crate::schemas::AppState;

#[derive(Debug, Deserialize)]
pub struct LikeQuery {
    pub treasure_id: Option<String>,
}

/// Add one like and answer with the new count as plain text.
/// Without a `treasure_id` nothing is liked and the answer is `0`.
#[instrument(skip(state))]
pub async fn like_treasure(
    State(state): State<AppState>,
    Query(query): Query<LikeQuery>,
) -> Result<String, AppError> {
    let Some(raw) = query.treasure_id.as_deref().map(str::trim).filter(|id| !id.is_empty()) else {
        return Ok("0".to_string());
    };

    let treasure_id: i32 = raw
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid treasure id '{}'", raw)))?;

    let likes = store::like_treasure(&state.db, treasure_id).await?;
    debug!("Treasure {} now has {} likes", treasure_id, likes);

    Ok(likes.to_string())
}
