use crate::schemas::{
    ApiResponse, AppState, ErrorResponse, TreasureApiResponse, TreasureListApiResponse,
    TreasurePageApiResponse,
};
use axum::{
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::Json,
};
use axum_valid::{Valid, ValidRejection};
use model::entities::treasure;
use model::store::{self, OwnedTreasure, StoreError};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Query parameters for listing treasures
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
pub struct TreasureQuery {
    /// Page number (default: 1, at most 10000)
    #[validate(range(min = 1, max = 10000))]
    pub page: Option<u64>,
    /// Page size (default: 100)
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<u64>,
}

/// Treasure response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TreasureResponse {
    pub id: i32,
    pub name: String,
    /// Decimal value with two places, e.g. "500.00"
    pub value: String,
    pub material: String,
    pub location: String,
    pub likes: i32,
    /// Username of the owner
    pub owner: String,
}

impl TreasureResponse {
    fn new(treasure: treasure::Model, owner: String) -> Self {
        Self {
            id: treasure.id,
            name: treasure.name,
            value: format!("{:.2}", treasure.value),
            material: treasure.material,
            location: treasure.location,
            likes: treasure.likes,
            owner,
        }
    }
}

impl From<OwnedTreasure> for TreasureResponse {
    fn from(owned: OwnedTreasure) -> Self {
        Self::new(owned.treasure, owned.owner)
    }
}

/// One page of treasures
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TreasurePage {
    pub items: Vec<TreasureResponse>,
    pub page: u64,
    pub limit: u64,
    /// Total number of treasures across all pages
    pub total: u64,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: String, code: &str) -> ApiError {
    warn!("Rejected API request: {}", message);
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(message, code)),
    )
}

fn api_error(err: StoreError) -> ApiError {
    match err {
        StoreError::TreasureNotFound(_) => {
            warn!("{}", err);
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(err.to_string(), "TREASURE_NOT_FOUND")),
            )
        }
        StoreError::UserNotFound(_) => {
            warn!("{}", err);
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(err.to_string(), "USER_NOT_FOUND")),
            )
        }
        other => {
            error!("Database failure while serving API request: {}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Internal server error while reading treasures",
                    "DATABASE_ERROR",
                )),
            )
        }
    }
}

/// List treasures in insertion order
#[utoipa::path(
    get,
    path = "/api/v1/treasures",
    tag = "treasures",
    params(TreasureQuery),
    responses(
        (
            status = 200,
            description = "Treasures retrieved successfully",
            body = TreasurePageApiResponse
        ),
        (status = 400, description = "Invalid paging parameters", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, query))]
pub async fn list_treasures(
    State(state): State<AppState>,
    query: Result<Valid<Query<TreasureQuery>>, ValidRejection<QueryRejection>>,
) -> Result<Json<ApiResponse<TreasurePage>>, ApiError> {
    trace!("Entering list_treasures function");

    let Valid(Query(query)) = query.map_err(|e| bad_request(e.to_string(), "INVALID_QUERY"))?;

    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(100);
    debug!("Fetching treasures - page: {}, limit: {}", page, limit);

    let (treasures, total) = store::treasures_page(&state.db, page - 1, limit)
        .await
        .map_err(api_error)?;

    info!("Successfully retrieved {} of {} treasures", treasures.len(), total);
    Ok(Json(ApiResponse {
        data: TreasurePage {
            items: treasures.into_iter().map(TreasureResponse::from).collect(),
            page,
            limit,
            total,
        },
        message: "Treasures retrieved successfully".to_string(),
        success: true,
    }))
}

/// Get a specific treasure by ID
#[utoipa::path(
    get,
    path = "/api/v1/treasures/{treasure_id}",
    tag = "treasures",
    params(
        ("treasure_id" = i32, Path, description = "Treasure ID"),
    ),
    responses(
        (status = 200, description = "Treasure retrieved successfully", body = TreasureApiResponse),
        (status = 400, description = "Treasure ID is not a number", body = ErrorResponse),
        (status = 404, description = "Treasure not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, treasure_id))]
pub async fn get_treasure(
    treasure_id: Result<Path<i32>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<TreasureResponse>>, ApiError> {
    let Path(treasure_id) =
        treasure_id.map_err(|e| bad_request(e.body_text(), "INVALID_TREASURE_ID"))?;
    trace!("Entering get_treasure function for treasure_id: {}", treasure_id);

    let treasure = store::get_treasure(&state.db, treasure_id)
        .await
        .map_err(api_error)?;

    info!("Successfully retrieved treasure {}", treasure_id);
    Ok(Json(ApiResponse {
        data: TreasureResponse::from(treasure),
        message: "Treasure retrieved successfully".to_string(),
        success: true,
    }))
}

/// Get all treasures owned by a user
#[utoipa::path(
    get,
    path = "/api/v1/users/{username}/treasures",
    tag = "treasures",
    params(
        ("username" = String, Path, description = "Username of the owner"),
    ),
    responses(
        (
            status = 200,
            description = "Treasures retrieved successfully",
            body = TreasureListApiResponse
        ),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_user_treasures(
    Path(username): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<TreasureResponse>>>, ApiError> {
    trace!("Entering get_user_treasures function for username: {}", username);

    let owner = store::get_user_by_username(&state.db, &username)
        .await
        .map_err(api_error)?;
    let treasures = store::treasures_owned_by(&state.db, &owner)
        .await
        .map_err(api_error)?;

    info!("User '{}' owns {} treasures", owner.username, treasures.len());
    Ok(Json(ApiResponse {
        data: treasures
            .into_iter()
            .map(|treasure| TreasureResponse::new(treasure, owner.username.clone()))
            .collect(),
        message: "Treasures retrieved successfully".to_string(),
        success: true,
    }))
}
