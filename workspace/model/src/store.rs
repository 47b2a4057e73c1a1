//! Repository-style access to treasures and their owners.
//!
//! Handlers never build queries themselves; every read and write of the
//! `treasures` and `users` tables goes through the functions here.

use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, SqlErr,
};
use thiserror::Error;
use tracing::{debug, instrument, trace, warn};

use crate::entities::{treasure, user};

/// Error types for the treasure store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Treasure {0} not found")]
    TreasureNotFound(i32),

    #[error("User '{0}' not found")]
    UserNotFound(String),

    #[error("Username '{0}' already exists")]
    DuplicateUsername(String),
}

/// Type alias for Result with StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Validated field values for a treasure that doesn't exist yet.
/// The owner is not part of it; it is passed to [`create_treasure`] explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTreasure {
    pub name: String,
    pub value: Decimal,
    pub material: String,
    pub location: String,
}

/// A treasure together with its owner's username, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedTreasure {
    pub treasure: treasure::Model,
    pub owner: String,
}

/// Insert a treasure owned by `owner`.
#[instrument(skip(db, owner))]
pub async fn create_treasure<C: ConnectionTrait>(
    db: &C,
    owner: &user::Model,
    new_treasure: NewTreasure,
) -> Result<treasure::Model> {
    trace!("Inserting treasure '{}' for user {}", new_treasure.name, owner.id);

    let model = treasure::ActiveModel {
        name: Set(new_treasure.name),
        value: Set(new_treasure.value),
        material: Set(new_treasure.material),
        location: Set(new_treasure.location),
        likes: Set(0),
        owner_id: Set(owner.id),
        ..Default::default()
    }
    .insert(db)
    .await?;

    debug!("Treasure {} created for user '{}'", model.id, owner.username);
    Ok(model)
}

/// Fetch a single treasure and its owner.
#[instrument(skip(db))]
pub async fn get_treasure<C: ConnectionTrait>(db: &C, treasure_id: i32) -> Result<OwnedTreasure> {
    let found = treasure::Entity::find_by_id(treasure_id)
        .find_also_related(user::Entity)
        .one(db)
        .await?;

    match found {
        Some((treasure, Some(owner))) => Ok(OwnedTreasure {
            treasure,
            owner: owner.username,
        }),
        Some((treasure, None)) => {
            // The foreign key makes this unreachable unless the schema was tampered with.
            warn!("Treasure {} has no owner row", treasure.id);
            Err(StoreError::TreasureNotFound(treasure_id))
        }
        None => Err(StoreError::TreasureNotFound(treasure_id)),
    }
}

/// Every treasure in insertion order.
#[instrument(skip(db))]
pub async fn all_treasures<C: ConnectionTrait>(db: &C) -> Result<Vec<OwnedTreasure>> {
    let rows = treasure::Entity::find()
        .find_also_related(user::Entity)
        .order_by_asc(treasure::Column::Id)
        .all(db)
        .await?;

    debug!("Loaded {} treasures", rows.len());
    Ok(with_owners(rows))
}

/// One page of treasures in insertion order, plus the total number of treasures.
/// `page` is zero-based.
#[instrument(skip(db))]
pub async fn treasures_page<C: ConnectionTrait>(
    db: &C,
    page: u64,
    limit: u64,
) -> Result<(Vec<OwnedTreasure>, u64)> {
    let paginator = treasure::Entity::find()
        .find_also_related(user::Entity)
        .order_by_asc(treasure::Column::Id)
        .paginate(db, limit);

    let total = paginator.num_items().await?;
    let rows = paginator.fetch_page(page).await?;
    debug!("Loaded page {} ({} of {} treasures)", page, rows.len(), total);

    Ok((with_owners(rows), total))
}

/// Every treasure owned by `owner`, in insertion order.
#[instrument(skip(db, owner), fields(owner = %owner.username))]
pub async fn treasures_owned_by<C: ConnectionTrait>(
    db: &C,
    owner: &user::Model,
) -> Result<Vec<treasure::Model>> {
    let treasures = treasure::Entity::find()
        .filter(treasure::Column::OwnerId.eq(owner.id))
        .order_by_asc(treasure::Column::Id)
        .all(db)
        .await?;

    debug!("User '{}' owns {} treasures", owner.username, treasures.len());
    Ok(treasures)
}

/// Bump the like counter of a treasure and return the new count.
#[instrument(skip(db))]
pub async fn like_treasure<C: ConnectionTrait>(db: &C, treasure_id: i32) -> Result<i32> {
    let result = treasure::Entity::update_many()
        .col_expr(
            treasure::Column::Likes,
            Expr::col(treasure::Column::Likes).add(1),
        )
        .filter(treasure::Column::Id.eq(treasure_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(StoreError::TreasureNotFound(treasure_id));
    }

    let treasure = treasure::Entity::find_by_id(treasure_id)
        .one(db)
        .await?
        .ok_or(StoreError::TreasureNotFound(treasure_id))?;

    Ok(treasure.likes)
}

#[instrument(skip(db))]
pub async fn find_user_by_username<C: ConnectionTrait>(
    db: &C,
    username: &str,
) -> Result<Option<user::Model>> {
    Ok(user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?)
}

/// Like [`find_user_by_username`] but a missing user is an error.
pub async fn get_user_by_username<C: ConnectionTrait>(
    db: &C,
    username: &str,
) -> Result<user::Model> {
    find_user_by_username(db, username)
        .await?
        .ok_or_else(|| StoreError::UserNotFound(username.to_string()))
}

#[instrument(skip(db))]
pub async fn get_user<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<Option<user::Model>> {
    Ok(user::Entity::find_by_id(user_id).one(db).await?)
}

/// Insert a user. The caller hashes the password.
#[instrument(skip(db, password_hash))]
pub async fn create_user<C: ConnectionTrait>(
    db: &C,
    username: &str,
    password_hash: String,
    is_active: bool,
) -> Result<user::Model> {
    let new_user = user::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set(password_hash),
        is_active: Set(is_active),
        ..Default::default()
    };

    match new_user.insert(db).await {
        Ok(model) => {
            debug!("User '{}' created with ID {}", model.username, model.id);
            Ok(model)
        }
        Err(db_error) => match db_error.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                warn!("Username '{}' is already taken", username);
                Err(StoreError::DuplicateUsername(username.to_string()))
            }
            _ => Err(db_error.into()),
        },
    }
}

#[instrument(skip(db))]
pub async fn set_user_active<C: ConnectionTrait>(
    db: &C,
    username: &str,
    is_active: bool,
) -> Result<user::Model> {
    let existing = get_user_by_username(db, username).await?;
    let mut active: user::ActiveModel = existing.into();
    active.is_active = Set(is_active);
    Ok(active.update(db).await?)
}

fn with_owners(rows: Vec<(treasure::Model, Option<user::Model>)>) -> Vec<OwnedTreasure> {
    rows.into_iter()
        .filter_map(|(treasure, owner)| match owner {
            Some(owner) => Some(OwnedTreasure {
                treasure,
                owner: owner.username,
            }),
            None => {
                warn!("Skipping treasure {} without an owner row", treasure.id);
                None
            }
        })
        .collect()
}
