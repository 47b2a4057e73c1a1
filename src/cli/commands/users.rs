use anyhow::{Context, Result};
use model::store;
use tracing::{debug, info, trace};

use super::initdb::connect;
use crate::auth::password::hash_password;

/// Create an account. The password is stored as an Argon2 hash.
pub async fn create_user(
    database_url: &str,
    username: &str,
    password: &str,
    is_active: bool,
) -> Result<()> {
    trace!("Entering create_user function");
    let username = username.trim();
    if username.is_empty() {
        anyhow::bail!("Username must not be blank");
    }
    if password.is_empty() {
        anyhow::bail!("Password must not be empty");
    }

    let db = connect(database_url).await?;
    let password_hash = hash_password(password)?;
    debug!("Password hashed for '{}'", username);

    let user = store::create_user(&db, username, password_hash, is_active)
        .await
        .with_context(|| format!("Could not create user '{}'", username))?;

    info!(
        "Created user '{}' (id {}, {})",
        user.username,
        user.id,
        if user.is_active { "active" } else { "inactive" }
    );
    Ok(())
}

pub async fn set_active(database_url: &str, username: &str, active: bool) -> Result<()> {
    trace!("Entering set_active function");
    let db = connect(database_url).await?;

    let user = store::set_user_active(&db, username, active)
        .await
        .with_context(|| format!("Could not update user '{}'", username))?;

    info!(
        "User '{}' is now {}",
        user.username,
        if user.is_active { "active" } else { "inactive" }
    );
    Ok(())
}
