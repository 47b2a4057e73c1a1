use anyhow::{Context, Result};
use sea_orm::Database;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::auth::session::SessionStore;
use crate::schemas::AppState;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://treasuregram.db?mode=rwc";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

/// Runtime settings.
///
/// Resolved from built-in defaults, then an optional TOML file, then
/// `TREASUREGRAM_*` environment variables. Command line flags are applied
/// last with [`Settings::with_overrides`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub bind_address: String,
    /// Idle time after which a session is forgotten.
    pub session_ttl_secs: u64,
    /// Upper bound on concurrently live sessions.
    pub session_capacity: u64,
    pub request_timeout_secs: u64,
}

impl Settings {
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("database_url", DEFAULT_DATABASE_URL)?
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("session_ttl_secs", 1_209_600)?
            .set_default("session_capacity", 10_000)?
            .set_default("request_timeout_secs", 30)?;

        if let Some(path) = config_file {
            tracing::debug!("Reading settings from {}", path.display());
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix("TREASUREGRAM").try_parsing(true))
            .build()
            .context("Failed to assemble settings")?
            .try_deserialize()
            .context("Invalid settings")?;

        Ok(settings)
    }

    /// Apply values given explicitly on the command line.
    pub fn with_overrides(
        mut self,
        database_url: Option<String>,
        bind_address: Option<String>,
    ) -> Self {
        if let Some(database_url) = database_url {
            self.database_url = database_url;
        }
        if let Some(bind_address) = bind_address {
            self.bind_address = bind_address;
        }
        self
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Initialize application state: connect to the database and build the session store.
pub async fn initialize_app_state(settings: &Settings) -> Result<AppState> {
    tracing::info!("Connecting to database: {}", settings.database_url);
    let db = Database::connect(&settings.database_url).await?;

    let sessions = SessionStore::new(settings.session_capacity, settings.session_ttl());

    Ok(AppState { db, sessions })
}
