use anyhow::Result;
use tracing::{debug, error, info, trace};

use super::initdb::{connect, run_migrations};
use super::serve::run_server;
use crate::auth::session::SessionStore;
use crate::config::Settings;
use crate::router::create_router;
use crate::schemas::AppState;

pub async fn migrate_and_serve(settings: &Settings) -> Result<()> {
    trace!("Entering migrate_and_serve function");
    info!("Applying database migrations and starting server");
    debug!("Database URL: {}", settings.database_url);

    let db = connect(&settings.database_url).await?;
    if let Err(e) = run_migrations(&db).await {
        error!("Refusing to serve an unmigrated database");
        return Err(e);
    }

    // The migrated connection is reused for serving.
    let state = AppState {
        db,
        sessions: SessionStore::new(settings.session_capacity, settings.session_ttl()),
    };

    let app = create_router(state, settings.request_timeout());
    run_server(app, &settings.bind_address).await
}
