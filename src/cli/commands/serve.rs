use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tracing::{debug, error, info, trace};

use crate::config::{Settings, initialize_app_state};
use crate::router::create_router;

pub async fn serve(settings: &Settings) -> Result<()> {
    trace!("Entering serve function");
    info!("Treasuregram starting up");
    debug!("Database URL: {}", settings.database_url);
    debug!("Bind address: {}", settings.bind_address);

    let state = match initialize_app_state(settings).await {
        Ok(state) => {
            debug!("Application state initialized successfully");
            state
        }
        Err(e) => {
            error!("Failed to initialize application state: {}", e);
            return Err(e);
        }
    };

    let app = create_router(state, settings.request_timeout());
    run_server(app, &settings.bind_address).await
}

/// Bind `bind_address` and serve `app` until the process is stopped.
pub(crate) async fn run_server(app: Router, bind_address: &str) -> Result<()> {
    info!("Starting server on {}", bind_address);
    let listener = match TcpListener::bind(bind_address).await {
        Ok(listener) => {
            debug!("Successfully bound to address: {}", bind_address);
            listener
        }
        Err(e) => {
            error!("Failed to bind to address {}: {}", bind_address, e);
            return Err(e.into());
        }
    };

    info!("Treasuregram running on http://{}", bind_address);
    info!("Swagger UI available at http://{}/swagger-ui", bind_address);

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Server shutdown gracefully");
    Ok(())
}
