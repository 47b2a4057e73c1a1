use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use tracing::{debug, error, info, trace};

pub(crate) async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    trace!("Attempting to connect to database");
    match Database::connect(database_url).await {
        Ok(connection) => {
            info!("Successfully connected to database");
            Ok(connection)
        }
        Err(e) => {
            error!("Failed to connect to database '{}': {}", database_url, e);
            Err(e.into())
        }
    }
}

/// Apply every pending migration. Already applied ones are skipped.
pub(crate) async fn run_migrations(db: &DatabaseConnection) -> Result<()> {
    info!("Running database migrations");
    if let Err(e) = Migrator::up(db, None).await {
        error!("Failed to run database migrations: {}", e);
        return Err(e.into());
    }

    debug!("All pending migrations have been applied");
    Ok(())
}

pub async fn init_database(database_url: &str) -> Result<()> {
    trace!("Entering init_database function");
    info!("Initializing database");
    debug!("Database URL: {}", database_url);

    let db = connect(database_url).await?;
    run_migrations(&db).await?;

    info!("Database initialization completed successfully!");
    Ok(())
}
