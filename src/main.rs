use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod auth;
mod cli;
mod config;
mod error;
mod forms;
mod handlers;
mod router;
mod schemas;
mod templates;

#[cfg(test)]
mod tests;

use cli::Cli;

/// Main entry point for the Treasuregram application.
#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "treasuregram=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    cli.run().await?;

    Ok(())
}
