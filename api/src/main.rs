//! LogLens API Server Binary
//!
//! Entry point for the LogLens log ingestion and search server.

#![deny(unsafe_code)]

use anyhow::Result;
use api::{Config, LogOutput};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; the environment may already be set.
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_output {
        LogOutput::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogOutput::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }

    api::run_server_with_config(config).await
}
