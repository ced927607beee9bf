//! HTTP server for the chat assistant.
//!
//! Streams model turns as server-sent events, runs the document and weather
//! tools, and serves chat history, documents, suggestions and votes from
//! SQLite. Identity comes from headers set by the fronting identity provider.

mod auth;
mod config;
mod error;
mod routes;
mod state;
mod title;
mod turn;

use std::sync::Arc;

use database::Database;
use model_provider::Providers;
use tracing::info;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, max_steps = config.max_steps, "Starting chat server");

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    let providers = Providers::from_env()?;
    let tools = chat_tools::default_registry(reqwest::Client::new());

    let addr = config.addr;
    let state = AppState::new(db, Arc::new(providers), tools, config);
    let app = routes::router().with_state(state);

    // Start server
    info!(%addr, "Chat server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
