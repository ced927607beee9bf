//! SQLite persistence layer for the chat assistant.
//!
//! This crate provides async database operations for profiles, chats,
//! messages, versioned documents, suggestions, and votes using SQLx with
//! SQLite. Lookups that may legitimately miss return `Option`.
//!
//! # Example
//!
//! ```no_run
//! use database::{chat, models::{Chat, Visibility}, profile, timestamp, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:chat.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     profile::ensure_profile(db.pool(), "user-1", "user@example.com").await?;
//!
//!     let now = timestamp::now();
//!     let chat = Chat {
//!         id: "2f0c1c8e-6d0a-4f5e-9a53-0f3f1d7d9b21".to_string(),
//!         user_id: "user-1".to_string(),
//!         title: "Weather in Berlin".to_string(),
//!         visibility: Visibility::Private,
//!         created_at: now.clone(),
//!         updated_at: now,
//!     };
//!     chat::save_chat(db.pool(), &chat).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod document;
pub mod error;
pub mod message;
pub mod models;
pub mod profile;
pub mod suggestion;
pub mod timestamp;
pub mod vote;

pub use error::{DatabaseError, Result};
pub use models::{Chat, Document, DocumentKind, Message, Profile, Suggestion, Visibility, Vote};
pub use sqlx::types::Json;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `sqlite::memory:` for tests.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Round trip a trivial query to check the pool can still serve.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
