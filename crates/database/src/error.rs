//! Database error types.

use thiserror::Error;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLx error (connection, query, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Record already exists
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;

/// Turn a unique-constraint violation into `AlreadyExists`.
pub(crate) fn map_unique(err: sqlx::Error, entity: &'static str, id: &str) -> DatabaseError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return DatabaseError::AlreadyExists {
                entity,
                id: id.to_string(),
            };
        }
    }
    DatabaseError::Sqlx(err)
}
