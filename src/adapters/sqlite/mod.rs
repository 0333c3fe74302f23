//! SQLite database adapters for the larkspur annotation core.

pub mod connection;
pub mod dataset_repository;
pub mod element_repository;
pub mod migrations;
pub mod session_repository;

pub use connection::{create_pool, create_test_pool, ConnectionError};
pub use dataset_repository::SqliteDatasetRepository;
pub use element_repository::SqliteElementRepository;
pub use migrations::{MigrationError, Migrator};
pub use session_repository::SqliteSessionRepository;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::domain::errors::{DomainError, DomainResult};

/// Parse an RFC3339 datetime string from a SQLite row field.
pub fn parse_datetime(s: &str) -> DomainResult<DateTime<Utc>> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map_err(|e| DomainError::SerializationError(e.to_string()))
        .map(|dt| dt.with_timezone(&Utc))
}

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),
    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),
    #[error("Query error: {0}")]
    Query(#[from] sqlx::Error),
}

/// Open (creating if necessary) and migrate a database.
pub async fn initialize_database(
    database_url: &str,
    max_connections: u32,
) -> Result<SqlitePool, DatabaseError> {
    let pool = create_pool(database_url, max_connections).await?;
    Migrator::new(pool.clone()).run().await?;
    Ok(pool)
}

/// Create an in-memory test pool with all migrations applied.
pub async fn create_migrated_test_pool() -> Result<SqlitePool, DatabaseError> {
    let pool = create_test_pool().await?;
    Migrator::new(pool.clone()).run().await?;
    Ok(pool)
}
