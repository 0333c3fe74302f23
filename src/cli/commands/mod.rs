//! CLI command implementations.

pub mod dataset;
pub mod init;
pub mod label;
pub mod session;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::adapters::sqlite::{
    initialize_database, SqliteDatasetRepository, SqliteElementRepository, SqliteSessionRepository,
};
use crate::infrastructure::config::ConfigLoader;
use crate::services::SessionService;

pub type Service = SessionService<SqliteSessionRepository, SqliteElementRepository>;

/// Open the project database per the loaded configuration.
pub async fn open_pool() -> Result<SqlitePool> {
    let config = ConfigLoader::load()?;
    initialize_database(&config.database.url(), config.database.max_connections)
        .await
        .context("failed to open database")
}

pub fn dataset_repository(pool: &SqlitePool) -> SqliteDatasetRepository {
    SqliteDatasetRepository::new(pool.clone())
}

pub fn session_service(pool: &SqlitePool) -> Service {
    SessionService::new(
        Arc::new(SqliteSessionRepository::new(pool.clone())),
        Arc::new(SqliteElementRepository::new(pool.clone())),
    )
}
