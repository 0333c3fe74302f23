//! SQLite implementation of the DatasetRepository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Dataset, DatasetImage};
use crate::domain::ports::DatasetRepository;

use super::parse_datetime;

#[derive(Clone)]
pub struct SqliteDatasetRepository {
    pool: SqlitePool,
}

impl SqliteDatasetRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DatasetRepository for SqliteDatasetRepository {
    async fn insert(&self, name: &str, root_path: &str, rel_paths: &[String]) -> DomainResult<Dataset> {
        if rel_paths.is_empty() {
            return Err(DomainError::ValidationFailed(format!(
                "dataset {name} has no images"
            )));
        }

        let created_at = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO datasets (dataset_name, root_path, created_at) VALUES (?, ?, ?)"
        )
        .bind(name)
        .bind(root_path)
        .bind(created_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        let dataset_id = result.last_insert_rowid();

        for rel_path in rel_paths {
            sqlx::query("INSERT INTO dataset_images (dataset_id, rel_path) VALUES (?, ?)")
                .bind(dataset_id)
                .bind(rel_path)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(Dataset {
            id: dataset_id,
            name: name.to_string(),
            root_path: root_path.to_string(),
            created_at,
        })
    }

    async fn get(&self, id: i64) -> DomainResult<Option<Dataset>> {
        let row: Option<DatasetRow> = sqlx::query_as(
            "SELECT id, dataset_name, root_path, created_at FROM datasets WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn list(&self) -> DomainResult<Vec<Dataset>> {
        let rows: Vec<DatasetRow> = sqlx::query_as(
            "SELECT id, dataset_name, root_path, created_at FROM datasets ORDER BY id"
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn images(&self, dataset_id: i64) -> DomainResult<Vec<DatasetImage>> {
        let rows: Vec<(i64, i64, String)> = sqlx::query_as(
            "SELECT id, dataset_id, rel_path FROM dataset_images WHERE dataset_id = ? ORDER BY id"
        )
        .bind(dataset_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, dataset_id, rel_path)| DatasetImage { id, dataset_id, rel_path })
            .collect())
    }
}

#[derive(sqlx::FromRow)]
struct DatasetRow {
    id: i64,
    dataset_name: String,
    root_path: String,
    created_at: String,
}

impl TryFrom<DatasetRow> for Dataset {
    type Error = DomainError;

    fn try_from(row: DatasetRow) -> Result<Self, Self::Error> {
        Ok(Dataset {
            id: row.id,
            name: row.dataset_name,
            root_path: row.root_path,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}
