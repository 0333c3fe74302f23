//! Shared helpers for integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use sqlx::SqlitePool;

use larkspur::adapters::sqlite::{
    create_migrated_test_pool, SqliteDatasetRepository, SqliteElementRepository,
    SqliteSessionRepository,
};
use larkspur::domain::models::{SessionKind, SliceRef};
use larkspur::domain::ports::{DatasetRepository, NewSession};
use larkspur::services::SessionService;

pub type Service = SessionService<SqliteSessionRepository, SqliteElementRepository>;

pub async fn setup() -> (SqlitePool, Service) {
    let pool = create_migrated_test_pool()
        .await
        .expect("in-memory pool with migrations");
    let service = SessionService::new(
        Arc::new(SqliteSessionRepository::new(pool.clone())),
        Arc::new(SqliteElementRepository::new(pool.clone())),
    );
    (pool, service)
}

/// Insert a dataset with `image_count` images and return its id plus one
/// slice reference per image, in image order.
pub async fn seed_dataset(pool: &SqlitePool, image_count: usize) -> (i64, Vec<SliceRef>) {
    let repo = SqliteDatasetRepository::new(pool.clone());
    let rel_paths: Vec<String> = (0..image_count).map(|i| format!("scan_{i:03}.nii.gz")).collect();
    let dataset = repo
        .insert("test-dataset", "/data/scans", &rel_paths)
        .await
        .expect("dataset insert");
    let images = repo.images(dataset.id).await.expect("dataset images");
    let slices = images.iter().map(|img| SliceRef::new(img.id, 0, 0)).collect();
    (dataset.id, slices)
}

pub fn new_session(dataset_id: i64, kind: SessionKind) -> NewSession {
    NewSession {
        dataset_id,
        kind,
        name: "test-session".to_string(),
        prompt: "Which slice shows more severe atrophy?".to_string(),
        label_options: String::new(),
        metadata_json: "{}".to_string(),
    }
}
