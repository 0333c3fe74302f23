//! Dataset repository port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Dataset, DatasetImage};

/// Repository interface for dataset persistence.
#[async_trait]
pub trait DatasetRepository: Send + Sync {
    /// Register a dataset and its image relative paths in one atomic unit.
    async fn insert(&self, name: &str, root_path: &str, rel_paths: &[String]) -> DomainResult<Dataset>;

    /// Get a dataset by id.
    async fn get(&self, id: i64) -> DomainResult<Option<Dataset>>;

    /// List all datasets.
    async fn list(&self) -> DomainResult<Vec<Dataset>>;

    /// List a dataset's images in insertion order.
    async fn images(&self, dataset_id: i64) -> DomainResult<Vec<DatasetImage>>;
}
