//! Session repository port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{LabelingSession, SessionKind, SliceRef};

/// Attributes of a session to be created.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub dataset_id: i64,
    pub kind: SessionKind,
    pub name: String,
    pub prompt: String,
    pub label_options: String,
    pub metadata_json: String,
}

/// Repository interface for labeling session persistence.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Create a session with its slice elements and seed comparisons as one
    /// atomic unit. Slices and comparisons receive dense zero-based indices
    /// in the order given.
    async fn create(
        &self,
        session: NewSession,
        slices: &[SliceRef],
        comparisons: &[(SliceRef, SliceRef)],
    ) -> DomainResult<LabelingSession>;

    /// Get a session by id.
    async fn get(&self, id: i64) -> DomainResult<Option<LabelingSession>>;

    /// List sessions belonging to a dataset.
    async fn list_for_dataset(&self, dataset_id: i64) -> DomainResult<Vec<LabelingSession>>;

    /// Delete a session, cascading its elements and their labels.
    async fn delete(&self, id: i64) -> DomainResult<()>;
}
