//! Domain errors for the larkspur annotation core.

use thiserror::Error;

use super::models::element::SliceRef;

/// Domain-level errors that can occur in the larkspur system.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Dataset not found: {0}")]
    DatasetNotFound(i64),

    #[error("Session not found: {0}")]
    SessionNotFound(i64),

    #[error("Element not found: {0}")]
    ElementNotFound(i64),

    #[error("Invalid element reference: session {session_id} has no comparison element {element_id}")]
    InvalidElementReference { session_id: i64, element_id: i64 },

    #[error("Inconsistent judgment history: {left} and {right} already rank in the opposite order")]
    InconsistentJudgmentHistory { left: SliceRef, right: SliceRef },

    #[error("Empty session: {kind} sessions need at least {needed} slices, got {got}")]
    EmptySession { kind: String, needed: usize, got: usize },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}
