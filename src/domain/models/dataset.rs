//! Dataset domain models.
//!
//! A dataset registers a directory of medical images by name. Sessions belong
//! to a dataset and sample their slices from its images.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered image collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: i64,
    pub name: String,
    /// Absolute path to the directory the image relative paths resolve against.
    pub root_path: String,
    pub created_at: DateTime<Utc>,
}

/// One image file within a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetImage {
    pub id: i64,
    pub dataset_id: i64,
    pub rel_path: String,
}
