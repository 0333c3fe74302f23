//! Larkspur - Medical-Image Annotation Core
//!
//! Larkspur manages image datasets and labeling sessions for medical-image
//! annotation. Its centerpiece is an adaptive pairwise-comparison ranking
//! engine: comparison/active-sort sessions propose one slice pair at a time,
//! derive a total order from the accumulated judgments, and stop as soon as
//! the order is fully determined.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - **Domain Layer** (`domain`): models, errors, and repository ports
//! - **Service Layer** (`services`): the ranking engine, sampling, and the
//!   session controller
//! - **Adapters** (`adapters`): SQLite persistence behind the ports
//! - **Infrastructure** (`infrastructure`): configuration loading
//! - **CLI Layer** (`cli`): command-line interface

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    Comparison, Config, Dataset, DatasetImage, Label, LabelingSession, SessionKind, Slice,
    SliceRef, SortMatrix,
};
pub use services::sort::{build_matrix, sort_slices, SortOutcome};
pub use services::SessionService;
