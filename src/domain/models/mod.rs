//! Domain models for the larkspur annotation core.

pub mod config;
pub mod dataset;
pub mod element;
pub mod matrix;
pub mod session;

pub use config::{Config, DatabaseConfig, LoggingConfig};
pub use dataset::{Dataset, DatasetImage};
pub use element::{label_to_edge, Comparison, ElementKind, Label, Slice, SliceRef, LABEL_FIRST, LABEL_SECOND};
pub use matrix::SortMatrix;
pub use session::{LabelingSession, SessionKind};
