//! Domain layer for the larkspur annotation core.
//!
//! Pure business logic: models, errors, and the repository ports the
//! persistence adapters implement. Nothing in this layer performs I/O.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
