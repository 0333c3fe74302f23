//! Repository ports implemented by the persistence adapters.

pub mod dataset_repository;
pub mod element_repository;
pub mod session_repository;

pub use dataset_repository::DatasetRepository;
pub use element_repository::ElementRepository;
pub use session_repository::{NewSession, SessionRepository};
