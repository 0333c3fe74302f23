//! Service layer: pure ranking logic and session orchestration.

pub mod sampling;
pub mod session_service;
pub mod sort;

pub use session_service::{SessionElements, SessionResults, SessionService, SliceResult};
pub use sort::{build_matrix, initial_comparison, sort_slices, SortOutcome};
