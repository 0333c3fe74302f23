//! Persistence adapters for external storage.

pub mod sqlite;
