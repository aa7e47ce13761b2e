//! Shareflow Registry Library
//!
//! This crate provides the in-memory file metadata registry, the query
//! engine that runs over registry snapshots, and the JSON snapshot store
//! used to survive restarts.

pub mod query;
pub mod registry;
pub mod snapshot;

// Re-export commonly used types
pub use query::{paginate, search, stats, Page, SearchFilter, SortKey};
pub use registry::{FileRegistry, RegistryError};
pub use snapshot::{SnapshotError, SnapshotStore};
