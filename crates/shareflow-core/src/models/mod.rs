//! Data models for the application
//!
//! This module contains all data structures used throughout the application:
//! the stored file record, the client-facing response shapes, and the query
//! parameter types for listing and search.

mod query;
mod record;
mod response;

// Re-export all models for convenient imports
pub use query::*;
pub use record::*;
pub use response::*;
