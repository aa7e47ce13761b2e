//! Shareflow Core Library
//!
//! This crate provides the domain models, error types, configuration, and
//! input validation that are shared across all Shareflow components.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{EvictionReason, FileRecord, FileRecordResponse};
