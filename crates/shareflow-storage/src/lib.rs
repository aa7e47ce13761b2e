//! Shareflow Storage Library
//!
//! This crate provides the content store abstraction and its local
//! filesystem implementation. The store holds the raw bytes of shared
//! files under flat keys handed out by the upload path.
//!
//! # Storage key format
//!
//! Keys are the stored filename, `{id}_{sanitized original name}`. Keys
//! must not contain `..` or a leading `/`; every operation validates the
//! key before touching the filesystem.

pub mod local;
pub mod traits;

// Re-export commonly used types
pub use local::LocalStore;
pub use traits::{ByteStream, ContentStore, StorageError, StorageResult, StoredContent};
