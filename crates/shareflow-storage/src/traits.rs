//! Content store abstraction trait
//!
//! This module defines the ContentStore trait that storage backends
//! implement.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Content not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Chunked content stream returned by `open_stream`.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// Outcome of a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredContent {
    pub key: String,
    pub size: u64,
    /// Hex-encoded SHA-256 of the stored bytes.
    pub checksum: String,
}

/// Content store abstraction trait
///
/// A record in the metadata registry refers to exactly one stored object
/// through its key. Writes are atomic: a key either holds the complete
/// payload or nothing, never a partial write.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Write a payload under `key` and return its size and checksum.
    ///
    /// The payload is hashed and written to a temporary file first, then
    /// moved into place, so readers never observe partial content.
    async fn write(&self, key: &str, data: Bytes) -> StorageResult<StoredContent>;

    /// Read the full content stored under `key`.
    async fn read(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Open the content under `key` as a chunked byte stream.
    ///
    /// This allows serving large files without loading them entirely into
    /// memory.
    async fn open_stream(&self, key: &str) -> StorageResult<ByteStream>;

    /// Remove the content under `key`. Removing an absent key is Ok.
    async fn remove(&self, key: &str) -> StorageResult<()>;

    /// Check whether `key` holds content.
    async fn exists(&self, key: &str) -> StorageResult<bool>;
}
