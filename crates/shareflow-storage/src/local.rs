use crate::traits::{ByteStream, ContentStore, StorageError, StorageResult, StoredContent};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use tokio::fs;

/// Local filesystem content store
#[derive(Clone)]
pub struct LocalStore {
    base_path: PathBuf,
}

impl LocalStore {
    /// Create a new LocalStore instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for stored content (e.g., "./files")
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStore { base_path })
    }

    /// Convert a storage key to a filesystem path with security validation
    ///
    /// Rejects keys that could escape the base storage directory.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        let path = self.base_path.join(key);

        // Keys pointing at existing files must also resolve inside the base
        // directory once symlinks are followed.
        if let Ok(canonical) = path.canonicalize() {
            let base_canonical = self.base_path.canonicalize().map_err(|e| {
                StorageError::ConfigError(format!("Failed to canonicalize base path: {}", e))
            })?;
            if canonical.strip_prefix(&base_canonical).is_err() {
                return Err(StorageError::InvalidKey(
                    "Storage key resolves outside storage directory".to_string(),
                ));
            }
        }

        Ok(path)
    }
}

#[async_trait]
impl ContentStore for LocalStore {
    async fn write(&self, key: &str, data: Bytes) -> StorageResult<StoredContent> {
        let path = self.key_to_path(key)?;
        let base_path = self.base_path.clone();
        let stored_key = key.to_string();
        let start = std::time::Instant::now();

        // Hashing and temp-file I/O are blocking; keep them off the runtime
        // threads. The temp file lives in the storage root so the final
        // rename stays on one filesystem, and it is cleaned up automatically
        // if any step fails.
        let stored = tokio::task::spawn_blocking(move || -> StorageResult<StoredContent> {
            let checksum = hex::encode(Sha256::digest(&data));

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StorageError::WriteFailed(format!(
                        "Failed to create parent directory for {}: {}",
                        path.display(),
                        e
                    ))
                })?;
            }

            let mut temp = NamedTempFile::new_in(&base_path).map_err(|e| {
                StorageError::WriteFailed(format!("Failed to create temp file: {}", e))
            })?;

            temp.write_all(&data).map_err(|e| {
                StorageError::WriteFailed(format!("Failed to write temp file: {}", e))
            })?;

            temp.as_file().sync_all().map_err(|e| {
                StorageError::WriteFailed(format!("Failed to sync temp file: {}", e))
            })?;

            temp.persist(&path).map_err(|e| {
                StorageError::WriteFailed(format!(
                    "Failed to move content into place at {}: {}",
                    path.display(),
                    e.error
                ))
            })?;

            Ok(StoredContent {
                key: stored_key,
                size: data.len() as u64,
                checksum,
            })
        })
        .await
        .map_err(|e| StorageError::WriteFailed(format!("Write task failed: {}", e)))??;

        tracing::info!(
            key = %stored.key,
            size_bytes = stored.size,
            checksum = %stored.checksum,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Content write successful"
        );

        Ok(stored)
    }

    async fn read(&self, key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(key.to_string()));
        }

        let data = fs::read(&path).await.map_err(|e| {
            StorageError::ReadFailed(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        Ok(data)
    }

    async fn open_stream(&self, key: &str) -> StorageResult<ByteStream> {
        let path = self.key_to_path(key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(key.to_string()));
        }

        let file = fs::File::open(&path).await.map_err(|e| {
            StorageError::ReadFailed(format!("Failed to open file {}: {}", path.display(), e))
        })?;

        let reader = tokio_util::io::ReaderStream::new(file);

        let logged_key = key.to_string();
        let stream = reader.map(move |result| {
            result.map_err(|e| {
                tracing::error!(key = %logged_key, error = %e, "Content stream read error");
                StorageError::ReadFailed(format!("Failed to read chunk: {}", e))
            })
        });

        Ok(Box::pin(stream))
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(key = %key, "Content removed");

        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_write_read_roundtrip() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path()).await.unwrap();

        let data = Bytes::from_static(b"test data");
        let stored = store.write("abc_test.txt", data.clone()).await.unwrap();

        assert_eq!(stored.key, "abc_test.txt");
        assert_eq!(stored.size, data.len() as u64);
        assert_eq!(stored.checksum, hex::encode(Sha256::digest(&data)));

        let read_back = store.read("abc_test.txt").await.unwrap();
        assert_eq!(read_back, data.to_vec());
    }

    #[tokio::test]
    async fn test_write_overwrites_atomically() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path()).await.unwrap();

        store
            .write("key.bin", Bytes::from_static(b"first version"))
            .await
            .unwrap();
        store
            .write("key.bin", Bytes::from_static(b"second"))
            .await
            .unwrap();

        let read_back = store.read("key.bin").await.unwrap();
        assert_eq!(read_back, b"second");

        // No temp files left behind in the storage root.
        let mut entries = fs::read_dir(dir.path()).await.unwrap();
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        assert_eq!(names, vec!["key.bin".to_string()]);
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path()).await.unwrap();

        let result = store.read("../../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = store.remove("../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = store.exists("/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = store
            .write("../escape.txt", Bytes::from_static(b"nope"))
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_remove_nonexistent_is_ok() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path()).await.unwrap();

        let result = store.remove("nonexistent.txt").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_exists() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path()).await.unwrap();

        store
            .write("exists.txt", Bytes::from_static(b"test"))
            .await
            .unwrap();

        assert!(store.exists("exists.txt").await.unwrap());
        assert!(!store.exists("nonexistent.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_read_missing_key_is_not_found() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path()).await.unwrap();

        let result = store.read("missing.txt").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));

        let result = store.open_stream("missing.txt").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_stream_read_matches_written() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path()).await.unwrap();

        let data = Bytes::from(vec![7u8; 128 * 1024]);
        store.write("big.bin", data.clone()).await.unwrap();

        let mut stream = store.open_stream("big.bin").await.unwrap();
        let mut downloaded = Vec::new();

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.unwrap();
            downloaded.extend_from_slice(&chunk);
        }

        assert_eq!(downloaded, data.to_vec());
    }
}
