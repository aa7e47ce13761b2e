//! In-memory registry of live file records

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use shareflow_core::FileRecord;

/// Registry operation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Record {0} already exists")]
    DuplicateId(Uuid),

    #[error("Record {0} not found")]
    NotFound(Uuid),

    #[error("Download limit reached for {0}")]
    LimitReached(Uuid),
}

/// Registry for the metadata of every live file.
///
/// Thread-safe and async-compatible using tokio's RwLock.
/// Multiple async tasks can read records simultaneously without blocking,
/// while mutations are serialized. The lock is held only for map access,
/// never across I/O; callers persist and touch storage after release.
#[derive(Clone)]
pub struct FileRegistry {
    records: Arc<RwLock<HashMap<Uuid, FileRecord>>>,
}

impl FileRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a freshly uploaded record.
    ///
    /// Ids are never reused, so a collision means the caller generated a
    /// duplicate; the existing record is left untouched.
    pub async fn insert(&self, record: FileRecord) -> Result<(), RegistryError> {
        let mut records = self.records.write().await;

        match records.entry(record.id) {
            Entry::Occupied(_) => Err(RegistryError::DuplicateId(record.id)),
            Entry::Vacant(entry) => {
                entry.insert(record);
                Ok(())
            }
        }
    }

    /// Get a record by id, cloned out of the map.
    ///
    /// Lookups have no side effects; expiry is observed, not applied, here.
    pub async fn get(&self, id: Uuid) -> Option<FileRecord> {
        let records = self.records.read().await;
        records.get(&id).cloned()
    }

    /// Grant one download: check the limit and increment the counter under
    /// a single write lock, so concurrent grants can never exceed
    /// `max_downloads`. Returns the new counter value.
    pub async fn increment_downloads(&self, id: Uuid) -> Result<u32, RegistryError> {
        let mut records = self.records.write().await;

        let record = records.get_mut(&id).ok_or(RegistryError::NotFound(id))?;

        if record.limit_reached() {
            return Err(RegistryError::LimitReached(id));
        }

        record.downloads += 1;
        Ok(record.downloads)
    }

    /// Remove a record. Absent ids return `None`; removal is idempotent.
    pub async fn remove(&self, id: Uuid) -> Option<FileRecord> {
        let mut records = self.records.write().await;
        records.remove(&id)
    }

    /// Clone the current records into a vector for querying.
    pub async fn snapshot(&self) -> Vec<FileRecord> {
        let records = self.records.read().await;
        records.values().cloned().collect()
    }

    /// Clone the current records keyed by id, for persistence.
    pub async fn export(&self) -> HashMap<Uuid, FileRecord> {
        let records = self.records.read().await;
        records.clone()
    }

    /// Replace the registry contents wholesale. Used once at startup with
    /// the reconciled snapshot.
    pub async fn restore(&self, restored: HashMap<Uuid, FileRecord>) {
        let mut records = self.records.write().await;
        *records = restored;
    }

    pub async fn len(&self) -> usize {
        let records = self.records.read().await;
        records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for FileRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn record(id: Uuid, max_downloads: u32) -> FileRecord {
        let now = Utc::now();
        FileRecord {
            id,
            stored_name: format!("{}_data.bin", id),
            original_name: "data.bin".to_string(),
            size: 4,
            content_type: "application/octet-stream".to_string(),
            checksum: "00".to_string(),
            upload_time: now,
            expires_at: now + Duration::hours(1),
            downloads: 0,
            max_downloads,
            password: None,
            uploader_origin: "test".to_string(),
            tags: vec![],
            description: String::new(),
            content_path: format!("{}_data.bin", id),
        }
    }

    #[tokio::test]
    async fn test_new_registry_is_empty() {
        let registry = FileRegistry::new();
        assert!(registry.is_empty().await);
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let registry = FileRegistry::new();
        let id = Uuid::new_v4();

        registry.insert(record(id, 0)).await.unwrap();

        let fetched = registry.get(id).await.unwrap();
        assert_eq!(fetched.id, id);
        assert_eq!(registry.len().await, 1);

        assert!(registry.get(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_insert_duplicate_id_rejected() {
        let registry = FileRegistry::new();
        let id = Uuid::new_v4();

        registry.insert(record(id, 0)).await.unwrap();

        let mut second = record(id, 0);
        second.original_name = "other.bin".to_string();
        let result = registry.insert(second).await;
        assert_eq!(result, Err(RegistryError::DuplicateId(id)));

        // The original record is untouched.
        let fetched = registry.get(id).await.unwrap();
        assert_eq!(fetched.original_name, "data.bin");
    }

    #[tokio::test]
    async fn test_increment_downloads_until_limit() {
        let registry = FileRegistry::new();
        let id = Uuid::new_v4();
        registry.insert(record(id, 2)).await.unwrap();

        assert_eq!(registry.increment_downloads(id).await.unwrap(), 1);
        assert_eq!(registry.increment_downloads(id).await.unwrap(), 2);
        assert_eq!(
            registry.increment_downloads(id).await,
            Err(RegistryError::LimitReached(id))
        );

        // Counter never moves past the limit.
        assert_eq!(registry.get(id).await.unwrap().downloads, 2);
    }

    #[tokio::test]
    async fn test_increment_downloads_unknown_id() {
        let registry = FileRegistry::new();
        let id = Uuid::new_v4();
        assert_eq!(
            registry.increment_downloads(id).await,
            Err(RegistryError::NotFound(id))
        );
    }

    #[tokio::test]
    async fn test_increment_downloads_unlimited() {
        let registry = FileRegistry::new();
        let id = Uuid::new_v4();
        registry.insert(record(id, 0)).await.unwrap();

        for expected in 1..=100u32 {
            assert_eq!(registry.increment_downloads(id).await.unwrap(), expected);
        }
    }

    #[tokio::test]
    async fn test_concurrent_increments_never_exceed_limit() {
        let registry = FileRegistry::new();
        let id = Uuid::new_v4();
        registry.insert(record(id, 5)).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..20 {
            let registry = registry.clone();
            handles.push(tokio::spawn(
                async move { registry.increment_downloads(id).await },
            ));
        }

        let mut granted = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                granted += 1;
            }
        }

        assert_eq!(granted, 5);
        assert_eq!(registry.get(id).await.unwrap().downloads, 5);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let registry = FileRegistry::new();
        let id = Uuid::new_v4();
        registry.insert(record(id, 0)).await.unwrap();

        let removed = registry.remove(id).await;
        assert!(removed.is_some());
        assert_eq!(removed.unwrap().id, id);

        assert!(registry.remove(id).await.is_none());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_export_restore_roundtrip() {
        let registry = FileRegistry::new();
        for _ in 0..3 {
            registry.insert(record(Uuid::new_v4(), 0)).await.unwrap();
        }

        let exported = registry.export().await;
        assert_eq!(exported.len(), 3);

        let other = FileRegistry::new();
        other.restore(exported.clone()).await;
        assert_eq!(other.len().await, 3);
        for id in exported.keys() {
            assert!(other.get(*id).await.is_some());
        }
    }

    #[tokio::test]
    async fn test_restore_replaces_existing_contents() {
        let registry = FileRegistry::new();
        registry.insert(record(Uuid::new_v4(), 0)).await.unwrap();

        registry.restore(HashMap::new()).await;
        assert!(registry.is_empty().await);
    }
}
