//! Background eviction of expired and exhausted files

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::interval;
use uuid::Uuid;

use shareflow_core::EvictionReason;
use shareflow_registry::FileRegistry;
use shareflow_storage::ContentStore;

use crate::persistence::PersistenceService;

/// Remove one record and its content.
///
/// Shared by the sweeper and by handlers that observe an expired record
/// during a lookup. Returns false when the record was already gone.
pub async fn evict_now(
    registry: &FileRegistry,
    store: &dyn ContentStore,
    id: Uuid,
    reason: EvictionReason,
) -> bool {
    let Some(record) = registry.remove(id).await else {
        return false;
    };

    tracing::info!(
        file_id = %id,
        reason = reason.as_str(),
        downloads = record.downloads,
        expires_at = %record.expires_at,
        "Evicting file"
    );

    // The record is already gone; a content failure leaves orphaned bytes,
    // never a record pointing at nothing.
    if let Err(e) = store.remove(&record.content_path).await {
        tracing::error!(
            error = %e,
            file_id = %id,
            content_path = %record.content_path,
            "Failed to delete content for evicted record"
        );
    }

    true
}

#[derive(Clone)]
pub struct EvictionSweeper {
    registry: FileRegistry,
    store: Arc<dyn ContentStore>,
    persistence: PersistenceService,
}

impl EvictionSweeper {
    pub fn new(
        registry: FileRegistry,
        store: Arc<dyn ContentStore>,
        persistence: PersistenceService,
    ) -> Self {
        Self {
            registry,
            store,
            persistence,
        }
    }

    /// Start the background sweep task
    /// Returns a JoinHandle for graceful shutdown
    pub fn start(self: Arc<Self>, interval_secs: u64) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut sweep_interval = interval(Duration::from_secs(interval_secs));
            // The first tick of an interval completes at once; consume it so
            // the first sweep runs a full interval after startup.
            sweep_interval.tick().await;

            loop {
                sweep_interval.tick().await;

                tracing::info!("Starting scheduled eviction sweep");

                if let Err(e) = self.sweep_once().await {
                    tracing::error!(error = %e, "Eviction sweep failed");
                }
            }
        })
    }

    /// Evict every record whose TTL has lapsed or whose download limit is
    /// exhausted. Returns the number of records removed.
    #[tracing::instrument(skip(self), fields(sweep.operation = "evict_eligible"))]
    pub async fn sweep_once(&self) -> Result<usize, anyhow::Error> {
        let now = Utc::now();

        let eligible: Vec<(Uuid, EvictionReason)> = self
            .registry
            .snapshot()
            .await
            .into_iter()
            .filter_map(|record| record.eviction_reason(now).map(|reason| (record.id, reason)))
            .collect();

        let mut evicted = 0usize;
        for (id, reason) in eligible {
            if evict_now(&self.registry, self.store.as_ref(), id, reason).await {
                evicted += 1;
            }
        }

        if evicted > 0 {
            if let Err(e) = self.persistence.save_now().await {
                tracing::error!(error = %e, "Failed to save snapshot after eviction sweep");
            }
        }

        tracing::info!(evicted, "Eviction sweep completed");
        Ok(evicted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use chrono::{DateTime, Duration as ChronoDuration, Utc};
    use shareflow_core::FileRecord;
    use shareflow_registry::SnapshotStore;
    use shareflow_storage::LocalStore;
    use tempfile::{tempdir, TempDir};

    fn record(expires_at: DateTime<Utc>, downloads: u32, max_downloads: u32) -> FileRecord {
        let id = Uuid::new_v4();
        FileRecord {
            id,
            stored_name: format!("{}_data.bin", id),
            original_name: "data.bin".to_string(),
            size: 4,
            content_type: "application/octet-stream".to_string(),
            checksum: "00".to_string(),
            upload_time: Utc::now(),
            expires_at,
            downloads,
            max_downloads,
            password: None,
            uploader_origin: "test".to_string(),
            tags: vec![],
            description: String::new(),
            content_path: format!("{}_data.bin", id),
        }
    }

    async fn sweeper_fixture() -> (TempDir, EvictionSweeper, FileRegistry, Arc<LocalStore>, SnapshotStore) {
        let dir = tempdir().unwrap();
        let store = Arc::new(LocalStore::new(dir.path().join("files")).await.unwrap());
        let registry = FileRegistry::new();
        let snapshot = SnapshotStore::new(dir.path().join("snapshot.json"));
        let persistence = PersistenceService::new(registry.clone(), snapshot.clone());
        let sweeper = EvictionSweeper::new(registry.clone(), store.clone(), persistence);
        (dir, sweeper, registry, store, snapshot)
    }

    async fn insert_with_content(
        registry: &FileRegistry,
        store: &LocalStore,
        record: FileRecord,
    ) {
        store
            .write(&record.content_path, Bytes::from_static(b"data"))
            .await
            .unwrap();
        registry.insert(record).await.unwrap();
    }

    #[tokio::test]
    async fn test_sweep_removes_expired_record_and_content() {
        let (_dir, sweeper, registry, store, snapshot) = sweeper_fixture().await;
        let expired = record(Utc::now() - ChronoDuration::seconds(1), 0, 0);
        let key = expired.content_path.clone();
        insert_with_content(&registry, &store, expired).await;

        assert_eq!(sweeper.sweep_once().await.unwrap(), 1);

        assert!(registry.is_empty().await);
        assert!(!store.exists(&key).await.unwrap());
        assert!(snapshot.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sweep_removes_exhausted_record() {
        let (_dir, sweeper, registry, store, _snapshot) = sweeper_fixture().await;
        let exhausted = record(Utc::now() + ChronoDuration::hours(1), 3, 3);
        insert_with_content(&registry, &store, exhausted).await;

        assert_eq!(sweeper.sweep_once().await.unwrap(), 1);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_sweep_keeps_live_records() {
        let (_dir, sweeper, registry, store, snapshot) = sweeper_fixture().await;
        let live = record(Utc::now() + ChronoDuration::hours(1), 1, 3);
        let id = live.id;
        insert_with_content(&registry, &store, live).await;

        assert_eq!(sweeper.sweep_once().await.unwrap(), 0);

        assert!(registry.get(id).await.is_some());
        // Nothing was evicted, so nothing was saved.
        assert!(!snapshot.path().exists());
    }

    #[tokio::test]
    async fn test_sweep_tolerates_missing_content() {
        let (_dir, sweeper, registry, _store, _snapshot) = sweeper_fixture().await;
        let expired = record(Utc::now() - ChronoDuration::seconds(1), 0, 0);
        registry.insert(expired).await.unwrap();

        assert_eq!(sweeper.sweep_once().await.unwrap(), 1);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_start_waits_full_interval_before_first_sweep() {
        let (_dir, sweeper, registry, store, _snapshot) = sweeper_fixture().await;
        let expired = record(Utc::now() - ChronoDuration::seconds(1), 0, 0);
        let id = expired.id;
        insert_with_content(&registry, &store, expired).await;

        let handle = Arc::new(sweeper).start(3600);

        // No sweep fires at startup; the eligible record survives until the
        // interval elapses.
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(registry.get(id).await.is_some());

        handle.abort();
    }

    #[tokio::test]
    async fn test_evict_now_absent_record_is_noop() {
        let (_dir, _sweeper, registry, store, _snapshot) = sweeper_fixture().await;

        let evicted = evict_now(
            &registry,
            store.as_ref(),
            Uuid::new_v4(),
            EvictionReason::Expired,
        )
        .await;

        assert!(!evicted);
    }
}
