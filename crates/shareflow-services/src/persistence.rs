//! Snapshot persistence for the registry

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::interval;

use shareflow_registry::{FileRegistry, SnapshotError, SnapshotStore};

/// Writes the registry to its JSON snapshot after mutations.
///
/// Saves are serialized through an internal mutex so an older export can
/// never land on top of a newer one. A failed save leaves the service
/// dirty and the periodic loop retries it on the next tick.
#[derive(Clone)]
pub struct PersistenceService {
    registry: FileRegistry,
    snapshot: SnapshotStore,
    dirty: Arc<AtomicBool>,
    save_lock: Arc<Mutex<()>>,
}

impl PersistenceService {
    pub fn new(registry: FileRegistry, snapshot: SnapshotStore) -> Self {
        Self {
            registry,
            snapshot,
            dirty: Arc::new(AtomicBool::new(false)),
            save_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Export the registry and write the snapshot, waiting for the result.
    pub async fn save_now(&self) -> Result<(), SnapshotError> {
        let _guard = self.save_lock.lock().await;

        // The flag tracks failed attempts only; every mutation site
        // schedules its own save.
        self.dirty.store(false, Ordering::Release);
        let records = self.registry.export().await;

        match self.snapshot.save(&records).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.dirty.store(true, Ordering::Release);
                Err(e)
            }
        }
    }

    /// Schedule a save without blocking the caller. Failures are logged
    /// and retried by the periodic loop.
    pub fn save_deferred(&self) {
        let service = self.clone();
        tokio::spawn(async move {
            if let Err(e) = service.save_now().await {
                tracing::warn!(error = %e, "Deferred snapshot save failed");
            }
        });
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Start the background task that saves the snapshot on a fixed
    /// interval, independent of the per-mutation saves. A tick also picks
    /// up any save that previously failed.
    /// Returns a JoinHandle for graceful shutdown
    pub fn start(self: Arc<Self>, interval_secs: u64) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut save_interval = interval(Duration::from_secs(interval_secs));
            // The first tick of an interval completes at once; consume it so
            // the first save runs a full interval after startup.
            save_interval.tick().await;

            loop {
                save_interval.tick().await;

                if let Err(e) = self.save_now().await {
                    tracing::error!(error = %e, "Periodic snapshot save failed");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};
    use shareflow_core::FileRecord;
    use tempfile::tempdir;
    use uuid::Uuid;

    fn record(name: &str) -> FileRecord {
        let now = Utc::now();
        let id = Uuid::new_v4();
        FileRecord {
            id,
            stored_name: format!("{}_{}", id, name),
            original_name: name.to_string(),
            size: 3,
            content_type: "text/plain".to_string(),
            checksum: "00".to_string(),
            upload_time: now,
            expires_at: now + ChronoDuration::hours(1),
            downloads: 0,
            max_downloads: 0,
            password: None,
            uploader_origin: "test".to_string(),
            tags: vec![],
            description: String::new(),
            content_path: format!("{}_{}", id, name),
        }
    }

    #[tokio::test]
    async fn test_save_now_writes_registry_contents() {
        let dir = tempdir().unwrap();
        let snapshot = SnapshotStore::new(dir.path().join("snapshot.json"));
        let registry = FileRegistry::new();
        registry.insert(record("a.txt")).await.unwrap();

        let service = PersistenceService::new(registry.clone(), snapshot.clone());
        service.save_now().await.unwrap();
        assert!(!service.is_dirty());

        let loaded = snapshot.load().await.unwrap();
        assert_eq!(loaded, registry.export().await);
    }

    #[tokio::test]
    async fn test_failed_save_marks_dirty() {
        let dir = tempdir().unwrap();
        // A file where the parent directory should be makes every save fail.
        let blocker = dir.path().join("blocker");
        tokio::fs::write(&blocker, b"x").await.unwrap();
        let snapshot = SnapshotStore::new(blocker.join("snapshot.json"));

        let registry = FileRegistry::new();
        registry.insert(record("a.txt")).await.unwrap();

        let service = PersistenceService::new(registry, snapshot);
        assert!(service.save_now().await.is_err());
        assert!(service.is_dirty());
    }

    #[tokio::test]
    async fn test_save_deferred_eventually_writes() {
        let dir = tempdir().unwrap();
        let snapshot = SnapshotStore::new(dir.path().join("snapshot.json"));
        let registry = FileRegistry::new();
        registry.insert(record("a.txt")).await.unwrap();

        let service = PersistenceService::new(registry, snapshot.clone());
        service.save_deferred();

        let mut loaded = None;
        for _ in 0..100 {
            if snapshot.path().exists() {
                loaded = Some(snapshot.load().await.unwrap());
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(loaded.map(|m| m.len()), Some(1));
    }

    #[tokio::test]
    async fn test_retry_loop_flushes_dirty_state() {
        let dir = tempdir().unwrap();
        let snapshot = SnapshotStore::new(dir.path().join("snapshot.json"));
        let registry = FileRegistry::new();
        registry.insert(record("a.txt")).await.unwrap();

        let service = Arc::new(PersistenceService::new(registry, snapshot.clone()));
        service.dirty.store(true, Ordering::Release);

        let handle = service.clone().start(1);

        let mut flushed = false;
        for _ in 0..300 {
            if !service.is_dirty() && snapshot.path().exists() {
                flushed = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();

        assert!(flushed);
        assert_eq!(snapshot.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_periodic_loop_saves_without_prior_failure() {
        let dir = tempdir().unwrap();
        let snapshot = SnapshotStore::new(dir.path().join("snapshot.json"));
        let registry = FileRegistry::new();
        registry.insert(record("a.txt")).await.unwrap();

        let service = Arc::new(PersistenceService::new(registry, snapshot.clone()));
        let handle = service.clone().start(1);

        // Nothing marked the service dirty; the interval alone drives the
        // save, one full period after start.
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!snapshot.path().exists());

        let mut saved = false;
        for _ in 0..300 {
            if snapshot.path().exists() {
                saved = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();

        assert!(saved);
        assert_eq!(snapshot.load().await.unwrap().len(), 1);
    }
}
