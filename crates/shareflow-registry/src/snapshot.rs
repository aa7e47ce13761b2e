//! Crash-tolerant JSON snapshot of the registry

use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use shareflow_core::FileRecord;

/// Snapshot persistence errors
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to serialize snapshot: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Failed to write snapshot to {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read snapshot from {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed snapshot at {path}: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads and writes the registry snapshot file.
///
/// Saves are atomic: the document is written to a temporary sibling and
/// renamed over the snapshot path, so a crash mid-write leaves the previous
/// snapshot intact. The document is pretty-printed JSON keyed by record id,
/// in id order, so identical registries produce identical bytes.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the full record map to disk, replacing any previous snapshot.
    pub async fn save(&self, records: &HashMap<Uuid, FileRecord>) -> Result<(), SnapshotError> {
        let start = Instant::now();
        let path_display = self.path.display().to_string();

        let ordered: BTreeMap<&Uuid, &FileRecord> = records.iter().collect();
        let document = serde_json::to_vec_pretty(&ordered).map_err(SnapshotError::Serialize)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|e| SnapshotError::Write {
                    path: path_display.clone(),
                    source: e,
                })?;
            }
        }

        // Unique temp name so overlapping saves never clobber each other's
        // half-written files.
        let temp_path = self
            .path
            .with_extension(format!("{}.tmp", Uuid::new_v4().simple()));

        let write_result = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(&document).await?;
            file.sync_all().await?;
            fs::rename(&temp_path, &self.path).await
        }
        .await;

        if let Err(e) = write_result {
            let _ = fs::remove_file(&temp_path).await;
            return Err(SnapshotError::Write {
                path: path_display,
                source: e,
            });
        }

        tracing::info!(
            path = %path_display,
            records = records.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Snapshot saved"
        );

        Ok(())
    }

    /// Load the snapshot. A missing file is a clean first start and yields
    /// an empty map; a present but unreadable or unparsable file is an
    /// error so a damaged snapshot is never silently discarded.
    pub async fn load(&self) -> Result<HashMap<Uuid, FileRecord>, SnapshotError> {
        let path_display = self.path.display().to_string();

        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %path_display, "No snapshot found, starting empty");
                return Ok(HashMap::new());
            }
            Err(e) => {
                return Err(SnapshotError::Read {
                    path: path_display,
                    source: e,
                })
            }
        };

        let records: HashMap<Uuid, FileRecord> =
            serde_json::from_slice(&bytes).map_err(|e| SnapshotError::Malformed {
                path: path_display.clone(),
                source: e,
            })?;

        tracing::info!(path = %path_display, records = records.len(), "Snapshot loaded");
        Ok(records)
    }
}
