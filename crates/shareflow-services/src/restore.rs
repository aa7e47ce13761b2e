//! Startup restore of the registry from its snapshot

use std::collections::HashMap;

use anyhow::Context;
use uuid::Uuid;

use shareflow_core::FileRecord;
use shareflow_registry::SnapshotStore;
use shareflow_storage::ContentStore;

/// Load the snapshot and reconcile it against the content store.
///
/// Records whose bytes are gone are dropped with a warning, so the
/// registry never advertises a file it cannot serve. A missing snapshot
/// is a clean first start; a malformed one aborts startup.
pub async fn restore_registry(
    snapshot: &SnapshotStore,
    store: &dyn ContentStore,
) -> anyhow::Result<HashMap<Uuid, FileRecord>> {
    let loaded = snapshot
        .load()
        .await
        .context("Failed to load registry snapshot")?;
    let total = loaded.len();

    let mut records = HashMap::with_capacity(total);
    for (id, record) in loaded {
        let present = store
            .exists(&record.content_path)
            .await
            .with_context(|| format!("Failed to probe content for {}", id))?;

        if present {
            records.insert(id, record);
        } else {
            tracing::warn!(
                file_id = %id,
                content_path = %record.content_path,
                "Dropping record with missing content"
            );
        }
    }

    tracing::info!(
        restored = records.len(),
        dropped = total - records.len(),
        "Registry restored from snapshot"
    );

    Ok(records)
}
