//! Application setup and initialization
//!
//! All initialization logic lives here instead of main.rs so the
//! integration tests can bring up a complete application against a
//! temporary directory.

pub mod routes;
pub mod server;

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;

use shareflow_core::Config;
use shareflow_registry::{FileRegistry, SnapshotStore};
use shareflow_services::{restore_registry, EvictionSweeper, PersistenceService};
use shareflow_storage::{ContentStore, LocalStore};

use crate::state::AppState;

pub use server::start_server;

/// Initialize the entire application: content store, registry restore,
/// background services, and the router.
///
/// Telemetry is deliberately not touched here; the binary installs it once,
/// while tests call this function as often as they like.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    let store: Arc<dyn ContentStore> = Arc::new(
        LocalStore::new(&config.storage_dir)
            .await
            .context("Failed to initialize content store")?,
    );
    let snapshot = SnapshotStore::new(&config.snapshot_path);

    // Reconcile the snapshot against the bytes actually on disk before
    // anything is served.
    let records = restore_registry(&snapshot, store.as_ref()).await?;
    let registry = FileRegistry::new();
    registry.restore(records).await;

    let persistence = PersistenceService::new(registry.clone(), snapshot);
    // Proves the snapshot path is writable and persists any records the
    // restore dropped.
    persistence
        .save_now()
        .await
        .context("Failed to write initial snapshot")?;

    let state = Arc::new(AppState {
        registry: registry.clone(),
        store: store.clone(),
        persistence: persistence.clone(),
        config: config.clone(),
        started_at: Utc::now(),
    });

    let sweeper = Arc::new(EvictionSweeper::new(registry, store, persistence.clone()));
    sweeper.start(config.cleanup_interval_secs);

    Arc::new(persistence).start(config.snapshot_interval_secs);

    tracing::info!(
        file_count = state.registry.len().await,
        storage_dir = %config.storage_dir,
        "Application initialized"
    );

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
