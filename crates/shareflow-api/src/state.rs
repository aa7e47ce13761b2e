//! Application state shared by all handlers.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use shareflow_core::Config;
use shareflow_registry::FileRegistry;
use shareflow_services::PersistenceService;
use shareflow_storage::ContentStore;

/// Main application state: registry, content store and persistence,
/// constructed once in `setup::initialize_app`.
#[derive(Clone)]
pub struct AppState {
    pub registry: FileRegistry,
    pub store: Arc<dyn ContentStore>,
    pub persistence: PersistenceService,
    pub config: Config,
    pub started_at: DateTime<Utc>,
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
