//! Test helpers: build a complete application against a temp directory.
//!
//! Run from workspace root: `cargo test -p shareflow-api`.

use std::sync::Arc;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use tempfile::TempDir;

use shareflow_api::constants;
use shareflow_api::setup::initialize_app;
use shareflow_api::state::AppState;
use shareflow_core::Config;

/// API path prefix for tests (e.g. `/api/v0`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server, state, and the temp dir owning its files.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub config: Config,
    pub temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Tear down the app but keep its directory, for restart tests.
    pub fn into_temp_dir(self) -> TempDir {
        self.temp_dir
    }
}

/// Config pointing storage and snapshot into `dir`, with background
/// intervals long enough to never fire during a test.
pub fn test_config(dir: &TempDir) -> Config {
    Config {
        server_port: 0,
        storage_dir: dir.path().join("files").to_string_lossy().into_owned(),
        snapshot_path: dir
            .path()
            .join("snapshot.json")
            .to_string_lossy()
            .into_owned(),
        default_ttl_secs: 3600,
        max_upload_size_bytes: 1024 * 1024,
        cleanup_interval_secs: 3600,
        snapshot_interval_secs: 3600,
        default_max_downloads: 0,
        allowed_content_types: vec![],
        cors_origins: vec!["*".to_string()],
        environment: "test".to_string(),
    }
}

/// Setup test app backed by a fresh temp directory.
pub async fn setup_test_app() -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let config = test_config(&temp_dir);
    setup_test_app_with_config(temp_dir, config).await
}

/// Setup test app with a caller-provided config, e.g. to restart against
/// the same directory or tighten upload rules.
pub async fn setup_test_app_with_config(temp_dir: TempDir, config: Config) -> TestApp {
    let (state, router) = initialize_app(config.clone())
        .await
        .expect("Failed to initialize app");
    let server = TestServer::new(router).expect("Failed to start test server");
    TestApp {
        server,
        state,
        config,
        temp_dir,
    }
}

/// Multipart form with a single file part named "file".
pub fn file_form(name: &str, content_type: &str, data: Vec<u8>) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(data)
            .file_name(name.to_string())
            .mime_type(content_type.to_string()),
    )
}

/// Upload a file and return its id and the full upload response.
pub async fn upload_file(
    server: &TestServer,
    name: &str,
    data: &[u8],
) -> (uuid::Uuid, serde_json::Value) {
    let response = server
        .post(&api_path("/files"))
        .multipart(file_form(name, "text/plain", data.to_vec()))
        .await;
    assert_eq!(response.status_code(), 201, "upload failed: {}", response.text());
    let body: serde_json::Value = response.json();
    let id = body["id"]
        .as_str()
        .and_then(|s| s.parse().ok())
        .expect("upload response carries an id");
    (id, body)
}
