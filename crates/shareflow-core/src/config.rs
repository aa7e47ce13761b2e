//! Configuration module
//!
//! This module provides the service configuration, loaded from environment
//! variables with defaults in code. Binaries call `dotenvy` through
//! `Config::from_env()` so a local `.env` file works out of the box.

use std::env;
use std::path::Path;

// Defaults
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_STORAGE_DIR: &str = "./files";
const DEFAULT_SNAPSHOT_PATH: &str = "./shareflow-snapshot.json";
const DEFAULT_TTL_SECS: u64 = 3600;
const DEFAULT_MAX_UPLOAD_SIZE_MB: usize = 100;
const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 300;
const DEFAULT_SNAPSHOT_INTERVAL_SECS: u64 = 30;
const DEFAULT_MAX_DOWNLOADS: u32 = 0;

/// Service configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub storage_dir: String,
    pub snapshot_path: String,
    pub default_ttl_secs: u64,
    pub max_upload_size_bytes: usize,
    pub cleanup_interval_secs: u64,
    pub snapshot_interval_secs: u64,
    pub default_max_downloads: u32,
    /// Allowed content-type prefixes (lowercased). Empty means all types
    /// are accepted.
    pub allowed_content_types: Vec<String>,
    pub cors_origins: Vec<String>,
    pub environment: String,
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let allowed_content_types: Vec<String> = env::var("ALLOWED_CONTENT_TYPES")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let max_upload_size_mb = env::var("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(DEFAULT_MAX_UPLOAD_SIZE_MB);

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            storage_dir: env::var("STORAGE_DIR")
                .unwrap_or_else(|_| DEFAULT_STORAGE_DIR.to_string()),
            snapshot_path: env::var("SNAPSHOT_PATH")
                .unwrap_or_else(|_| DEFAULT_SNAPSHOT_PATH.to_string()),
            default_ttl_secs: env::var("DEFAULT_TTL_SECS")
                .unwrap_or_else(|_| DEFAULT_TTL_SECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_TTL_SECS),
            max_upload_size_bytes: max_upload_size_mb * 1024 * 1024,
            cleanup_interval_secs: env::var("CLEANUP_INTERVAL_SECS")
                .unwrap_or_else(|_| DEFAULT_CLEANUP_INTERVAL_SECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_CLEANUP_INTERVAL_SECS),
            snapshot_interval_secs: env::var("SNAPSHOT_INTERVAL_SECS")
                .unwrap_or_else(|_| DEFAULT_SNAPSHOT_INTERVAL_SECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_SNAPSHOT_INTERVAL_SECS),
            default_max_downloads: env::var("DEFAULT_MAX_DOWNLOADS")
                .unwrap_or_else(|_| DEFAULT_MAX_DOWNLOADS.to_string())
                .parse()
                .unwrap_or(DEFAULT_MAX_DOWNLOADS),
            allowed_content_types,
            cors_origins,
            environment,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.storage_dir.trim().is_empty() {
            return Err(anyhow::anyhow!("STORAGE_DIR must not be empty"));
        }

        if self.snapshot_path.trim().is_empty() {
            return Err(anyhow::anyhow!("SNAPSHOT_PATH must not be empty"));
        }

        // Store keys resolve to paths under the storage dir, so a snapshot
        // kept there would share a namespace with deletable content.
        if Path::new(&self.snapshot_path).starts_with(Path::new(&self.storage_dir)) {
            return Err(anyhow::anyhow!(
                "SNAPSHOT_PATH must not be located inside STORAGE_DIR"
            ));
        }

        if self.default_ttl_secs == 0 {
            return Err(anyhow::anyhow!("DEFAULT_TTL_SECS must be greater than 0"));
        }

        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
        }

        if self.cleanup_interval_secs == 0 {
            return Err(anyhow::anyhow!(
                "CLEANUP_INTERVAL_SECS must be greater than 0"
            ));
        }

        if self.snapshot_interval_secs == 0 {
            return Err(anyhow::anyhow!(
                "SNAPSHOT_INTERVAL_SECS must be greater than 0"
            ));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_port: DEFAULT_PORT,
            storage_dir: DEFAULT_STORAGE_DIR.to_string(),
            snapshot_path: DEFAULT_SNAPSHOT_PATH.to_string(),
            default_ttl_secs: DEFAULT_TTL_SECS,
            max_upload_size_bytes: DEFAULT_MAX_UPLOAD_SIZE_MB * 1024 * 1024,
            cleanup_interval_secs: DEFAULT_CLEANUP_INTERVAL_SECS,
            snapshot_interval_secs: DEFAULT_SNAPSHOT_INTERVAL_SECS,
            default_max_downloads: DEFAULT_MAX_DOWNLOADS,
            allowed_content_types: Vec::new(),
            cors_origins: vec!["*".to_string()],
            environment: "development".to_string(),
        }
    }
}
