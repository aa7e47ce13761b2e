use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why a record became eligible for eviction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionReason {
    Expired,
    DownloadLimitReached,
}

impl EvictionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvictionReason::Expired => "expired",
            EvictionReason::DownloadLimitReached => "download limit reached",
        }
    }
}

/// Metadata for one shared file.
///
/// The serde snake_case field names are the stable snapshot schema; renaming
/// a field breaks loading of existing snapshot files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: Uuid,
    /// On-disk name, `{id}_{sanitized original name}`.
    pub stored_name: String,
    pub original_name: String,
    pub size: u64,
    pub content_type: String,
    /// Hex-encoded SHA-256 of the content, computed once at upload.
    pub checksum: String,
    pub upload_time: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub downloads: u32,
    /// 0 means unlimited.
    pub max_downloads: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub uploader_origin: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub description: String,
    /// Content store key. Exactly one stored object per record.
    pub content_path: String,
}

impl FileRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn limit_reached(&self) -> bool {
        self.max_downloads > 0 && self.downloads >= self.max_downloads
    }

    /// Single eviction predicate shared by the sweeper and the lazy
    /// per-request checks. Expiry wins when both conditions hold.
    pub fn eviction_reason(&self, now: DateTime<Utc>) -> Option<EvictionReason> {
        if self.is_expired(now) {
            Some(EvictionReason::Expired)
        } else if self.limit_reached() {
            Some(EvictionReason::DownloadLimitReached)
        } else {
            None
        }
    }

    pub fn is_protected(&self) -> bool {
        self.password.is_some()
    }

    /// Remaining download grants, `None` when unlimited.
    pub fn remaining_downloads(&self) -> Option<u32> {
        if self.max_downloads == 0 {
            None
        } else {
            Some(self.max_downloads.saturating_sub(self.downloads))
        }
    }
}
