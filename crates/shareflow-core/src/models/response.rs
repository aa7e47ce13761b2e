use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::record::FileRecord;

/// Client-facing view of a file record. Never carries the password or the
/// content store key.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileRecordResponse {
    pub id: Uuid,
    pub stored_name: String,
    pub original_name: String,
    pub size: u64,
    pub content_type: String,
    pub checksum: String,
    pub upload_time: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub downloads: u32,
    pub max_downloads: u32,
    pub protected: bool,
    pub uploader_origin: String,
    pub tags: Vec<String>,
    pub description: String,
}

impl From<&FileRecord> for FileRecordResponse {
    fn from(record: &FileRecord) -> Self {
        FileRecordResponse {
            id: record.id,
            stored_name: record.stored_name.clone(),
            original_name: record.original_name.clone(),
            size: record.size,
            content_type: record.content_type.clone(),
            checksum: record.checksum.clone(),
            upload_time: record.upload_time,
            expires_at: record.expires_at,
            downloads: record.downloads,
            max_downloads: record.max_downloads,
            protected: record.is_protected(),
            uploader_origin: record.uploader_origin.clone(),
            tags: record.tags.clone(),
            description: record.description.clone(),
        }
    }
}

/// Response for a successful upload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub id: Uuid,
    pub stored_name: String,
    pub original_name: String,
    pub size: u64,
    pub checksum: String,
    pub download_url: String,
    pub expires_at: DateTime<Utc>,
    pub max_downloads: u32,
}

/// Paginated file listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListResponse {
    pub files: Vec<FileRecordResponse>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// Aggregate counters over the current registry contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    pub total_files: usize,
    /// Records that have not yet expired.
    pub active_files: usize,
    pub total_size: u64,
    pub total_downloads: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkDeleteRequest {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkDeleteResponse {
    pub requested: usize,
    pub deleted: usize,
}
