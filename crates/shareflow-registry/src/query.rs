//! Filtering, sorting and pagination over registry snapshots

use std::str::FromStr;

use chrono::{DateTime, Utc};

use shareflow_core::models::{StatsResponse, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use shareflow_core::FileRecord;

/// Sort key for listings. Every key sorts descending: newest, largest or
/// most-downloaded first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    UploadTime,
    Size,
    Downloads,
}

impl FromStr for SortKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upload_time" => Ok(SortKey::UploadTime),
            "size" => Ok(SortKey::Size),
            "downloads" => Ok(SortKey::Downloads),
            _ => Err(anyhow::anyhow!("Invalid sort key: {}", s)),
        }
    }
}

/// Search criteria. All present criteria must match (AND).
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    /// Case-insensitive substring matched against name and description
    pub query: Option<String>,
    /// Case-insensitive exact match against the record's tags
    pub tag: Option<String>,
}

impl SearchFilter {
    pub fn matches(&self, record: &FileRecord) -> bool {
        if let Some(query) = &self.query {
            let needle = query.to_lowercase();
            let in_name = record.original_name.to_lowercase().contains(&needle);
            let in_description = record.description.to_lowercase().contains(&needle);
            if !in_name && !in_description {
                return false;
            }
        }

        if let Some(tag) = &self.tag {
            let wanted = tag.to_lowercase();
            if !record.tags.iter().any(|t| t.to_lowercase() == wanted) {
                return false;
            }
        }

        true
    }
}

/// A validated pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
}

impl Page {
    /// Build a window from raw query parameters, applying the default page
    /// size and the server-side cap.
    pub fn clamped(offset: Option<usize>, limit: Option<usize>) -> Self {
        Self {
            offset: offset.unwrap_or(0),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::clamped(None, None)
    }
}

/// Filter and sort a snapshot of records.
///
/// Ties break on id so the order is stable across identical snapshots.
pub fn search(mut records: Vec<FileRecord>, filter: &SearchFilter, sort: SortKey) -> Vec<FileRecord> {
    records.retain(|record| filter.matches(record));

    match sort {
        SortKey::UploadTime => {
            records.sort_by(|a, b| b.upload_time.cmp(&a.upload_time).then(a.id.cmp(&b.id)))
        }
        SortKey::Size => records.sort_by(|a, b| b.size.cmp(&a.size).then(a.id.cmp(&b.id))),
        SortKey::Downloads => {
            records.sort_by(|a, b| b.downloads.cmp(&a.downloads).then(a.id.cmp(&b.id)))
        }
    }

    records
}

/// Apply a pagination window. Returns the page plus the total count before
/// the window was applied.
pub fn paginate(records: Vec<FileRecord>, page: Page) -> (Vec<FileRecord>, usize) {
    let total = records.len();
    let window = records
        .into_iter()
        .skip(page.offset)
        .take(page.limit)
        .collect();
    (window, total)
}

/// Aggregate counters over a snapshot. Active means the TTL has not yet
/// lapsed; records at their download limit still count until they expire
/// or are swept.
pub fn stats(records: &[FileRecord], now: DateTime<Utc>) -> StatsResponse {
    let mut aggregate = StatsResponse {
        total_files: records.len(),
        ..StatsResponse::default()
    };

    for record in records {
        if !record.is_expired(now) {
            aggregate.active_files += 1;
        }
        aggregate.total_size += record.size;
        aggregate.total_downloads += u64::from(record.downloads);
    }

    aggregate
}
