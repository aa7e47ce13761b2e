//! Common utilities for the upload handler

use axum::extract::multipart::Field;
use axum::extract::Multipart;
use bytes::Bytes;

use shareflow_core::validation::parse_tags;
use shareflow_core::AppError;

/// Upper bound on a client-supplied ttl (100 years). Keeps the expiry
/// timestamp far inside chrono's representable range, where adding the
/// delta would otherwise overflow.
pub const MAX_TTL_SECS: u64 = 100 * 365 * 24 * 60 * 60;

/// Parsed multipart upload form.
///
/// The `file` part is required; the sharing options are optional and fall
/// back to server defaults when absent or empty.
#[derive(Debug)]
pub struct UploadForm {
    pub data: Bytes,
    pub filename: String,
    pub content_type: String,
    pub ttl_secs: Option<u64>,
    pub max_downloads: Option<u32>,
    pub password: Option<String>,
    pub description: String,
    pub tags: Vec<String>,
}

/// Extract the file part and sharing options from a multipart form.
/// Only one field named "file" is accepted; multiple file fields are rejected.
pub async fn parse_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut data: Option<Bytes> = None;
    let mut filename: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut ttl_secs: Option<u64> = None;
    let mut max_downloads: Option<u32> = None;
    let mut password: Option<String> = None;
    let mut description = String::new();
    let mut tags: Vec<String> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            "file" => {
                if data.is_some() {
                    return Err(AppError::InvalidInput(
                        "Multiple file fields are not allowed; send exactly one field named 'file'"
                            .to_string(),
                    ));
                }
                filename = field.file_name().map(|s: &str| s.to_string());
                content_type = field.content_type().map(|s: &str| s.to_string());
                data = Some(field.bytes().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read file data: {}", e))
                })?);
            }
            "ttl" => {
                let text = read_text_field(field, "ttl").await?;
                if !text.is_empty() {
                    let secs: u64 = text.parse().map_err(|_| {
                        AppError::InvalidInput(format!("Invalid ttl value: {}", text))
                    })?;
                    if secs == 0 {
                        return Err(AppError::InvalidInput(
                            "ttl must be greater than zero".to_string(),
                        ));
                    }
                    if secs > MAX_TTL_SECS {
                        return Err(AppError::InvalidInput(format!(
                            "ttl must not exceed {} seconds",
                            MAX_TTL_SECS
                        )));
                    }
                    ttl_secs = Some(secs);
                }
            }
            "max_downloads" => {
                let text = read_text_field(field, "max_downloads").await?;
                if !text.is_empty() {
                    max_downloads = Some(text.parse().map_err(|_| {
                        AppError::InvalidInput(format!("Invalid max_downloads value: {}", text))
                    })?);
                }
            }
            "password" => {
                // Empty password means unprotected.
                let text = read_text_field(field, "password").await?;
                if !text.is_empty() {
                    password = Some(text);
                }
            }
            "description" => {
                description = read_text_field(field, "description").await?;
            }
            "tags" => {
                let text = read_text_field(field, "tags").await?;
                tags = parse_tags(&text);
            }
            _ => {}
        }
    }

    let data = data.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))?;
    if data.is_empty() {
        return Err(AppError::InvalidInput("File is empty".to_string()));
    }

    Ok(UploadForm {
        data,
        filename: filename.unwrap_or_else(|| "unknown".to_string()),
        content_type: content_type.unwrap_or_else(|| "application/octet-stream".to_string()),
        ttl_secs,
        max_downloads,
        password,
        description,
        tags,
    })
}

async fn read_text_field(field: Field<'_>, name: &str) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read {} field: {}", name, e)))
}

/// Validate file size against the configured maximum.
pub fn validate_file_size(file_size: usize, max_size: usize) -> Result<(), AppError> {
    if file_size > max_size {
        return Err(AppError::PayloadTooLarge(format!(
            "File size exceeds maximum allowed size of {} MB",
            max_size / 1024 / 1024
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_file_size_enforces_maximum() {
        assert!(validate_file_size(10, 10).is_ok());
        let err = validate_file_size(11, 10).unwrap_err();
        match err {
            AppError::PayloadTooLarge(_) => {}
            other => panic!("Expected PayloadTooLarge, got {:?}", other),
        }
    }
}
