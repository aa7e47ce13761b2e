//! HTTP client for the Shareflow API.
//!
//! Thin wrapper over `reqwest` with generic GET/POST/DELETE helpers and one
//! domain method per server endpoint. Response types come from
//! `shareflow_core::models`, so the CLI parses exactly what the server emits.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use shareflow_core::models::{
    BulkDeleteRequest, BulkDeleteResponse, FileRecordResponse, ListResponse, StatsResponse,
    UploadResponse,
};

/// API version prefix (e.g. "/api/v0"). Set SHAREFLOW_API_VERSION to match
/// the server.
pub fn api_prefix() -> String {
    let version = std::env::var("SHAREFLOW_API_VERSION").unwrap_or_else(|_| "v0".to_string());
    format!("/api/{}", version)
}

/// Optional fields accepted by the upload endpoint.
#[derive(Debug, Default, Clone)]
pub struct UploadOptions {
    pub ttl_secs: Option<u64>,
    pub max_downloads: Option<u32>,
    pub password: Option<String>,
    pub description: Option<String>,
    /// Comma-separated tag list, passed through verbatim; the server splits
    /// and normalizes it.
    pub tags: Option<String>,
}

/// HTTP client for the Shareflow API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET request with optional query parameters. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.build_url(path);
        let mut request = self.client.get(&url);

        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await.context("Failed to send request")?;
        if !response.status().is_success() {
            return Err(request_failed(response).await);
        }

        response
            .json()
            .await
            .context("Failed to parse response as JSON")
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.build_url(path);
        let request = self.client.post(&url).json(body);

        let response = request.send().await.context("Failed to send request")?;
        if !response.status().is_success() {
            return Err(request_failed(response).await);
        }

        response
            .json()
            .await
            .context("Failed to parse response as JSON")
    }

    /// POST multipart form and deserialize response.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T> {
        let url = self.build_url(path);
        let request = self.client.post(&url).multipart(form);

        let response = request.send().await.context("Failed to send request")?;
        if !response.status().is_success() {
            return Err(request_failed(response).await);
        }

        response
            .json()
            .await
            .context("Failed to parse response as JSON")
    }

    /// DELETE request. Returns Ok(()) on success.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let url = self.build_url(path);
        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            return Err(request_failed(response).await);
        }

        Ok(())
    }
}

/// Build an error carrying the server's error body, which is usually a JSON
/// payload with a human-readable message.
async fn request_failed(response: reqwest::Response) -> anyhow::Error {
    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    anyhow::anyhow!("API request failed with status {}: {}", status, error_text)
}

impl ApiClient {
    /// Upload a file from a local path.
    pub async fn upload(&self, file_path: &Path, options: UploadOptions) -> Result<UploadResponse> {
        let buffer = tokio::fs::read(file_path)
            .await
            .with_context(|| format!("Failed to read file: {}", file_path.display()))?;

        let filename = file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.bin")
            .to_string();

        let mut form = reqwest::multipart::Form::new().part(
            "file",
            reqwest::multipart::Part::bytes(buffer).file_name(filename),
        );
        if let Some(ttl) = options.ttl_secs {
            form = form.text("ttl", ttl.to_string());
        }
        if let Some(max) = options.max_downloads {
            form = form.text("max_downloads", max.to_string());
        }
        if let Some(password) = options.password {
            form = form.text("password", password);
        }
        if let Some(description) = options.description {
            form = form.text("description", description);
        }
        if let Some(tags) = options.tags {
            form = form.text("tags", tags);
        }

        self.post_multipart(&format!("{}/files", api_prefix()), form)
            .await
    }

    /// Start a content download. The caller streams the body from the
    /// returned response.
    pub async fn download(&self, id: Uuid, password: Option<&str>) -> Result<reqwest::Response> {
        let url = self.build_url(&format!("{}/files/{}/content", api_prefix(), id));
        let mut request = self.client.get(&url);
        if let Some(password) = password {
            request = request.query(&[("password", password)]);
        }

        // Large transfers get their own deadline instead of the client-wide
        // 60 seconds.
        let response = request
            .timeout(Duration::from_secs(3600))
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            return Err(request_failed(response).await);
        }

        Ok(response)
    }

    /// Get file metadata by ID.
    pub async fn info(&self, id: Uuid) -> Result<FileRecordResponse> {
        self.get(&format!("{}/files/{}", api_prefix(), id), &[])
            .await
    }

    /// List files with pagination.
    pub async fn list(&self, limit: Option<usize>, offset: Option<usize>) -> Result<ListResponse> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(l) = limit {
            query.push(("limit", l.to_string()));
        }
        if let Some(o) = offset {
            query.push(("offset", o.to_string()));
        }
        self.get(&format!("{}/files", api_prefix()), &query).await
    }

    /// Search files by text, tag, and sort order.
    pub async fn search(
        &self,
        query: Option<&str>,
        tag: Option<&str>,
        sort: Option<&str>,
    ) -> Result<Vec<FileRecordResponse>> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(q) = query {
            params.push(("q", q.to_string()));
        }
        if let Some(t) = tag {
            params.push(("tag", t.to_string()));
        }
        if let Some(s) = sort {
            params.push(("sort", s.to_string()));
        }
        self.get(&format!("{}/files/search", api_prefix()), &params)
            .await
    }

    /// Get aggregate stats.
    pub async fn stats(&self) -> Result<StatsResponse> {
        self.get(&format!("{}/files/stats", api_prefix()), &[])
            .await
    }

    /// Delete a file by ID.
    pub async fn delete_file(&self, id: Uuid) -> Result<()> {
        self.delete(&format!("{}/files/{}", api_prefix(), id)).await
    }

    /// Delete several files in one request.
    pub async fn bulk_delete(&self, ids: Vec<Uuid>) -> Result<BulkDeleteResponse> {
        self.post_json(
            &format!("{}/files/bulk-delete", api_prefix()),
            &BulkDeleteRequest { ids },
        )
        .await
    }
}

/// File name advertised by a download response, if any.
pub fn suggested_filename(response: &reqwest::Response) -> Option<String> {
    let header = response
        .headers()
        .get(reqwest::header::CONTENT_DISPOSITION)?;
    filename_from_disposition(header.to_str().ok()?)
}

/// Extract the quoted filename from a Content-Disposition header value.
/// Directory components are stripped; a server never chooses where the
/// client writes.
pub fn filename_from_disposition(value: &str) -> Option<String> {
    let (_, rest) = value.split_once("filename=\"")?;
    let (name, _) = rest.split_once('"')?;
    let name = Path::new(name).file_name()?.to_str()?;
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_trims_trailing_slash() {
        let client = ApiClient::new("http://localhost:8080/".to_string()).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(
            client.build_url("/api/v0/files"),
            "http://localhost:8080/api/v0/files"
        );
    }

    #[test]
    fn test_filename_from_disposition() {
        assert_eq!(
            filename_from_disposition("attachment; filename=\"report.pdf\""),
            Some("report.pdf".to_string())
        );
        assert_eq!(filename_from_disposition("attachment"), None);
        assert_eq!(filename_from_disposition("attachment; filename=\"\""), None);
    }

    #[test]
    fn test_filename_from_disposition_strips_directories() {
        assert_eq!(
            filename_from_disposition("attachment; filename=\"../../etc/passwd\""),
            Some("passwd".to_string())
        );
        assert_eq!(
            filename_from_disposition("attachment; filename=\"dir/inner.txt\""),
            Some("inner.txt".to_string())
        );
    }
}
