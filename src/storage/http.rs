//! HTTP object storage: keys map to URLs under a base endpoint.
//!
//! Speaks plain `HEAD`/`GET`/`PUT`, which covers S3-compatible gateways and
//! simple blob services without pulling in a vendor SDK.

use crate::error::FileError;
use crate::storage::Storage;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// A remote disk reached over HTTP.
pub struct HttpStorage {
    name: String,
    base_url: String,
    client: reqwest::Client,
}

impl HttpStorage {
    /// Create a client for `base_url` (e.g. `https://blobs.internal/reports`).
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Result<Self, FileError> {
        let base_url = base_url.into();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| FileError::StorageFailed {
                key: base_url.clone(),
                detail: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            name: name.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// The full URL for a key.
    fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key.trim_start_matches('/'))
    }

    fn storage_err(&self, key: &str, detail: impl Into<String>) -> FileError {
        FileError::StorageFailed {
            key: key.to_string(),
            detail: detail.into(),
        }
    }
}

#[async_trait]
impl Storage for HttpStorage {
    fn disk_name(&self) -> &str {
        &self.name
    }

    fn is_remote(&self) -> bool {
        true
    }

    async fn exists(&self, key: &str) -> Result<bool, FileError> {
        let url = self.url_for(key);
        let response = self
            .client
            .head(&url)
            .send()
            .await
            .map_err(|e| self.storage_err(key, format!("HEAD {url} failed: {e}")))?;
        debug!(key = %key, status = %response.status(), "HEAD");
        Ok(response.status().is_success())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, FileError> {
        let url = self.url_for(key);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.storage_err(key, format!("GET {url} failed: {e}")))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(FileError::RemoteMissing {
                key: key.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(self.storage_err(key, format!("GET {url} returned {}", response.status())));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.storage_err(key, format!("GET {url} body read failed: {e}")))?;
        Ok(bytes.to_vec())
    }

    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), FileError> {
        let url = self.url_for(key);
        let response = self
            .client
            .put(&url)
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| self.storage_err(key, format!("PUT {url} failed: {e}")))?;

        if !response.status().is_success() {
            return Err(self.storage_err(key, format!("PUT {url} returned {}", response.status())));
        }
        debug!(key = %key, bytes = bytes.len(), "uploaded");
        Ok(())
    }
}
