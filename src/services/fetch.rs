//! Source image retrieval

use crate::error::{Result, StudioError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Retrieves the raw bytes of a source image
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Fetch the encoded image at `url`
    ///
    /// # Errors
    /// - `Decode` when the source cannot be retrieved
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// `ImageFetcher` backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    /// Create a fetcher with a per-request timeout
    ///
    /// # Errors
    /// - Failed to create HTTP client
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StudioError::internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Wrap an existing client
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    #[tracing::instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        if url.trim().is_empty() {
            return Err(StudioError::decode("image_url is empty"));
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| StudioError::fetch_error(url, &e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StudioError::fetch_error(url, &format!("HTTP {}", status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| StudioError::fetch_error(url, &e.to_string()))?;

        tracing::debug!(bytes = bytes.len(), "Fetched source image");
        Ok(bytes.to_vec())
    }
}
