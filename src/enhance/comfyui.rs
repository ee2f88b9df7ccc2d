//! ComfyUI adapter
//!
//! Only the availability probe is wired up. ComfyUI needs a full workflow
//! graph per request, so enhancement reports `NotImplemented` instead of
//! silently returning nothing.

use super::{probe, ImageEnhancer};
use crate::config::StudioConfig;
use crate::error::{Result, StudioError};
use async_trait::async_trait;
use image::DynamicImage;
use reqwest::Client;
use std::time::Duration;

const SYSTEM_STATS_PATH: &str = "/system_stats";

#[derive(Debug, Clone)]
pub struct ComfyUiEnhancer {
    client: Client,
    base_url: String,
    probe_timeout: Duration,
}

impl ComfyUiEnhancer {
    /// # Errors
    /// - Failed to create HTTP client
    pub fn new<S: Into<String>>(base_url: S, probe_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| StudioError::internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            probe_timeout,
        })
    }

    /// # Errors
    /// - Failed to create HTTP client
    pub fn from_config(config: &StudioConfig) -> Result<Self> {
        Self::new(config.comfyui_api_url.clone(), config.probe_timeout)
    }
}

#[async_trait]
impl ImageEnhancer for ComfyUiEnhancer {
    async fn is_available(&self) -> bool {
        let request = self
            .client
            .get(format!("{}{}", self.base_url, SYSTEM_STATS_PATH))
            .timeout(self.probe_timeout);
        probe(request, self.backend_name()).await
    }

    async fn enhance(
        &self,
        _image: &DynamicImage,
        _prompt: &str,
        _negative_prompt: &str,
    ) -> Result<DynamicImage> {
        Err(StudioError::not_implemented(
            "ComfyUI enhancement backend (select automatic1111 instead)",
        ))
    }

    fn backend_name(&self) -> &'static str {
        "comfyui"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_enhance_fails_clearly() {
        let enhancer =
            ComfyUiEnhancer::new("http://127.0.0.1:8188", Duration::from_secs(1)).unwrap();
        let image = DynamicImage::new_rgb8(4, 4);
        let err = enhancer.enhance(&image, "p", "n").await.unwrap_err();
        assert!(matches!(err, StudioError::NotImplemented(_)));
        assert!(err.to_string().contains("ComfyUI"));
    }

    #[tokio::test]
    async fn test_probe_unreachable() {
        let enhancer =
            ComfyUiEnhancer::new("http://127.0.0.1:1", Duration::from_millis(500)).unwrap();
        assert!(!enhancer.is_available().await);
    }
}
