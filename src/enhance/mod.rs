//! External image-generation adapters
//!
//! The generation service is treated as a black box behind [`ImageEnhancer`]:
//! - Automatic1111 web UI (`/sdapi/v1/img2img`), the implemented backend
//! - ComfyUI, probe-only; enhancement fails with `NotImplemented`

pub mod automatic1111;
pub mod comfyui;

pub use automatic1111::SdWebUiEnhancer;
pub use comfyui::ComfyUiEnhancer;

use crate::config::{EnhancementBackend, StudioConfig};
use crate::error::Result;
use async_trait::async_trait;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Generative image-to-image collaborator
#[async_trait]
pub trait ImageEnhancer: Send + Sync {
    /// Short-timeout status probe. Never fails: any error reads as `false`.
    async fn is_available(&self) -> bool;

    /// Regenerate `image` guided by the prompt pair
    ///
    /// # Errors
    /// - `ExternalServiceTransport` when the call times out or the connection fails
    /// - `ExternalService` for a non-success HTTP status
    /// - `ExternalServiceResponse` for an unusable success payload
    /// - `NotImplemented` for backends without an enhancement path
    async fn enhance(
        &self,
        image: &DynamicImage,
        prompt: &str,
        negative_prompt: &str,
    ) -> Result<DynamicImage>;

    /// Backend identifier for logs and diagnostics
    fn backend_name(&self) -> &'static str;
}

/// Fixed sampling parameters for img2img
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub steps: u32,
    pub cfg_scale: f32,
    /// Kept low so the product survives and mostly the surroundings change
    pub denoising_strength: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            steps: 20,
            cfg_scale: 7.0,
            denoising_strength: 0.4,
        }
    }
}

/// Build the enhancer selected by `config.enhancement_backend`
///
/// # Errors
/// - Failed to create the HTTP client
pub fn create_enhancer(config: &StudioConfig) -> Result<Arc<dyn ImageEnhancer>> {
    let enhancer: Arc<dyn ImageEnhancer> = match config.enhancement_backend {
        EnhancementBackend::Automatic1111 => Arc::new(SdWebUiEnhancer::from_config(config)?),
        EnhancementBackend::ComfyUi => Arc::new(ComfyUiEnhancer::from_config(config)?),
    };
    tracing::info!(
        backend = enhancer.backend_name(),
        url = %config.active_backend_url(),
        "Configured enhancement backend"
    );
    Ok(enhancer)
}

/// Run an availability probe request, mapping every failure to `false`
pub(crate) async fn probe(request: reqwest::RequestBuilder, backend: &str) -> bool {
    match request.send().await {
        Ok(response) if response.status().is_success() => true,
        Ok(response) => {
            tracing::debug!(backend, status = %response.status(), "Availability probe rejected");
            false
        },
        Err(e) => {
            tracing::debug!(backend, error = %e, "Availability probe failed");
            false
        },
    }
}
