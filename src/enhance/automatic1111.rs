//! Automatic1111 Stable Diffusion web UI adapter

use super::{probe, GenerationParams, ImageEnhancer};
use crate::config::StudioConfig;
use crate::error::{Result, StudioError};
use crate::services::ImageIOService;
use async_trait::async_trait;
use image::DynamicImage;
use instant::Instant;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const MODELS_PATH: &str = "/sdapi/v1/sd-models";
const IMG2IMG_PATH: &str = "/sdapi/v1/img2img";

/// Request body of `POST /sdapi/v1/img2img`
#[derive(Debug, Serialize)]
struct Img2ImgRequest<'a> {
    init_images: Vec<String>,
    prompt: &'a str,
    negative_prompt: &'a str,
    steps: u32,
    cfg_scale: f32,
    denoising_strength: f32,
    width: u32,
    height: u32,
}

/// Response body of `POST /sdapi/v1/img2img`; other fields are ignored
#[derive(Debug, Deserialize)]
struct Img2ImgResponse {
    #[serde(default)]
    images: Vec<String>,
}

/// Adapter for the Automatic1111 `/sdapi/v1` API
#[derive(Debug, Clone)]
pub struct SdWebUiEnhancer {
    client: Client,
    base_url: String,
    params: GenerationParams,
    probe_timeout: Duration,
    generation_timeout: Duration,
}

impl SdWebUiEnhancer {
    /// Create an adapter for `base_url`
    ///
    /// # Errors
    /// - Failed to create HTTP client
    pub fn new<S: Into<String>>(
        base_url: S,
        probe_timeout: Duration,
        generation_timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| StudioError::internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            params: GenerationParams::default(),
            probe_timeout,
            generation_timeout,
        })
    }

    /// Create an adapter from the service configuration
    ///
    /// # Errors
    /// - Failed to create HTTP client
    pub fn from_config(config: &StudioConfig) -> Result<Self> {
        Self::new(
            config.sd_api_url.clone(),
            config.probe_timeout,
            config.generation_timeout,
        )
    }

    /// Override the sampling parameters
    #[must_use]
    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn params(&self) -> GenerationParams {
        self.params
    }
}

#[async_trait]
impl ImageEnhancer for SdWebUiEnhancer {
    async fn is_available(&self) -> bool {
        let request = self
            .client
            .get(format!("{}{}", self.base_url, MODELS_PATH))
            .timeout(self.probe_timeout);
        probe(request, self.backend_name()).await
    }

    #[tracing::instrument(
        skip(self, image, negative_prompt),
        fields(width = image.width(), height = image.height())
    )]
    async fn enhance(
        &self,
        image: &DynamicImage,
        prompt: &str,
        negative_prompt: &str,
    ) -> Result<DynamicImage> {
        let start = Instant::now();
        let body = Img2ImgRequest {
            init_images: vec![ImageIOService::encode_png_base64(image)?],
            prompt,
            negative_prompt,
            steps: self.params.steps,
            cfg_scale: self.params.cfg_scale,
            denoising_strength: self.params.denoising_strength,
            width: image.width(),
            height: image.height(),
        };

        let response = self
            .client
            .post(format!("{}{}", self.base_url, IMG2IMG_PATH))
            .timeout(self.generation_timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    StudioError::ExternalServiceTransport(format!(
                        "img2img request to {} failed: {}",
                        self.base_url, e
                    ))
                } else {
                    StudioError::invalid_response("img2img request", &e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "img2img call rejected");
            return Err(StudioError::ExternalService {
                status: status.as_u16(),
            });
        }

        let payload: Img2ImgResponse = response
            .json()
            .await
            .map_err(|e| StudioError::invalid_response("img2img response body", &e.to_string()))?;

        let first = payload
            .images
            .first()
            .ok_or_else(|| StudioError::invalid_response("img2img response", "no images returned"))?;

        let result = ImageIOService::decode_base64(first).map_err(|e| {
            StudioError::invalid_response("img2img response image", &e.to_string())
        })?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis() as u64,
            "Enhancement complete"
        );
        Ok(result)
    }

    fn backend_name(&self) -> &'static str {
        "automatic1111"
    }
}
