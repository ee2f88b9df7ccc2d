//! Configuration types for the studio service

use crate::error::{Result, StudioError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default Automatic1111 web UI endpoint
pub const DEFAULT_SD_API_URL: &str = "http://127.0.0.1:7860";
/// Default ComfyUI endpoint
pub const DEFAULT_COMFYUI_API_URL: &str = "http://127.0.0.1:8188";
/// Default listening port
pub const DEFAULT_PORT: u16 = 5001;

/// External image-generation backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnhancementBackend {
    /// Automatic1111 Stable Diffusion web UI (`/sdapi/v1/*`)
    #[default]
    Automatic1111,
    /// ComfyUI workflow server (probe only, enhancement not implemented)
    ComfyUi,
}

impl std::fmt::Display for EnhancementBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Automatic1111 => write!(f, "automatic1111"),
            Self::ComfyUi => write!(f, "comfyui"),
        }
    }
}

impl std::str::FromStr for EnhancementBackend {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "automatic1111" | "a1111" | "sd" => Ok(Self::Automatic1111),
            "comfyui" | "comfy" => Ok(Self::ComfyUi),
            other => Err(StudioError::invalid_config(format!(
                "Unknown enhancement backend '{}' (expected automatic1111 or comfyui)",
                other
            ))),
        }
    }
}

/// Service configuration, passed explicitly to every collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudioConfig {
    /// Interface to bind the HTTP server to
    pub host: String,

    /// Listening port
    pub port: u16,

    /// Which external generation backend to use
    pub enhancement_backend: EnhancementBackend,

    /// Base URL of the Automatic1111 API
    pub sd_api_url: String,

    /// Base URL of the ComfyUI API
    pub comfyui_api_url: String,

    /// Timeout for the availability probe
    pub probe_timeout: Duration,

    /// Timeout for a single img2img call
    pub generation_timeout: Duration,

    /// Timeout for downloading a source image
    pub fetch_timeout: Duration,

    /// Segmentation model (ONNX). `None` resolves to the cache location.
    pub model_path: Option<PathBuf>,

    /// Square input edge expected by the segmentation model
    pub model_input_size: u32,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            enhancement_backend: EnhancementBackend::Automatic1111,
            sd_api_url: DEFAULT_SD_API_URL.to_string(),
            comfyui_api_url: DEFAULT_COMFYUI_API_URL.to_string(),
            probe_timeout: Duration::from_secs(2),
            generation_timeout: Duration::from_secs(300),
            fetch_timeout: Duration::from_secs(60),
            model_path: None,
            model_input_size: 1024,
        }
    }
}

impl StudioConfig {
    /// Create a new configuration builder
    #[must_use]
    pub fn builder() -> StudioConfigBuilder {
        StudioConfigBuilder::new()
    }

    /// Socket address string for the listener
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Base URL of the currently selected enhancement backend
    #[must_use]
    pub fn active_backend_url(&self) -> &str {
        match self.enhancement_backend {
            EnhancementBackend::Automatic1111 => &self.sd_api_url,
            EnhancementBackend::ComfyUi => &self.comfyui_api_url,
        }
    }

    /// Model path, falling back to `<cache dir>/bgstudio/models/isnet.onnx`
    #[must_use]
    pub fn resolved_model_path(&self) -> Option<PathBuf> {
        self.model_path.clone().or_else(|| {
            dirs::cache_dir().map(|dir| dir.join("bgstudio").join("models").join("isnet.onnx"))
        })
    }

    /// Validate configuration values
    ///
    /// # Errors
    /// - Non-http(s) service URLs
    /// - Zero port, timeouts or model input size
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(StudioError::config_value_error("port", self.port, "1-65535"));
        }
        for (name, url) in [
            ("sd_api_url", &self.sd_api_url),
            ("comfyui_api_url", &self.comfyui_api_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(StudioError::config_value_error(
                    name,
                    url,
                    "an http:// or https:// URL",
                ));
            }
        }
        for (name, timeout) in [
            ("probe_timeout", self.probe_timeout),
            ("generation_timeout", self.generation_timeout),
            ("fetch_timeout", self.fetch_timeout),
        ] {
            if timeout.is_zero() {
                return Err(StudioError::config_value_error(
                    name,
                    format!("{:?}", timeout),
                    "greater than zero",
                ));
            }
        }
        if self.model_input_size == 0 {
            return Err(StudioError::config_value_error(
                "model_input_size",
                self.model_input_size,
                "greater than zero",
            ));
        }
        Ok(())
    }
}

/// Builder for `StudioConfig`
pub struct StudioConfigBuilder {
    config: StudioConfig,
}

impl StudioConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: StudioConfig::default(),
        }
    }

    #[must_use]
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.host = host.into();
        self
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    #[must_use]
    pub fn enhancement_backend(mut self, backend: EnhancementBackend) -> Self {
        self.config.enhancement_backend = backend;
        self
    }

    /// Trailing slashes are stripped so paths can be appended directly
    #[must_use]
    pub fn sd_api_url<S: Into<String>>(mut self, url: S) -> Self {
        self.config.sd_api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn comfyui_api_url<S: Into<String>>(mut self, url: S) -> Self {
        self.config.comfyui_api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.config.probe_timeout = timeout;
        self
    }

    #[must_use]
    pub fn generation_timeout(mut self, timeout: Duration) -> Self {
        self.config.generation_timeout = timeout;
        self
    }

    #[must_use]
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.config.fetch_timeout = timeout;
        self
    }

    #[must_use]
    pub fn model_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.model_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn model_input_size(mut self, size: u32) -> Self {
        self.config.model_input_size = size;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    /// - Any value rejected by [`StudioConfig::validate`]
    pub fn build(self) -> Result<StudioConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for StudioConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
