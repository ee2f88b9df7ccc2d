//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::{Cli, CliBackend};
use crate::config::{EnhancementBackend, StudioConfig};
use anyhow::Result;
use std::time::Duration;

/// Convert CLI arguments to a `StudioConfig`
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    pub(crate) fn from_cli(cli: &Cli) -> Result<StudioConfig> {
        let backend = match cli.backend {
            CliBackend::Automatic1111 => EnhancementBackend::Automatic1111,
            CliBackend::ComfyUi => EnhancementBackend::ComfyUi,
        };

        let mut builder = StudioConfig::builder()
            .host(cli.host.clone())
            .port(cli.port)
            .enhancement_backend(backend)
            .sd_api_url(cli.sd_url.clone())
            .comfyui_api_url(cli.comfyui_url.clone())
            .probe_timeout(Duration::from_secs(cli.probe_timeout))
            .generation_timeout(Duration::from_secs(cli.generation_timeout))
            .fetch_timeout(Duration::from_secs(cli.fetch_timeout))
            .model_input_size(cli.model_input_size);

        if let Some(path) = &cli.model_path {
            builder = builder.model_path(path.clone());
        }

        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults_match_service_defaults() {
        let cli = Cli::try_parse_from(["bgstudio"]).unwrap();
        let config = CliConfigBuilder::from_cli(&cli).unwrap();
        let defaults = StudioConfig::default();
        assert_eq!(config.port, defaults.port);
        assert_eq!(config.sd_api_url, defaults.sd_api_url);
        assert_eq!(config.generation_timeout, defaults.generation_timeout);
        assert_eq!(config.enhancement_backend, EnhancementBackend::Automatic1111);
    }

    #[test]
    fn test_flags_map_onto_config() {
        let cli = Cli::try_parse_from([
            "bgstudio",
            "--port",
            "8080",
            "--backend",
            "comfy",
            "--comfyui-url",
            "http://gpu-box:8188/",
            "--model-path",
            "/models/isnet.onnx",
            "--probe-timeout",
            "5",
        ])
        .unwrap();
        let config = CliConfigBuilder::from_cli(&cli).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.enhancement_backend, EnhancementBackend::ComfyUi);
        assert_eq!(config.active_backend_url(), "http://gpu-box:8188");
        assert_eq!(config.probe_timeout, Duration::from_secs(5));
        assert_eq!(
            config.model_path.as_deref(),
            Some(std::path::Path::new("/models/isnet.onnx"))
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        let cli = Cli::try_parse_from(["bgstudio", "--sd-url", "ftp://nope"]).unwrap();
        assert!(CliConfigBuilder::from_cli(&cli).is_err());

        let cli = Cli::try_parse_from(["bgstudio", "--generation-timeout", "0"]).unwrap();
        assert!(CliConfigBuilder::from_cli(&cli).is_err());
    }
}
