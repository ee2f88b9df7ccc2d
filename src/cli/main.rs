//! bgstudio server entry point
//!
//! Parses arguments (with `BGSTUDIO_*` environment fallbacks), installs the
//! tracing subscriber and serves the HTTP API.

use super::config::CliConfigBuilder;
use crate::{
    server::{self, AppState},
    tracing_config::{TracingConfig, TracingFormat},
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Product photo studio service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "bgstudio")]
pub struct Cli {
    /// Interface to bind
    #[arg(long, env = "BGSTUDIO_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "BGSTUDIO_PORT", default_value_t = crate::config::DEFAULT_PORT)]
    pub port: u16,

    /// External enhancement backend
    #[arg(short, long, env = "BGSTUDIO_BACKEND", value_enum, default_value_t = CliBackend::Automatic1111)]
    pub backend: CliBackend,

    /// Automatic1111 web UI base URL
    #[arg(long, env = "BGSTUDIO_SD_URL", default_value = crate::config::DEFAULT_SD_API_URL)]
    pub sd_url: String,

    /// ComfyUI base URL
    #[arg(long, env = "BGSTUDIO_COMFYUI_URL", default_value = crate::config::DEFAULT_COMFYUI_API_URL)]
    pub comfyui_url: String,

    /// Segmentation model (ONNX) [default: <cache dir>/bgstudio/models/isnet.onnx]
    #[arg(short, long, env = "BGSTUDIO_MODEL_PATH", value_name = "PATH")]
    pub model_path: Option<PathBuf>,

    /// Square input edge of the segmentation model
    #[arg(long, env = "BGSTUDIO_MODEL_INPUT_SIZE", default_value_t = 1024)]
    pub model_input_size: u32,

    /// Availability probe timeout in seconds
    #[arg(long, env = "BGSTUDIO_PROBE_TIMEOUT", default_value_t = 2)]
    pub probe_timeout: u64,

    /// img2img call timeout in seconds
    #[arg(long, env = "BGSTUDIO_GENERATION_TIMEOUT", default_value_t = 300)]
    pub generation_timeout: u64,

    /// Source image download timeout in seconds
    #[arg(long, env = "BGSTUDIO_FETCH_TIMEOUT", default_value_t = 60)]
    pub fetch_timeout: u64,

    /// Log output format (console, compact, json with the `tracing-json` feature)
    #[arg(long, env = "BGSTUDIO_LOG_FORMAT", default_value = "console")]
    pub log_format: String,

    /// Enable verbose logging (-v: DEBUG for bgstudio, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print the resolved configuration as JSON and exit
    #[arg(long)]
    pub show_config: bool,

    /// Probe the enhancement backend, report availability and exit
    #[arg(long)]
    pub check_backend: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CliBackend {
    #[value(name = "automatic1111", alias = "a1111")]
    Automatic1111,
    #[value(name = "comfyui", alias = "comfy")]
    ComfyUi,
}

/// Main entry point for the server binary
pub async fn main() -> Result<()> {
    let cli = Cli::parse();
    let format: TracingFormat = cli.log_format.parse().context("Invalid log format")?;

    TracingConfig::new()
        .with_verbosity(cli.verbose)
        .with_format(format)
        .init()
        .context("Failed to initialize tracing")?;

    let config = CliConfigBuilder::from_cli(&cli).context("Invalid configuration")?;

    if cli.show_config {
        println!(
            "{}",
            serde_json::to_string_pretty(&config).context("Failed to serialize configuration")?
        );
        return Ok(());
    }

    let state = AppState::from_config(config.clone()).context("Failed to initialize service")?;

    if cli.check_backend {
        let available = state.pipeline.enhancement_available().await;
        println!(
            "{} at {}: {}",
            config.enhancement_backend,
            config.active_backend_url(),
            if available { "available" } else { "unavailable" }
        );
        return Ok(());
    }

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    server::serve(listener, state).await.context("Server error")?;
    Ok(())
}
