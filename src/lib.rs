#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unused_async)]

//! # bgstudio
//!
//! A local product-photo studio service. It takes a product image, optionally
//! removes its background with an ONNX segmentation model, composites the
//! subject over a synthesized backdrop and can hand the result to a Stable
//! Diffusion img2img service for enhancement.
//!
//! ## Features
//!
//! - **Background Removal**: ISNet-style segmentation through the pure Rust Tract backend
//! - **Backdrops**: `brown-gradient` and `minimal-white` styles
//! - **Enhancement**: Automatic1111 web UI img2img, probed before every use
//! - **HTTP API**: `/health`, `/process-image` and `/batch-process` served with axum
//!
//! ## Library Usage
//!
//! ```rust,no_run
//! use bgstudio::{ImagePipeline, ProcessingOptions, StudioConfig};
//! use bgstudio::enhance::create_enhancer;
//! use bgstudio::segmentation::create_remover;
//! use bgstudio::services::HttpImageFetcher;
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = StudioConfig::builder().sd_api_url("http://127.0.0.1:7860").build()?;
//! let pipeline = ImagePipeline::new(
//!     create_remover(&config),
//!     create_enhancer(&config)?,
//!     Arc::new(HttpImageFetcher::new(config.fetch_timeout)?),
//! );
//!
//! let options = ProcessingOptions::default().with_style("minimal-white");
//! let result = pipeline.process_url("https://example.com/product.jpg", &options).await;
//! assert!(result.success);
//! # Ok(())
//! # }
//! ```
//!
//! ### Feature Flags
//!
//! - `tract` (default): Pure Rust segmentation backend
//! - `cli` (default): Server binary, argument parsing and subscriber setup
//! - `webp-support` (default): WebP source images
//! - `tracing-json`: JSON log output

pub mod backdrop;
pub mod backends;
#[cfg(feature = "cli")]
pub mod cli;
pub mod compositor;
pub mod config;
pub mod enhance;
pub mod error;
pub mod inference;
pub mod pipeline;
pub mod segmentation;
pub mod server;
pub mod services;
pub mod tracing_config;
pub mod types;

// Public API exports
pub use config::{EnhancementBackend, StudioConfig, StudioConfigBuilder};
pub use enhance::{ComfyUiEnhancer, GenerationParams, ImageEnhancer, SdWebUiEnhancer};
pub use error::{Result, StudioError};
pub use inference::InferenceBackend;
pub use pipeline::{ImageJob, ImagePipeline};
pub use segmentation::{BackgroundRemover, SegmentationRemover, UnavailableRemover};
pub use server::{build_router, AppState};
pub use services::{HttpImageFetcher, ImageFetcher, ImageIOService};
pub use types::{ProcessedImage, ProcessingOptions, ProcessingResult, Style};

#[cfg(feature = "tract")]
pub use backends::TractBackend;
