//! Shared test doubles and image helpers

#![allow(dead_code)]

use async_trait::async_trait;
use bgstudio::{
    error::{Result, StudioError},
    BackgroundRemover, ImageEnhancer, ImageFetcher, ImageIOService, ImagePipeline,
};
use image::{DynamicImage, Rgba, RgbaImage};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Encode a solid-color RGBA image as PNG bytes
pub fn solid_png(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
    let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(pixel)));
    ImageIOService::encode_png(&image).unwrap()
}

/// Decode a `data:image/png;base64,` URL returned by the pipeline
pub fn decode_data_url(data_url: &str) -> DynamicImage {
    assert!(data_url.starts_with("data:image/png;base64,"), "not a PNG data URL");
    ImageIOService::decode_base64(data_url).unwrap()
}

/// Fetcher serving fixed payloads keyed by URL
#[derive(Default)]
pub struct StaticFetcher {
    sources: HashMap<String, Vec<u8>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, bytes: Vec<u8>) -> Self {
        self.sources.insert(url.to_string(), bytes);
        self
    }
}

#[async_trait]
impl ImageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.sources
            .get(url)
            .cloned()
            .ok_or_else(|| StudioError::fetch_error(url, "HTTP 404 Not Found"))
    }
}

/// Remover that keeps RGB and sets every alpha to a fixed value
pub struct FixedAlphaRemover(pub u8);

impl BackgroundRemover for FixedAlphaRemover {
    fn remove_background(&self, image: &RgbaImage) -> Result<RgbaImage> {
        let mut out = image.clone();
        for pixel in out.pixels_mut() {
            pixel[3] = self.0;
        }
        Ok(out)
    }

    fn name(&self) -> &str {
        "fixed-alpha"
    }
}

/// Enhancer double recording every call
pub struct RecordingEnhancer {
    available: bool,
    outcome: EnhanceOutcome,
    calls: Mutex<Vec<(String, String, (u32, u32))>>,
    checks: AtomicUsize,
}

pub enum EnhanceOutcome {
    Fill([u8; 3]),
    Status(u16),
}

impl RecordingEnhancer {
    pub fn available(fill: [u8; 3]) -> Self {
        Self {
            available: true,
            outcome: EnhanceOutcome::Fill(fill),
            calls: Mutex::new(Vec::new()),
            checks: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            outcome: EnhanceOutcome::Fill([0, 0, 0]),
            calls: Mutex::new(Vec::new()),
            checks: AtomicUsize::new(0),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            available: true,
            outcome: EnhanceOutcome::Status(status),
            calls: Mutex::new(Vec::new()),
            checks: AtomicUsize::new(0),
        }
    }

    /// Number of availability checks so far
    pub fn availability_checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }

    /// `(prompt, negative_prompt, input dimensions)` of every enhance call
    pub fn calls(&self) -> Vec<(String, String, (u32, u32))> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageEnhancer for RecordingEnhancer {
    async fn is_available(&self) -> bool {
        self.checks.fetch_add(1, Ordering::SeqCst);
        self.available
    }

    async fn enhance(
        &self,
        image: &DynamicImage,
        prompt: &str,
        negative_prompt: &str,
    ) -> Result<DynamicImage> {
        self.calls.lock().unwrap().push((
            prompt.to_string(),
            negative_prompt.to_string(),
            (image.width(), image.height()),
        ));
        match self.outcome {
            EnhanceOutcome::Fill([r, g, b]) => Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
                image.width(),
                image.height(),
                Rgba([r, g, b, 255]),
            ))),
            EnhanceOutcome::Status(status) => Err(StudioError::ExternalService { status }),
        }
    }

    fn backend_name(&self) -> &'static str {
        "recording"
    }
}

/// Pipeline over the given doubles
pub fn pipeline(
    remover: impl BackgroundRemover + 'static,
    enhancer: Arc<RecordingEnhancer>,
    fetcher: StaticFetcher,
) -> ImagePipeline {
    ImagePipeline::new(Arc::new(remover), enhancer, Arc::new(fetcher))
}
