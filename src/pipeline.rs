//! Pipeline orchestration
//!
//! Decode, optional background removal, backdrop synthesis, compositing,
//! optional external enhancement and PNG encoding, in that order.
//! [`ImagePipeline::process_image`] is the error boundary: every failure
//! below it is turned into a failed [`ProcessingResult`].

use crate::backdrop;
use crate::compositor;
use crate::enhance::ImageEnhancer;
use crate::error::{Result, StudioError};
use crate::segmentation::BackgroundRemover;
use crate::services::{ImageFetcher, ImageIOService};
use crate::types::{ProcessedImage, ProcessingOptions, ProcessingResult};
use image::{DynamicImage, RgbaImage};
use instant::Instant;
use std::sync::Arc;
use tracing::Instrument;

/// One unit of batch work: a source URL plus its options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageJob {
    pub image_url: String,
    pub options: ProcessingOptions,
}

impl ImageJob {
    #[must_use]
    pub fn new<S: Into<String>>(image_url: S, options: ProcessingOptions) -> Self {
        Self {
            image_url: image_url.into(),
            options,
        }
    }
}

/// Stateless orchestrator over the three collaborators
#[derive(Clone)]
pub struct ImagePipeline {
    remover: Arc<dyn BackgroundRemover>,
    enhancer: Arc<dyn ImageEnhancer>,
    fetcher: Arc<dyn ImageFetcher>,
}

impl std::fmt::Debug for ImagePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePipeline")
            .field("remover", &self.remover.name())
            .field("enhancer", &self.enhancer.backend_name())
            .finish_non_exhaustive()
    }
}

impl ImagePipeline {
    #[must_use]
    pub fn new(
        remover: Arc<dyn BackgroundRemover>,
        enhancer: Arc<dyn ImageEnhancer>,
        fetcher: Arc<dyn ImageFetcher>,
    ) -> Self {
        Self {
            remover,
            enhancer,
            fetcher,
        }
    }

    #[must_use]
    pub fn enhancer(&self) -> &Arc<dyn ImageEnhancer> {
        &self.enhancer
    }

    /// Whether the external generation service currently answers its probe
    pub async fn enhancement_available(&self) -> bool {
        self.enhancer.is_available().await
    }

    /// Process encoded source bytes into a result record
    pub async fn process_image(&self, source: &[u8], options: &ProcessingOptions) -> ProcessingResult {
        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("process_image", %request_id, style = %options.style);
        into_result(self.run(source, options).instrument(span).await)
    }

    /// Fetch the source from `url`, then process it
    pub async fn process_url(&self, url: &str, options: &ProcessingOptions) -> ProcessingResult {
        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("process_url", %request_id, url, style = %options.style);
        into_result(self.run_url(url, options).instrument(span).await)
    }

    /// Process every job in order
    ///
    /// Items are not isolated from each other: the first failing item aborts
    /// the batch and no partial results are returned.
    ///
    /// # Errors
    /// - The error of the first failing item
    pub async fn process_batch(&self, jobs: &[ImageJob]) -> Result<Vec<ProcessingResult>> {
        let batch_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("process_batch", %batch_id, items = jobs.len());
        async {
            let start = Instant::now();
            let mut results = Vec::with_capacity(jobs.len());
            for (index, job) in jobs.iter().enumerate() {
                let processed = self
                    .run_url(&job.image_url, &job.options)
                    .await
                    .map_err(|e| {
                        tracing::warn!(index, error = %e, "Batch aborted");
                        e
                    })?;
                results.push(encode_result(&processed)?);
            }
            tracing::info!(
                items = results.len(),
                duration_ms = start.elapsed().as_millis() as u64,
                "Batch complete"
            );
            Ok(results)
        }
        .instrument(span)
        .await
    }

    async fn run_url(&self, url: &str, options: &ProcessingOptions) -> Result<ProcessedImage> {
        let bytes = self.fetcher.fetch(url).await?;
        self.run(&bytes, options).await
    }

    /// Fallible core shared by every entry point
    pub async fn run(&self, source: &[u8], options: &ProcessingOptions) -> Result<ProcessedImage> {
        let start = Instant::now();

        let decoded = ImageIOService::decode_rgba(source)?;
        let (width, height) = decoded.dimensions();
        tracing::debug!(width, height, "Decoded source image");

        let subject = if options.remove_background {
            self.remove_background(decoded).await?
        } else {
            decoded
        };

        let backdrop = backdrop::synthesize(width, height, &options.style)?;
        let composite = compositor::composite(
            &DynamicImage::ImageRgb8(backdrop),
            &DynamicImage::ImageRgba8(subject),
        )?;
        let composite = DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(composite).into_rgb8());

        let processed = if options.use_external_enhancement && self.enhancer.is_available().await {
            let prompt = options.enhancement_prompt();
            let enhanced = self
                .enhancer
                .enhance(&composite, &prompt, &options.negative_prompt)
                .await?;
            ProcessedImage {
                image: DynamicImage::ImageRgb8(enhanced.into_rgb8()),
                enhanced: true,
            }
        } else {
            if options.use_external_enhancement {
                let unavailable = StudioError::ExternalServiceUnavailable(format!(
                    "{} did not answer its probe",
                    self.enhancer.backend_name()
                ));
                tracing::warn!(error = %unavailable, "Using composite without enhancement");
            }
            ProcessedImage {
                image: composite,
                enhanced: false,
            }
        };

        tracing::info!(
            width,
            height,
            enhanced = processed.enhanced,
            duration_ms = start.elapsed().as_millis() as u64,
            "Image processed"
        );
        Ok(processed)
    }

    async fn remove_background(&self, image: RgbaImage) -> Result<RgbaImage> {
        let remover = Arc::clone(&self.remover);
        let start = Instant::now();
        let matte = tokio::task::spawn_blocking(move || remover.remove_background(&image))
            .await
            .map_err(|e| StudioError::background_removal(format!("segmentation task failed: {e}")))??;
        tracing::debug!(
            remover = self.remover.name(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Background removal stage done"
        );
        Ok(matte)
    }
}

fn encode_result(processed: &ProcessedImage) -> Result<ProcessingResult> {
    let (width, height) = processed.dimensions();
    let data_url = ImageIOService::encode_png_data_url(&processed.image)?;
    Ok(ProcessingResult::success(data_url, width, height))
}

fn into_result(outcome: Result<ProcessedImage>) -> ProcessingResult {
    match outcome.and_then(|processed| encode_result(&processed)) {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(error = %e, "Processing failed");
            ProcessingResult::failure(e.to_string())
        },
    }
}
