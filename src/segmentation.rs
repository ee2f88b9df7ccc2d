//! Background removal
//!
//! [`BackgroundRemover`] is the seam the pipeline depends on. The concrete
//! [`SegmentationRemover`] letterboxes the image into the model's square
//! input, runs an [`InferenceBackend`], maps the predicted mask back onto the
//! original pixel grid and installs it as the alpha matte.

use crate::config::StudioConfig;
use crate::error::{Result, StudioError};
use crate::inference::InferenceBackend;
use image::{imageops, Rgb, RgbImage, Rgba, RgbaImage};
use instant::Instant;
use ndarray::Array4;
use std::sync::Arc;

/// Removes the background of an image by writing an alpha matte
pub trait BackgroundRemover: Send + Sync {
    /// Return a copy of `image` whose alpha channel separates subject from background
    ///
    /// # Errors
    /// - `BackgroundRemoval` when segmentation fails
    fn remove_background(&self, image: &RgbaImage) -> Result<RgbaImage>;

    /// Identifier for logs
    fn name(&self) -> &str;
}

/// Per-channel normalization applied before inference
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    pub mean: [f32; 3],
    pub std: [f32; 3],
}

impl Default for Normalization {
    /// ISNet normalization: `(x / 255 - 0.5) / 1.0`
    fn default() -> Self {
        Self {
            mean: [0.5, 0.5, 0.5],
            std: [1.0, 1.0, 1.0],
        }
    }
}

/// Mapping between original pixel coordinates and the letterboxed tensor
#[derive(Debug, Clone, Copy, PartialEq)]
struct Letterbox {
    scale: f32,
    scaled_width: u32,
    scaled_height: u32,
    offset_x: u32,
    offset_y: u32,
}

impl Letterbox {
    fn new(original: (u32, u32), target: u32) -> Self {
        let (width, height) = original;
        let target_f32 = target as f32;
        let scale = (target_f32 / width as f32).min(target_f32 / height as f32);
        let scaled_width = ((width as f32 * scale).round() as u32).clamp(1, target);
        let scaled_height = ((height as f32 * scale).round() as u32).clamp(1, target);
        Self {
            scale,
            scaled_width,
            scaled_height,
            offset_x: (target - scaled_width) / 2,
            offset_y: (target - scaled_height) / 2,
        }
    }

    /// Tensor coordinates of an original pixel
    fn project(&self, x: u32, y: u32) -> (usize, usize) {
        let tx = (x as f32 * self.scale).round() as u32;
        let ty = (y as f32 * self.scale).round() as u32;
        (
            (tx.min(self.scaled_width - 1) + self.offset_x) as usize,
            (ty.min(self.scaled_height - 1) + self.offset_y) as usize,
        )
    }
}

/// Model-backed background remover
pub struct SegmentationRemover {
    backend: Box<dyn InferenceBackend>,
    normalization: Normalization,
    padding_color: [u8; 3],
}

impl SegmentationRemover {
    #[must_use]
    pub fn new(backend: Box<dyn InferenceBackend>) -> Self {
        Self {
            backend,
            normalization: Normalization::default(),
            padding_color: [255, 255, 255],
        }
    }

    #[must_use]
    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    /// Letterbox into a `size x size` canvas and convert to a normalized NCHW tensor
    fn preprocess(&self, image: &RgbaImage, letterbox: &Letterbox, size: u32) -> Array4<f32> {
        let rgb = imageops::resize(
            &image_to_rgb(image),
            letterbox.scaled_width,
            letterbox.scaled_height,
            imageops::FilterType::Triangle,
        );

        let mut canvas = RgbImage::from_pixel(size, size, Rgb(self.padding_color));
        imageops::replace(
            &mut canvas,
            &rgb,
            i64::from(letterbox.offset_x),
            i64::from(letterbox.offset_y),
        );

        let edge = size as usize;
        let Normalization { mean, std } = self.normalization;
        let mut tensor = Array4::<f32>::zeros((1, 3, edge, edge));
        for (x, y, pixel) in canvas.enumerate_pixels() {
            for c in 0..3 {
                let value = f32::from(pixel.0.get(c).copied().unwrap_or(0)) / 255.0;
                let (m, s) = (mean.get(c).copied().unwrap_or(0.0), std.get(c).copied().unwrap_or(1.0));
                if let Some(slot) = tensor.get_mut([0, c, y as usize, x as usize]) {
                    *slot = (value - m) / s;
                }
            }
        }
        tensor
    }

    /// Sample the predicted mask at every original pixel and install it as alpha
    fn apply_mask(
        image: &RgbaImage,
        mask: &Array4<f32>,
        letterbox: &Letterbox,
        size: u32,
    ) -> Result<RgbaImage> {
        let shape = mask.shape();
        let edge = size as usize;
        if shape != [1, 1, edge, edge] {
            return Err(StudioError::background_removal(format!(
                "Invalid mask tensor shape {:?} (expected [1, 1, {}, {}])",
                shape, edge, edge
            )));
        }

        let mut result = RgbaImage::new(image.width(), image.height());
        for (x, y, pixel) in image.enumerate_pixels() {
            let (tx, ty) = letterbox.project(x, y);
            let probability = mask.get([0, 0, ty, tx]).copied().ok_or_else(|| {
                StudioError::background_removal(format!("Mask sample ({tx}, {ty}) out of bounds"))
            })?;
            let alpha = (probability.clamp(0.0, 1.0) * 255.0).round() as u8;
            let out = if alpha == 0 {
                Rgba([0, 0, 0, 0])
            } else {
                Rgba([pixel[0], pixel[1], pixel[2], alpha])
            };
            result.put_pixel(x, y, out);
        }
        Ok(result)
    }
}

impl BackgroundRemover for SegmentationRemover {
    fn remove_background(&self, image: &RgbaImage) -> Result<RgbaImage> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(StudioError::InvalidDimensions { width, height });
        }

        let size = self.backend.input_size();
        if size == 0 {
            return Err(StudioError::background_removal(format!(
                "{} backend reports a zero input size",
                self.backend.name()
            )));
        }

        let start = Instant::now();
        let letterbox = Letterbox::new((width, height), size);
        let input = self.preprocess(image, &letterbox, size);

        let output = self
            .backend
            .infer(&input)
            .map_err(|e| StudioError::background_removal(e.to_string()))?;

        let matte = Self::apply_mask(image, &output, &letterbox, size)?;
        tracing::debug!(
            backend = self.backend.name(),
            width,
            height,
            duration_ms = start.elapsed().as_millis() as u64,
            "Background removed"
        );
        Ok(matte)
    }

    fn name(&self) -> &str {
        self.backend.name()
    }
}

/// Stand-in used when no segmentation model could be loaded
///
/// Keeps the service usable for `remove_bg=false` requests while making
/// every removal attempt fail with the original load error.
#[derive(Debug, Clone)]
pub struct UnavailableRemover {
    reason: String,
}

impl UnavailableRemover {
    #[must_use]
    pub fn new<S: Into<String>>(reason: S) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl BackgroundRemover for UnavailableRemover {
    fn remove_background(&self, _image: &RgbaImage) -> Result<RgbaImage> {
        Err(StudioError::background_removal(format!(
            "no segmentation model loaded: {}",
            self.reason
        )))
    }

    fn name(&self) -> &str {
        "unavailable"
    }
}

/// Build the background remover for the configured model
///
/// Load failures are logged and degrade to an [`UnavailableRemover`].
#[must_use]
pub fn create_remover(config: &StudioConfig) -> Arc<dyn BackgroundRemover> {
    let Some(model_path) = config.resolved_model_path() else {
        tracing::warn!("No model path configured and no cache directory available");
        return Arc::new(UnavailableRemover::new("no model path configured"));
    };

    #[cfg(feature = "tract")]
    {
        match crate::backends::TractBackend::load(&model_path, config.model_input_size) {
            Ok(backend) => Arc::new(SegmentationRemover::new(Box::new(backend))),
            Err(e) => {
                tracing::warn!(
                    model = %model_path.display(),
                    error = %e,
                    "Background removal disabled"
                );
                Arc::new(UnavailableRemover::new(e.to_string()))
            },
        }
    }

    #[cfg(not(feature = "tract"))]
    {
        tracing::warn!(model = %model_path.display(), "Built without a segmentation backend");
        Arc::new(UnavailableRemover::new(
            "built without a segmentation backend (enable the `tract` feature)",
        ))
    }
}

fn image_to_rgb(image: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let p = image.get_pixel(x, y);
        Rgb([p[0], p[1], p[2]])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Backend that emits a fixed mask, optionally only for the left half
    struct MaskBackend {
        size: u32,
        value: f32,
        left_half_only: bool,
        fail: bool,
        /// Edge of the emitted mask when it differs from `size`
        mask_edge: Option<usize>,
    }

    impl InferenceBackend for MaskBackend {
        fn infer(&self, input: &Array4<f32>) -> Result<Array4<f32>> {
            if self.fail {
                return Err(StudioError::model("mock inference failure"));
            }
            let edge = self.size as usize;
            assert_eq!(input.shape(), &[1, 3, edge, edge]);
            let edge = self.mask_edge.unwrap_or(edge);
            Ok(Array4::from_shape_fn((1, 1, edge, edge), |(_, _, _, x)| {
                if self.left_half_only && x >= edge / 2 {
                    0.0
                } else {
                    self.value
                }
            }))
        }

        fn input_size(&self) -> u32 {
            self.size
        }

        fn name(&self) -> &'static str {
            "mask-mock"
        }
    }

    fn remover(value: f32, left_half_only: bool) -> SegmentationRemover {
        SegmentationRemover::new(Box::new(MaskBackend {
            size: 32,
            value,
            left_half_only,
            fail: false,
            mask_edge: None,
        }))
    }

    fn product(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([200, 50, 25, 255]))
    }

    #[test]
    fn test_full_mask_keeps_everything() {
        let out = remover(1.0, false).remove_background(&product(20, 10)).unwrap();
        assert_eq!(out.dimensions(), (20, 10));
        assert!(out.pixels().all(|p| p.0 == [200, 50, 25, 255]));
    }

    #[test]
    fn test_empty_mask_clears_everything() {
        let out = remover(0.0, false).remove_background(&product(10, 20)).unwrap();
        assert!(out.pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }

    #[test]
    fn test_mask_values_are_clamped() {
        let out = remover(3.5, false).remove_background(&product(4, 4)).unwrap();
        assert!(out.pixels().all(|p| p[3] == 255));
        let out = remover(0.5, false).remove_background(&product(4, 4)).unwrap();
        assert!(out.pixels().all(|p| p[3] == 128));
    }

    #[test]
    fn test_mask_maps_back_to_original_grid() {
        // Square input fills the tensor, so the left half of the mask is the left half of the image
        let out = remover(1.0, true).remove_background(&product(64, 64)).unwrap();
        assert_eq!(out.get_pixel(2, 30)[3], 255);
        assert_eq!(out.get_pixel(61, 30)[3], 0);
    }

    #[test]
    fn test_letterbox_geometry() {
        let letterbox = Letterbox::new((200, 100), 32);
        assert_eq!((letterbox.scaled_width, letterbox.scaled_height), (32, 16));
        assert_eq!((letterbox.offset_x, letterbox.offset_y), (0, 8));
        assert_eq!(letterbox.project(0, 0), (0, 8));
        assert_eq!(letterbox.project(199, 99), (31, 23));
    }

    #[test]
    fn test_inference_failure_is_background_removal_error() {
        let remover = SegmentationRemover::new(Box::new(MaskBackend {
            size: 8,
            value: 1.0,
            left_half_only: false,
            fail: true,
            mask_edge: None,
        }));
        let err = remover.remove_background(&product(4, 4)).unwrap_err();
        assert!(matches!(err, StudioError::BackgroundRemoval(_)));
        assert!(err.to_string().contains("mock inference failure"));
    }

    #[test]
    fn test_undersized_mask_is_rejected() {
        let remover = SegmentationRemover::new(Box::new(MaskBackend {
            size: 32,
            value: 1.0,
            left_half_only: false,
            fail: false,
            mask_edge: Some(16),
        }));
        let err = remover.remove_background(&product(8, 8)).unwrap_err();
        assert!(matches!(err, StudioError::BackgroundRemoval(_)));
        assert!(err.to_string().contains("[1, 1, 16, 16]"));
    }

    #[test]
    fn test_zero_input_size_is_rejected() {
        let remover = SegmentationRemover::new(Box::new(MaskBackend {
            size: 0,
            value: 1.0,
            left_half_only: false,
            fail: false,
            mask_edge: None,
        }));
        let err = remover.remove_background(&product(4, 4)).unwrap_err();
        assert!(matches!(err, StudioError::BackgroundRemoval(_)));
        assert!(err.to_string().contains("zero input size"));
    }

    #[test]
    fn test_unavailable_remover_reports_reason() {
        let remover = UnavailableRemover::new("model missing");
        let err = remover.remove_background(&product(2, 2)).unwrap_err();
        assert!(matches!(err, StudioError::BackgroundRemoval(_)));
        assert!(err.to_string().contains("model missing"));
    }

    #[test]
    fn test_create_remover_without_model_degrades() {
        let config = StudioConfig::builder()
            .model_path("/nonexistent/isnet.onnx")
            .build()
            .unwrap();
        let remover = create_remover(&config);
        assert_eq!(remover.name(), "unavailable");
        assert!(remover.remove_background(&product(2, 2)).is_err());
    }
}
