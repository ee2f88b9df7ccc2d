//! Inference backend abstraction for segmentation models

use crate::error::Result;
use ndarray::Array4;

/// Runs a single-image segmentation network
///
/// Input is an NCHW tensor of shape `(1, 3, S, S)` with `S = input_size()`;
/// output is a `(1, 1, H, W)` foreground probability map.
pub trait InferenceBackend: Send + Sync {
    /// Run inference on the input tensor
    ///
    /// # Errors
    /// - Model inference failures
    /// - Unexpected output tensor rank
    fn infer(&self, input: &Array4<f32>) -> Result<Array4<f32>>;

    /// Square edge length the model expects
    fn input_size(&self) -> u32;

    /// Backend identifier for logs
    fn name(&self) -> &'static str;
}
