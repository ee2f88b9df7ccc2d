//! Tract backend implementation for segmentation models
//!
//! Tract is a pure Rust ONNX runtime, so the service builds and runs
//! without native inference libraries.

use crate::error::{Result, StudioError};
use crate::inference::InferenceBackend;
use instant::Instant;
use ndarray::Array4;
use std::path::Path;
use tract_onnx::prelude::*;

/// Type alias for the complex Tract model type to reduce complexity warnings
type TractModel = RunnableModel<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Tract backend running an ONNX segmentation model on the CPU
#[derive(Debug)]
pub struct TractBackend {
    model: TractModel,
    input_size: u32,
}

impl TractBackend {
    /// Load, optimize and prepare an ONNX model for a fixed square input
    ///
    /// # Errors
    /// - Model file missing or unreadable
    /// - ONNX graph rejected by tract
    pub fn load<P: AsRef<Path>>(model_path: P, input_size: u32) -> Result<Self> {
        let model_path = model_path.as_ref();
        let load_start = Instant::now();

        if !model_path.is_file() {
            return Err(StudioError::model(format!(
                "Segmentation model not found at '{}'",
                model_path.display()
            )));
        }

        let edge = input_size as usize;
        let model = onnx()
            .model_for_path(model_path)
            .map_err(|e| StudioError::model(format!("Failed to load ONNX model: {e}")))?
            .with_input_fact(0, f32::fact([1, 3, edge, edge]).into())
            .map_err(|e| StudioError::model(format!("Failed to set input shape: {e}")))?
            .into_optimized()
            .map_err(|e| StudioError::model(format!("Failed to optimize model: {e}")))?
            .into_runnable()
            .map_err(|e| StudioError::model(format!("Failed to create runnable model: {e}")))?;

        tracing::info!(
            model = %model_path.display(),
            input_size,
            load_ms = load_start.elapsed().as_millis() as u64,
            "Tract segmentation backend ready"
        );

        Ok(Self { model, input_size })
    }
}

impl InferenceBackend for TractBackend {
    #[allow(clippy::get_first)]
    fn infer(&self, input: &Array4<f32>) -> Result<Array4<f32>> {
        let inference_start = Instant::now();

        let input_tensor = Tensor::from(input.clone());

        let outputs = self
            .model
            .run(tvec![input_tensor.into()])
            .map_err(|e| StudioError::model(format!("Tract inference failed: {e}")))?;

        // ISNet-style models emit several side outputs; the first is the fused mask
        let output_tensor = outputs
            .into_iter()
            .next()
            .ok_or_else(|| StudioError::model("No output tensor found"))?
            .into_arc_tensor();

        let output_data = output_tensor
            .to_array_view::<f32>()
            .map_err(|e| StudioError::model(format!("Failed to convert output tensor: {e}")))?;

        let output_shape = output_data.shape();
        if output_shape.len() != 4 {
            return Err(StudioError::model(format!(
                "Expected 4D output tensor, got {}D",
                output_shape.len()
            )));
        }

        let output_array = Array4::from_shape_vec(
            (
                output_shape.get(0).copied().unwrap_or(1),
                output_shape.get(1).copied().unwrap_or(1),
                output_shape.get(2).copied().unwrap_or(1),
                output_shape.get(3).copied().unwrap_or(1),
            ),
            output_data.to_owned().into_raw_vec_and_offset().0,
        )
        .map_err(|e| StudioError::model(format!("Failed to reshape output tensor: {e}")))?;

        tracing::debug!(
            inference_ms = inference_start.elapsed().as_millis() as u64,
            "Tract inference complete"
        );

        Ok(output_array)
    }

    fn input_size(&self) -> u32 {
        self.input_size
    }

    fn name(&self) -> &'static str {
        "tract"
    }
}
