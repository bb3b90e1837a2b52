//! ONNX Runtime implementation of [`SegmentationModel`].

use crate::core::{ProcessingStage, SegError, SegResult, Tensor4D};
use crate::model::registry::ModelSpec;
use crate::model::SegmentationModel;
use ndarray::ArrayView4;
use ort::logging::LogLevel;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;
use std::sync::Mutex;

const SESSION_CREATION_FAILURE: &str = "failed to create ONNX session";

/// Loads an ONNX Runtime session from a checkpoint file.
pub fn load_session(checkpoint: impl AsRef<Path>) -> SegResult<Session> {
    let path = checkpoint.as_ref();
    let builder = Session::builder()?;
    let builder = builder.with_log_level(LogLevel::Error)?;
    builder
        .commit_from_file(path)
        .map_err(|e| SegError::checkpoint_load(path, SESSION_CREATION_FAILURE, e))
}

/// A segmentation model backed by an ONNX Runtime session.
///
/// The checkpoint is loaded once; the session then serves every forward pass
/// for the rest of the run. Execution-provider selection is owned by the
/// runtime and is static for the process.
pub struct OnnxSegModel {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    spec: ModelSpec,
}

impl std::fmt::Debug for OnnxSegModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxSegModel")
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("spec", &self.spec)
            .finish()
    }
}

impl OnnxSegModel {
    /// Loads the checkpoint for the given model spec.
    ///
    /// Tensor names come from the spec when set, otherwise from the session's
    /// declared inputs and outputs.
    pub fn load(spec: &ModelSpec, checkpoint: &Path) -> SegResult<Self> {
        let session = load_session(checkpoint)?;

        let input_name = match &spec.input_name {
            Some(name) => name.clone(),
            None => session
                .inputs
                .first()
                .map(|input| input.name.clone())
                .ok_or_else(|| {
                    SegError::checkpoint_load(
                        checkpoint,
                        "model declares no inputs",
                        crate::core::errors::SimpleError::new("empty input list"),
                    )
                })?,
        };

        let output_name = match &spec.output_name {
            Some(name) => name.clone(),
            None => session
                .outputs
                .first()
                .map(|output| output.name.clone())
                .ok_or_else(|| {
                    SegError::checkpoint_load(
                        checkpoint,
                        "model declares no outputs",
                        crate::core::errors::SimpleError::new("empty output list"),
                    )
                })?,
        };

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            spec: spec.clone(),
        })
    }

    /// Returns the spec this model was loaded with.
    pub fn spec(&self) -> &ModelSpec {
        &self.spec
    }
}

impl SegmentationModel for OnnxSegModel {
    fn forward(&self, batch: &Tensor4D) -> SegResult<Tensor4D> {
        let input_shape = batch.shape().to_vec();

        let input_tensor = TensorRef::from_array_view(batch.view()).map_err(|e| {
            SegError::processing(
                ProcessingStage::TensorOperation,
                format!("failed to convert input tensor with shape {input_shape:?}"),
                e,
            )
        })?;
        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let mut session = self.session.lock().map_err(|_| {
            SegError::invalid_input("failed to acquire session lock: a forward pass panicked")
        })?;

        let outputs = session.run(inputs)?;
        let (output_shape, output_data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| {
                SegError::processing(
                    ProcessingStage::TensorOperation,
                    format!(
                        "failed to extract output tensor '{}' as f32",
                        self.output_name
                    ),
                    e,
                )
            })?;

        if output_shape.len() != 4 {
            return Err(SegError::invalid_input(format!(
                "model '{}' produced a {}D output, expected (N, K, H, W); shape {:?}",
                self.spec.name,
                output_shape.len(),
                output_shape
            )));
        }

        let dims = (
            output_shape[0] as usize,
            output_shape[1] as usize,
            output_shape[2] as usize,
            output_shape[3] as usize,
        );

        if dims.0 != input_shape[0] {
            return Err(SegError::shape_mismatch(
                ProcessingStage::TensorOperation,
                &[input_shape[0]],
                &[dims.0],
            ));
        }
        if dims.1 != self.spec.num_classes {
            return Err(SegError::invalid_input(format!(
                "model '{}' produced {} classes, spec expects {}",
                self.spec.name, dims.1, self.spec.num_classes
            )));
        }

        let expected_len = dims.0 * dims.1 * dims.2 * dims.3;
        if output_data.len() != expected_len {
            return Err(SegError::invalid_input(format!(
                "output data size mismatch: expected {}, got {}",
                expected_len,
                output_data.len()
            )));
        }

        let view = ArrayView4::from_shape(dims, output_data).map_err(SegError::Tensor)?;
        Ok(view.to_owned())
    }

    fn name(&self) -> &str {
        &self.spec.name
    }

    fn num_classes(&self) -> usize {
        self.spec.num_classes
    }
}
