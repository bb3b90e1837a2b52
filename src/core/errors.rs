//! Error types for the segmentation inference pipeline.
//!
//! This module defines the error types that can occur while driving a
//! segmentation model over a test set: checkpoint loading, data loading,
//! tensor processing, and output serialization. It also provides utility
//! constructors for creating these errors with appropriate context.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Convenient result alias for segmentation inference operations.
pub type SegResult<T> = Result<T, SegError>;

/// Enum representing different stages of processing in the inference pipeline.
///
/// Used to identify which stage of the pipeline an error occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Error occurred during tensor operations.
    TensorOperation,
    /// Error occurred while assembling a batch tensor.
    BatchAssembly,
    /// Error occurred during mask resizing.
    Resize,
    /// Error occurred during post-processing.
    PostProcessing,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::TensorOperation => write!(f, "tensor operation"),
            ProcessingStage::BatchAssembly => write!(f, "batch assembly"),
            ProcessingStage::Resize => write!(f, "resize"),
            ProcessingStage::PostProcessing => write!(f, "post-processing"),
        }
    }
}

/// A plain string error used as a source when no underlying error exists.
#[derive(Debug, Clone)]
pub struct SimpleError {
    message: String,
}

impl SimpleError {
    /// Creates a new SimpleError with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SimpleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SimpleError {}

/// Enum representing the errors that can occur in the inference pipeline.
///
/// Each failure mode of the run maps onto a distinct variant: loading the
/// model checkpoint, loading the test data, processing tensors, and writing
/// the output artifact. All failures are fatal; the driver fails fast.
#[derive(Error, Debug)]
pub enum SegError {
    /// The model checkpoint could not be loaded.
    #[error("checkpoint load failed for {path:?}: {context}")]
    CheckpointLoad {
        /// Path of the checkpoint that failed to load.
        path: PathBuf,
        /// Additional context about the failure.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The test manifest or an input image could not be loaded.
    #[error("data loading failed: {context}")]
    DataLoading {
        /// Additional context about the failure.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error occurred while processing tensors or masks.
    #[error("{kind} failed: {context}")]
    Processing {
        /// The stage of processing where the error occurred.
        kind: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An output artifact could not be written.
    #[error("output write failed for {path:?}")]
    OutputWrite {
        /// Path of the artifact that failed to write.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error occurred while decoding an image.
    #[error("image load")]
    ImageLoad(#[from] image::ImageError),

    /// Error from the ONNX Runtime session.
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// Error from tensor shape operations.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

impl SegError {
    /// Creates a SegError for a failed checkpoint load.
    pub fn checkpoint_load(
        path: &Path,
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::CheckpointLoad {
            path: path.to_path_buf(),
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a SegError for a failed data load.
    pub fn data_loading(
        context: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::DataLoading {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a SegError for a processing failure at the given stage.
    pub fn processing(
        kind: ProcessingStage,
        context: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind,
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a SegError for batch assembly failures.
    pub fn batch_assembly(
        context: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::processing(ProcessingStage::BatchAssembly, context, error)
    }

    /// Creates a SegError for post-processing failures.
    pub fn post_processing(
        context: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::processing(ProcessingStage::PostProcessing, context, error)
    }

    /// Creates a SegError for a tensor shape mismatch without an underlying error.
    pub fn shape_mismatch(kind: ProcessingStage, expected: &[usize], actual: &[usize]) -> Self {
        Self::Processing {
            kind,
            context: format!("expected shape {:?}, got {:?}", expected, actual),
            source: Box::new(SimpleError::new("tensor shape mismatch")),
        }
    }

    /// Creates a SegError for a failed output write.
    pub fn output_write(
        path: &Path,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::OutputWrite {
            path: path.to_path_buf(),
            source: Box::new(error),
        }
    }

    /// Creates a SegError for invalid input.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a SegError for configuration errors.
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processing_stage_displays_human_readable_names() {
        assert_eq!(ProcessingStage::Resize.to_string(), "resize");
        assert_eq!(ProcessingStage::BatchAssembly.to_string(), "batch assembly");
    }

    #[test]
    fn shape_mismatch_reports_both_shapes() {
        let err = SegError::shape_mismatch(ProcessingStage::PostProcessing, &[2, 4], &[2, 3]);
        let message = err.to_string();
        assert!(message.contains("[2, 4]"));
        assert!(message.contains("[2, 3]"));
        assert!(message.starts_with("post-processing"));
    }

    #[test]
    fn checkpoint_load_includes_path() {
        let err = SegError::checkpoint_load(
            Path::new("saved/latest.onnx"),
            "failed to create session",
            SimpleError::new("boom"),
        );
        assert!(err.to_string().contains("latest.onnx"));
    }
}
