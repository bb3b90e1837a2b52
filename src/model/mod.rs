//! Model loading and inference.
//!
//! This module provides the [`SegmentationModel`] trait that the predictor
//! drives, the explicit [`registry::ModelRegistry`] mapping model identifiers
//! to their specifications, and the ONNX Runtime implementation in [`onnx`].

pub mod onnx;
pub mod registry;

pub use onnx::{load_session, OnnxSegModel};
pub use registry::{ModelRegistry, ModelSpec};

use crate::core::{SegResult, Tensor4D};

/// A trained semantic-segmentation model.
///
/// Maps a batch tensor of shape `(N, C, H, W)` to a batch of per-class score
/// tensors of shape `(N, K, H', W')`. Implementations are immutable during
/// inference; the checkpoint is loaded once and lives for the process
/// duration.
pub trait SegmentationModel {
    /// Runs a forward pass over a stacked image batch.
    ///
    /// The call is synchronous and retains no state between batches.
    fn forward(&self, batch: &Tensor4D) -> SegResult<Tensor4D>;

    /// Returns the model identifier.
    fn name(&self) -> &str;

    /// Returns the number of output classes `K`.
    fn num_classes(&self) -> usize;
}
