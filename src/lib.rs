//! # seg-infer
//!
//! A batched inference driver for pretrained semantic-segmentation models.
//! It loads an ONNX checkpoint, runs it over a test image set described by a
//! JSON manifest, and serializes the results as either a submission CSV of
//! flattened label masks or a binary dump of per-pixel class probabilities.
//!
//! ## Pipeline
//!
//! 1. Resolve the model identifier through the explicit [`model::ModelRegistry`].
//! 2. Load the checkpoint once with [`model::OnnxSegModel::load`].
//! 3. Stream batches from [`data::TestDataset`], decoded in manifest order.
//! 4. Run [`predictor::MaskPredictor`]: stack, forward, argmax, resize to the
//!    256x256 submission resolution, flatten. Probability mode applies
//!    softmax instead.
//! 5. Serialize with [`output::SubmissionWriter`] or
//!    [`output::write_probabilities`].
//!
//! The run is fail-fast: any checkpoint, data, processing, or write failure
//! propagates as a typed [`core::SegError`] and terminates the process.
//!
//! ## Modules
//!
//! * [`core`] - Batch handling, error types, and logging setup
//! * [`model`] - Model registry and ONNX Runtime session wrapper
//! * [`data`] - Manifest parsing and batched image loading
//! * [`processors`] - Argmax, softmax, and mask resizing
//! * [`predictor`] - The batched prediction loop
//! * [`output`] - Submission CSV and probability-dump serialization
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use seg_infer::prelude::*;
//! use std::path::Path;
//!
//! # fn main() -> SegResult<()> {
//! let registry = ModelRegistry::builtin();
//! let spec = registry.get("base")?;
//! let model = OnnxSegModel::load(spec, Path::new("saved/exp/latest.onnx"))?;
//!
//! let dataset = TestDataset::open(Path::new("data"), "test.json")?;
//! let predictions = MaskPredictor::new(model).predict(dataset.batches(8))?;
//!
//! let writer = SubmissionWriter::new("submission/sample_submission.csv", "submission/output.csv");
//! writer.write(&predictions)?;
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod data;
pub mod model;
pub mod output;
pub mod predictor;
pub mod processors;

/// Prelude module for convenient imports.
///
/// Brings the essentials into scope with a single use statement:
///
/// ```rust
/// use seg_infer::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::{init_tracing, SegError, SegResult};
    pub use crate::data::TestDataset;
    pub use crate::model::{ModelRegistry, OnnxSegModel, SegmentationModel};
    pub use crate::output::{write_probabilities, SubmissionWriter};
    pub use crate::predictor::{MaskPredictions, MaskPredictor};
}
