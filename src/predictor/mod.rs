//! Batched mask and probability prediction.
//!
//! [`MaskPredictor`] drives a [`SegmentationModel`] over a sequence of
//! batches. In mask mode each batch is stacked, run through the model,
//! reduced to label masks, resized to the submission resolution, and
//! flattened into rows of the running prediction matrix. In probability mode
//! the raw scores are softmax-normalized and collected per batch.

use crate::core::{ImageBatch, SegError, SegResult, Tensor4D};
use crate::model::SegmentationModel;
use crate::processors::{argmax_masks, resize_mask, softmax, SUBMISSION_SIZE};
use ndarray::{Array2, ArrayView1};
use std::sync::Arc;
use tracing::{debug, info};

/// The accumulated output of a mask-mode run.
///
/// Row `i` of `rows` is the flattened resized mask for `file_names[i]`; the
/// pairing holds because both accumulate in the same loop, batch by batch
/// and sample by sample.
#[derive(Debug, Clone)]
pub struct MaskPredictions {
    /// File names in prediction order.
    pub file_names: Vec<Arc<str>>,
    /// One flattened mask per row, `mask_size * mask_size` labels wide.
    pub rows: Array2<u32>,
}

impl MaskPredictions {
    /// Returns the number of predicted images.
    pub fn len(&self) -> usize {
        self.file_names.len()
    }

    /// Checks if the run produced no predictions.
    pub fn is_empty(&self) -> bool {
        self.file_names.is_empty()
    }

    /// Iterates over `(file_name, flattened_mask)` pairs in prediction order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ArrayView1<'_, u32>)> {
        self.file_names
            .iter()
            .map(|name| name.as_ref())
            .zip(self.rows.outer_iter())
    }
}

/// Runs a segmentation model over batches of test images.
#[derive(Debug)]
pub struct MaskPredictor<M: SegmentationModel> {
    model: M,
    mask_size: usize,
}

impl<M: SegmentationModel> MaskPredictor<M> {
    /// Creates a predictor producing masks at the submission resolution.
    pub fn new(model: M) -> Self {
        Self::with_mask_size(model, SUBMISSION_SIZE)
    }

    /// Creates a predictor with a custom output mask resolution.
    pub fn with_mask_size(model: M, mask_size: usize) -> Self {
        Self { model, mask_size }
    }

    /// Returns the model driven by this predictor.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Runs mask-mode prediction over the given batches.
    ///
    /// Guarantees that output row `i` corresponds to output name `i`: batch
    /// order and within-batch order are both preserved. The first failing
    /// batch aborts the run.
    pub fn predict(
        &self,
        batches: impl IntoIterator<Item = SegResult<ImageBatch>>,
    ) -> SegResult<MaskPredictions> {
        info!(model = self.model.name(), "starting mask prediction");

        let row_len = self.mask_size * self.mask_size;
        let mut file_names: Vec<Arc<str>> = Vec::new();
        let mut data: Vec<u32> = Vec::new();

        for (batch_index, batch) in batches.into_iter().enumerate() {
            let batch = batch?;
            let scores = self.forward_batch(&batch)?;
            let masks = argmax_masks(&scores)?;

            for (mask, file_name) in masks.iter().zip(&batch.file_names) {
                let resized = resize_mask(mask, self.mask_size, self.mask_size)?;
                data.extend(resized.iter().copied());
                file_names.push(Arc::clone(file_name));
            }
            debug!(batch = batch_index, images = batch.len(), "batch predicted");
        }

        let rows =
            Array2::from_shape_vec((file_names.len(), row_len), data).map_err(SegError::Tensor)?;

        info!(images = file_names.len(), "mask prediction finished");
        Ok(MaskPredictions { file_names, rows })
    }

    /// Runs probability-mode prediction over the given batches.
    ///
    /// Returns one softmax-normalized score tensor per batch, in batch
    /// order.
    pub fn predict_proba(
        &self,
        batches: impl IntoIterator<Item = SegResult<ImageBatch>>,
    ) -> SegResult<Vec<Tensor4D>> {
        info!(model = self.model.name(), "starting probability prediction");

        let mut probabilities = Vec::new();
        for batch in batches {
            let batch = batch?;
            let scores = self.forward_batch(&batch)?;
            probabilities.push(softmax(&scores));
        }

        info!(batches = probabilities.len(), "probability prediction finished");
        Ok(probabilities)
    }

    fn forward_batch(&self, batch: &ImageBatch) -> SegResult<Tensor4D> {
        let input = batch.stack()?;
        let scores = self.model.forward(&input)?;

        if scores.dim().0 != batch.len() {
            return Err(SegError::invalid_input(format!(
                "model returned {} score maps for a batch of {} images",
                scores.dim().0,
                batch.len()
            )));
        }
        Ok(scores)
    }
}
