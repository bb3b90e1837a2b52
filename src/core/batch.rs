//! Batch handling for the inference pipeline.
//!
//! This module provides the structures used to move batched data through the
//! pipeline: tensor type aliases, the [`ImageBatch`] pairing images with their
//! manifest metadata, and the [`BatchSampler`] that partitions the test set
//! into fixed-size, order-preserving batches.

use crate::core::errors::{ProcessingStage, SegError, SegResult};
use std::ops::Range;
use std::sync::Arc;

/// A 2-dimensional tensor represented as a 2D array of f32 values.
pub type Tensor2D = ndarray::Array2<f32>;

/// A 3-dimensional tensor represented as a 3D array of f32 values.
pub type Tensor3D = ndarray::Array3<f32>;

/// A 4-dimensional tensor represented as a 4D array of f32 values.
pub type Tensor4D = ndarray::Array4<f32>;

/// A per-pixel class-index mask for one image.
pub type Mask = ndarray::Array2<u32>;

/// A batch of images paired with their manifest metadata.
///
/// The three vectors are parallel: `images[i]`, `file_names[i]` and
/// `indexes[i]` all describe the same sample. Batch order matches the order
/// the manifest listed the images; this invariant is what keeps prediction
/// rows aligned with their file names downstream.
#[derive(Debug, Clone)]
pub struct ImageBatch {
    /// The images in the batch, each as a CHW f32 tensor in [0, 1].
    pub images: Vec<Tensor3D>,
    /// The manifest file names, stored as `Arc<str>` for cheap sharing.
    pub file_names: Vec<Arc<str>>,
    /// The positions of the samples in the original manifest.
    pub indexes: Vec<usize>,
}

impl ImageBatch {
    /// Creates a new ImageBatch, validating that the vectors are parallel.
    pub fn new(
        images: Vec<Tensor3D>,
        file_names: Vec<Arc<str>>,
        indexes: Vec<usize>,
    ) -> SegResult<Self> {
        if images.len() != file_names.len() || images.len() != indexes.len() {
            return Err(SegError::invalid_input(format!(
                "batch vectors must be parallel: {} images, {} file names, {} indexes",
                images.len(),
                file_names.len(),
                indexes.len()
            )));
        }
        Ok(Self {
            images,
            file_names,
            indexes,
        })
    }

    /// Returns the number of samples in the batch.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Checks if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Stacks the per-image CHW tensors into one NCHW batch tensor.
    ///
    /// All images must share the same shape; a mismatch is a fatal
    /// batch-assembly error, since the model expects a rectangular batch.
    pub fn stack(&self) -> SegResult<Tensor4D> {
        let first = self.images.first().ok_or_else(|| {
            SegError::invalid_input("cannot stack an empty batch into a tensor")
        })?;
        let (channels, height, width) = first.dim();

        for (i, img) in self.images.iter().enumerate() {
            if img.dim() != (channels, height, width) {
                let (c, h, w) = img.dim();
                return Err(SegError::batch_assembly(
                    format!(
                        "image {i} has shape ({c}, {h}, {w}) but the batch expects ({channels}, {height}, {width})"
                    ),
                    crate::core::errors::SimpleError::new("mixed image shapes in batch"),
                ));
            }
        }

        let mut data = Vec::with_capacity(self.images.len() * channels * height * width);
        for img in &self.images {
            data.extend(img.iter().copied());
        }

        Tensor4D::from_shape_vec((self.images.len(), channels, height, width), data)
            .map_err(SegError::Tensor)
    }
}

/// A sampler that partitions data into fixed-size batches.
///
/// Chunks are yielded in order and every chunk except possibly the last has
/// exactly `batch_size` elements, so downstream accumulation sees samples in
/// the same order the manifest listed them.
#[derive(Debug, Clone)]
pub struct BatchSampler {
    batch_size: usize,
}

impl BatchSampler {
    /// Creates a new BatchSampler with the specified batch size.
    ///
    /// A batch size of zero is clamped to one.
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    /// Returns the batch size.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Returns the index ranges covering `total` samples, in order.
    pub fn bounds(&self, total: usize) -> Vec<Range<usize>> {
        (0..total)
            .step_by(self.batch_size)
            .map(|start| start..(start + self.batch_size).min(total))
            .collect()
    }

    /// Creates an iterator over batches of data with their indexes.
    pub fn batches_with_indexes<'a, T>(
        &self,
        data: &'a [T],
    ) -> impl Iterator<Item = (&'a [T], Vec<usize>)> {
        self.bounds(data.len())
            .into_iter()
            .map(move |range| (&data[range.clone()], range.collect()))
    }
}
