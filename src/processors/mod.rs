//! Tensor and mask post-processing utilities.

pub mod postprocess;
pub mod resize;

pub use postprocess::{argmax_masks, softmax};
pub use resize::{resize_mask, SUBMISSION_SIZE};
