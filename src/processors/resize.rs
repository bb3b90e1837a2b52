//! Label-preserving mask resizing.
//!
//! Submission masks are resized with nearest-neighbor sampling: each output
//! pixel copies one source label. Interpolation would invent class indexes
//! that exist in neither source pixel, so it is never used here.

use crate::core::{Mask, SegError, SegResult};

/// The fixed submission resolution. Predictions at the model's native
/// resolution are resized to this before flattening.
pub const SUBMISSION_SIZE: usize = 256;

/// Resizes a label mask to `(out_height, out_width)` with nearest-neighbor
/// sampling.
///
/// An exact-size input is returned unchanged, which makes the operation
/// idempotent.
pub fn resize_mask(mask: &Mask, out_height: usize, out_width: usize) -> SegResult<Mask> {
    let (in_height, in_width) = mask.dim();
    if in_height == 0 || in_width == 0 {
        return Err(SegError::invalid_input("cannot resize an empty mask"));
    }
    if out_height == 0 || out_width == 0 {
        return Err(SegError::invalid_input(
            "mask resize target dimensions must be nonzero",
        ));
    }
    if (in_height, in_width) == (out_height, out_width) {
        return Ok(mask.clone());
    }

    let mut out = Mask::zeros((out_height, out_width));
    for y in 0..out_height {
        let src_y = (y * in_height / out_height).min(in_height - 1);
        for x in 0..out_width {
            let src_x = (x * in_width / out_width).min(in_width - 1);
            out[[y, x]] = mask[[src_y, src_x]];
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_size_resize_is_identity() {
        let mask = Mask::from_shape_vec((2, 2), vec![1, 2, 3, 4]).unwrap();
        let resized = resize_mask(&mask, 2, 2).unwrap();
        assert_eq!(resized, mask);
    }

    #[test]
    fn resize_is_idempotent() {
        let mask = Mask::from_shape_vec((4, 4), (0..16u32).collect()).unwrap();
        let once = resize_mask(&mask, 2, 2).unwrap();
        let twice = resize_mask(&once, 2, 2).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn upsample_replicates_source_labels() {
        let mask = Mask::from_shape_vec((2, 2), vec![1, 2, 3, 4]).unwrap();
        let resized = resize_mask(&mask, 4, 4).unwrap();
        // Each source label covers a 2x2 block; no new labels appear.
        assert_eq!(resized[[0, 0]], 1);
        assert_eq!(resized[[0, 3]], 2);
        assert_eq!(resized[[3, 0]], 3);
        assert_eq!(resized[[3, 3]], 4);
        for v in resized.iter() {
            assert!(mask.iter().any(|s| s == v));
        }
    }

    #[test]
    fn downsample_only_copies_existing_labels() {
        let mask = Mask::from_shape_vec((4, 4), (0..16u32).collect()).unwrap();
        let resized = resize_mask(&mask, 2, 2).unwrap();
        assert_eq!(resized.dim(), (2, 2));
        for v in resized.iter() {
            assert!(mask.iter().any(|s| s == v));
        }
    }

    #[test]
    fn zero_target_is_rejected() {
        let mask = Mask::zeros((2, 2));
        assert!(resize_mask(&mask, 0, 2).is_err());
        assert!(resize_mask(&mask, 2, 0).is_err());
    }
}
