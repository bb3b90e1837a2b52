//! Score-tensor post-processing: argmax reduction and softmax normalization.

use crate::core::{Mask, SegError, SegResult, Tensor4D};

/// Reduces a `(N, K, H, W)` score tensor to `N` label masks.
///
/// For every pixel the class index with the highest score wins; ties resolve
/// to the lowest index, matching the usual argmax convention.
pub fn argmax_masks(scores: &Tensor4D) -> SegResult<Vec<Mask>> {
    let (batch, classes, height, width) = scores.dim();
    if classes == 0 {
        return Err(SegError::invalid_input(
            "cannot take argmax over zero classes",
        ));
    }

    let mut masks = Vec::with_capacity(batch);
    for n in 0..batch {
        let mut mask = Mask::zeros((height, width));
        for y in 0..height {
            for x in 0..width {
                let mut best_class = 0usize;
                let mut best_score = scores[[n, 0, y, x]];
                for k in 1..classes {
                    let score = scores[[n, k, y, x]];
                    if score > best_score {
                        best_score = score;
                        best_class = k;
                    }
                }
                mask[[y, x]] = best_class as u32;
            }
        }
        masks.push(mask);
    }
    Ok(masks)
}

/// Applies a numerically stable softmax along the class axis.
///
/// The per-pixel maximum is subtracted before exponentiation so large logits
/// do not overflow. Every pixel's distribution sums to 1.
pub fn softmax(scores: &Tensor4D) -> Tensor4D {
    let (batch, classes, height, width) = scores.dim();
    let mut out = scores.clone();

    for n in 0..batch {
        for y in 0..height {
            for x in 0..width {
                let mut max = f32::NEG_INFINITY;
                for k in 0..classes {
                    max = max.max(out[[n, k, y, x]]);
                }
                let mut sum = 0.0f32;
                for k in 0..classes {
                    let e = (out[[n, k, y, x]] - max).exp();
                    out[[n, k, y, x]] = e;
                    sum += e;
                }
                for k in 0..classes {
                    out[[n, k, y, x]] /= sum;
                }
            }
        }
    }
    out
}
