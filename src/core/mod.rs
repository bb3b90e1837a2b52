//! The core module of the inference pipeline.
//!
//! This module contains the fundamental components shared by the rest of the
//! crate: batch handling, error types, and logging setup. It also re-exports
//! the commonly used types for convenience.

pub mod batch;
pub mod errors;

pub use batch::{BatchSampler, ImageBatch, Mask, Tensor2D, Tensor3D, Tensor4D};
pub use errors::{ProcessingStage, SegError, SegResult};

/// Initializes the tracing subscriber for logging.
///
/// Sets up the tracing subscriber with an environment filter and formatting
/// layer. Typically called once at the start of the binary.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
