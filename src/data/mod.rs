//! Test-set access: manifest parsing and batched image loading.

pub mod loader;
pub mod manifest;

pub use loader::{BatchIter, TestDataset};
pub use manifest::{ImageRecord, TestManifest};
