//! Test-set manifest parsing.
//!
//! The test set is described by a COCO-style JSON manifest with an `images`
//! array. Only the `file_name` field is required per record; the remaining
//! fields are tolerated for compatibility with annotation tooling output.

use crate::core::{SegError, SegResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// One image entry of the test manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Image identifier assigned by the annotation tooling.
    #[serde(default)]
    pub id: u64,
    /// Path of the image, relative to the data directory.
    pub file_name: String,
    /// Pixel width, when the tooling recorded it.
    #[serde(default)]
    pub width: u32,
    /// Pixel height, when the tooling recorded it.
    #[serde(default)]
    pub height: u32,
}

/// The parsed test manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestManifest {
    /// Image records in manifest order.
    pub images: Vec<ImageRecord>,
}

impl TestManifest {
    /// Loads and parses a manifest from a JSON file.
    pub fn load(path: &Path) -> SegResult<Self> {
        let file = File::open(path).map_err(|e| {
            SegError::data_loading(format!("failed to open manifest {:?}", path), e)
        })?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| {
            SegError::data_loading(format!("failed to parse manifest {:?}", path), e)
        })
    }

    /// Returns the number of images listed.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Checks if the manifest lists no images.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
