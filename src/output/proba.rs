//! Binary probability dumps.
//!
//! Probability-mode runs serialize the list of per-batch softmax tensors to
//! a single binary file with bincode.

use crate::core::{SegError, SegResult, Tensor4D};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::info;

/// Serializes per-batch probability tensors to a binary file.
pub fn write_probabilities(path: &Path, probabilities: &[Tensor4D]) -> SegResult<()> {
    let file = File::create(path).map_err(|e| SegError::output_write(path, e))?;
    let writer = BufWriter::new(file);
    bincode::serialize_into(writer, probabilities)
        .map_err(|e| SegError::output_write(path, e))?;

    info!(
        path = %path.display(),
        batches = probabilities.len(),
        "probability dump written"
    );
    Ok(())
}

/// Reads back a probability dump written by [`write_probabilities`].
pub fn read_probabilities(path: &Path) -> SegResult<Vec<Tensor4D>> {
    let file = File::open(path)
        .map_err(|e| SegError::data_loading(format!("failed to open dump {:?}", path), e))?;
    let reader = BufReader::new(file);
    bincode::deserialize_from(reader)
        .map_err(|e| SegError::data_loading(format!("failed to parse dump {:?}", path), e))
}
