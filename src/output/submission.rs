//! Submission CSV writing.
//!
//! The submission table is seeded from a fixed-schema template file with
//! `image_id` and `PredictionString` columns, extended with one record per
//! predicted image in predictor order, and written to a single explicit
//! output path.

use crate::core::{SegError, SegResult};
use crate::predictor::MaskPredictions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// One row of the submission table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRecord {
    /// Identifier of the image, taken from the manifest file name.
    pub image_id: String,
    /// Space-joined flattened class indexes of the resized mask.
    #[serde(rename = "PredictionString")]
    pub prediction_string: String,
}

/// Writes mask predictions as a submission CSV.
#[derive(Debug)]
pub struct SubmissionWriter {
    template: PathBuf,
    output: PathBuf,
}

impl SubmissionWriter {
    /// Creates a writer seeding from `template` and writing to `output`.
    pub fn new(template: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            template: template.into(),
            output: output.into(),
        }
    }

    /// Returns the output path this writer targets.
    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Writes the submission table and returns the number of rows written.
    ///
    /// Rows are appended to the template's rows in prediction order, so the
    /// table order matches the order the predictor consumed the test set.
    pub fn write(&self, predictions: &MaskPredictions) -> SegResult<usize> {
        let mut records = self.read_template()?;

        for (file_name, row) in predictions.iter() {
            let prediction_string = row
                .iter()
                .map(|label| label.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            records.push(SubmissionRecord {
                image_id: file_name.to_string(),
                prediction_string,
            });
        }

        let mut writer = csv::Writer::from_path(&self.output)
            .map_err(|e| SegError::output_write(&self.output, e))?;
        for record in &records {
            writer
                .serialize(record)
                .map_err(|e| SegError::output_write(&self.output, e))?;
        }
        writer
            .flush()
            .map_err(|e| SegError::output_write(&self.output, e))?;

        info!(
            path = %self.output.display(),
            rows = records.len(),
            "submission table written"
        );
        Ok(records.len())
    }

    fn read_template(&self) -> SegResult<Vec<SubmissionRecord>> {
        let mut reader = csv::Reader::from_path(&self.template).map_err(|e| {
            SegError::data_loading(
                format!("failed to open submission template {:?}", self.template),
                e,
            )
        })?;
        reader
            .deserialize()
            .collect::<Result<Vec<SubmissionRecord>, _>>()
            .map_err(|e| {
                SegError::data_loading(
                    format!("failed to parse submission template {:?}", self.template),
                    e,
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use std::fs;
    use std::sync::Arc;

    fn predictions(names: &[&str], mask_size: usize) -> MaskPredictions {
        let row_len = mask_size * mask_size;
        let data: Vec<u32> = (0..names.len())
            .flat_map(|i| std::iter::repeat(i as u32).take(row_len))
            .collect();
        MaskPredictions {
            file_names: names.iter().map(|&n| Arc::from(n)).collect(),
            rows: Array2::from_shape_vec((names.len(), row_len), data).unwrap(),
        }
    }

    #[test]
    fn writes_template_rows_plus_one_record_per_image() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("sample_submission.csv");
        fs::write(&template, "image_id,PredictionString\n").unwrap();
        let output = dir.path().join("output.csv");

        let writer = SubmissionWriter::new(&template, &output);
        let rows = writer.write(&predictions(&["a.jpg", "b.jpg", "c.jpg"], 4)).unwrap();
        assert_eq!(rows, 3);

        let mut reader = csv::Reader::from_path(&output).unwrap();
        let records: Vec<SubmissionRecord> =
            reader.deserialize().collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].image_id, "a.jpg");
        assert_eq!(records[2].image_id, "c.jpg");

        for record in &records {
            let labels: Vec<u32> = record
                .prediction_string
                .split(' ')
                .map(|token| token.parse().unwrap())
                .collect();
            assert_eq!(labels.len(), 16);
        }
    }

    #[test]
    fn preserves_preexisting_template_rows() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("sample_submission.csv");
        fs::write(
            &template,
            "image_id,PredictionString\nseed.jpg,0 0 0 0\n",
        )
        .unwrap();
        let output = dir.path().join("output.csv");

        let writer = SubmissionWriter::new(&template, &output);
        let rows = writer.write(&predictions(&["a.jpg"], 2)).unwrap();
        assert_eq!(rows, 2);

        let mut reader = csv::Reader::from_path(&output).unwrap();
        let records: Vec<SubmissionRecord> =
            reader.deserialize().collect::<Result<_, _>>().unwrap();
        assert_eq!(records[0].image_id, "seed.jpg");
        assert_eq!(records[1].image_id, "a.jpg");
    }

    #[test]
    fn missing_template_is_a_data_loading_error() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SubmissionWriter::new(
            dir.path().join("absent.csv"),
            dir.path().join("output.csv"),
        );
        let err = writer.write(&predictions(&["a.jpg"], 2)).unwrap_err();
        assert!(matches!(err, SegError::DataLoading { .. }));
    }
}
