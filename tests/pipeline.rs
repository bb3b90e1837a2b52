//! End-to-end pipeline test: manifest -> batches -> prediction -> submission.

use seg_infer::core::{SegResult, Tensor4D};
use seg_infer::data::TestDataset;
use seg_infer::model::SegmentationModel;
use seg_infer::output::{SubmissionRecord, SubmissionWriter};
use seg_infer::predictor::MaskPredictor;
use std::fs;
use std::path::Path;

/// Scores the class encoded in each image's first pixel as a one-hot winner
/// over every pixel.
struct FirstPixelModel {
    num_classes: usize,
}

impl SegmentationModel for FirstPixelModel {
    fn forward(&self, batch: &Tensor4D) -> SegResult<Tensor4D> {
        let (n, _, h, w) = batch.dim();
        let mut scores = Tensor4D::zeros((n, self.num_classes, h, w));
        for i in 0..n {
            let class = (batch[[i, 0, 0, 0]] * 255.0).round() as usize % self.num_classes;
            for y in 0..h {
                for x in 0..w {
                    scores[[i, class, y, x]] = 1.0;
                }
            }
        }
        Ok(scores)
    }

    fn name(&self) -> &str {
        "first-pixel"
    }

    fn num_classes(&self) -> usize {
        self.num_classes
    }
}

fn write_test_set(dir: &Path, names: &[&str]) {
    let mut entries = Vec::new();
    for (i, name) in names.iter().enumerate() {
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([i as u8 + 1; 3]));
        img.save(dir.join(name)).unwrap();
        entries.push(format!(r#"{{"id": {i}, "file_name": "{name}"}}"#));
    }
    fs::write(
        dir.join("test.json"),
        format!(r#"{{"images": [{}]}}"#, entries.join(",")),
    )
    .unwrap();
}

#[test]
fn two_batches_produce_an_order_aligned_submission() {
    let dir = tempfile::tempdir().unwrap();
    let names = ["a.png", "b.png", "c.png", "d.png", "e.png"];
    write_test_set(dir.path(), &names);

    let template = dir.path().join("sample_submission.csv");
    fs::write(&template, "image_id,PredictionString\n").unwrap();
    let output = dir.path().join("output.csv");

    let dataset = TestDataset::open(dir.path(), "test.json").unwrap();
    let predictor = MaskPredictor::with_mask_size(FirstPixelModel { num_classes: 12 }, 4);

    // Batches of 3 and 2: names must come out as [a, b, c, d, e].
    let predictions = predictor.predict(dataset.batches(3)).unwrap();
    assert_eq!(predictions.len(), 5);
    assert_eq!(predictions.len(), predictions.rows.nrows());
    let predicted_names: Vec<&str> = predictions.file_names.iter().map(|n| n.as_ref()).collect();
    assert_eq!(predicted_names, names);

    let rows = SubmissionWriter::new(&template, &output)
        .write(&predictions)
        .unwrap();
    assert_eq!(rows, 5);

    let mut reader = csv::Reader::from_path(&output).unwrap();
    let records: Vec<SubmissionRecord> = reader.deserialize().collect::<Result<_, _>>().unwrap();
    assert_eq!(records.len(), 5);

    for (record, (i, name)) in records.iter().zip(names.iter().enumerate()) {
        assert_eq!(record.image_id, *name);
        let labels: Vec<u32> = record
            .prediction_string
            .split(' ')
            .map(|token| token.parse().unwrap())
            .collect();
        assert_eq!(labels.len(), 16);
        // Image i was filled with intensity i+1, so its mask is class i+1.
        assert!(labels.iter().all(|&v| v == i as u32 + 1));
    }
}

#[test]
fn probability_mode_runs_one_image_per_batch() {
    let dir = tempfile::tempdir().unwrap();
    write_test_set(dir.path(), &["a.png", "b.png", "c.png"]);

    let dataset = TestDataset::open(dir.path(), "test.json").unwrap();
    let predictor = MaskPredictor::with_mask_size(FirstPixelModel { num_classes: 3 }, 4);

    let probabilities = predictor.predict_proba(dataset.batches(1)).unwrap();
    assert_eq!(probabilities.len(), 3);
    for tensor in &probabilities {
        assert_eq!(tensor.dim(), (1, 3, 4, 4));
        for y in 0..4 {
            for x in 0..4 {
                let sum: f32 = (0..3).map(|k| tensor[[0, k, y, x]]).sum();
                assert!((sum - 1.0).abs() < 1e-5);
            }
        }
    }
}
