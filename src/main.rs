//! Command-line inference driver.
//!
//! Loads a checkpoint for a registered model, runs it over the test manifest
//! in batches, and writes either a submission CSV or a binary probability
//! dump. The process exits nonzero on any propagated error.

use clap::Parser;
use seg_infer::core::{init_tracing, SegResult};
use seg_infer::data::TestDataset;
use seg_infer::model::{ModelRegistry, OnnxSegModel};
use seg_infer::output::{write_probabilities, SubmissionWriter};
use seg_infer::predictor::MaskPredictor;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "seg-infer")]
#[command(about = "Batched semantic-segmentation inference over a test manifest")]
struct Args {
    /// Number of images per inference batch
    #[arg(long, default_value_t = 8)]
    batch_size: usize,

    /// Registered model identifier
    #[arg(long, default_value = "base")]
    model: String,

    /// Directory containing the test images and manifest
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Base name of the output artifact (extension is added per mode)
    #[arg(long, default_value = "output")]
    output_name: String,

    /// Manifest file name inside the data directory
    #[arg(long, default_value = "test.json")]
    test_json: String,

    /// Path to the ONNX checkpoint
    #[arg(long)]
    checkpoint: PathBuf,

    /// Directory the output artifact is written to
    #[arg(long, default_value = "submission")]
    output_dir: PathBuf,

    /// Submission template CSV (defaults to sample_submission.csv in the output directory)
    #[arg(long)]
    template: Option<PathBuf>,

    /// Dump per-pixel class probabilities instead of a submission CSV
    #[arg(long)]
    proba: bool,
}

fn main() -> SegResult<()> {
    init_tracing();
    let args = Args::parse();

    let registry = ModelRegistry::builtin();
    let spec = registry.get(&args.model)?.clone();

    info!(
        model = %spec.name,
        checkpoint = %args.checkpoint.display(),
        "loading checkpoint"
    );
    let model = OnnxSegModel::load(&spec, &args.checkpoint)?;

    let dataset = TestDataset::open(&args.data_dir, &args.test_json)?;
    info!(images = dataset.len(), "test manifest loaded");

    let predictor = MaskPredictor::new(model);
    std::fs::create_dir_all(&args.output_dir)?;

    if args.proba {
        // Probability dumps run one image at a time, keeping per-batch
        // tensors small enough to hold the full-resolution score maps.
        let probabilities = predictor.predict_proba(dataset.batches(1))?;
        let path = args.output_dir.join(format!("{}.bin", args.output_name));
        write_probabilities(&path, &probabilities)?;
    } else {
        let predictions = predictor.predict(dataset.batches(args.batch_size))?;
        let template = args
            .template
            .clone()
            .unwrap_or_else(|| args.output_dir.join("sample_submission.csv"));
        let output = args.output_dir.join(format!("{}.csv", args.output_name));
        SubmissionWriter::new(template, output).write(&predictions)?;
    }

    Ok(())
}
