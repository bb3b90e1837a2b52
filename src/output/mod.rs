//! Result serialization: submission CSVs and binary probability dumps.

pub mod proba;
pub mod submission;

pub use proba::{read_probabilities, write_probabilities};
pub use submission::{SubmissionRecord, SubmissionWriter};
