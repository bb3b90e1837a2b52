//! Test-set loading and batching.
//!
//! [`TestDataset`] pairs a data directory with its manifest and yields
//! [`ImageBatch`]es lazily, one per iterator step. Image decoding within a
//! batch runs on a dedicated rayon pool sized to half the available cores;
//! the indexed parallel map keeps results in manifest order, so batches are
//! consumed strictly in the order the manifest lists them.

use crate::core::{BatchSampler, ImageBatch, SegError, SegResult, Tensor3D};
use crate::data::manifest::{ImageRecord, TestManifest};
use rayon::prelude::*;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Returns the decode worker count: half the available cores, at least one.
fn worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get() / 2)
        .unwrap_or(1)
        .max(1)
}

/// Decodes one image into a CHW f32 tensor scaled to [0, 1].
fn load_image_chw(path: &Path) -> SegResult<Tensor3D> {
    let img = image::open(path)
        .map_err(|e| SegError::data_loading(format!("failed to decode image {:?}", path), e))?
        .into_rgb8();

    let (width, height) = img.dimensions();
    let mut tensor = Tensor3D::zeros((3, height as usize, width as usize));
    for (x, y, pixel) in img.enumerate_pixels() {
        for c in 0..3 {
            tensor[[c, y as usize, x as usize]] = f32::from(pixel.0[c]) / 255.0;
        }
    }
    Ok(tensor)
}

/// The test image set, backed by a data directory and its manifest.
#[derive(Debug)]
pub struct TestDataset {
    data_dir: PathBuf,
    records: Vec<ImageRecord>,
    pool: rayon::ThreadPool,
}

impl TestDataset {
    /// Opens the dataset rooted at `data_dir`, reading `manifest_name` from it.
    pub fn open(data_dir: &Path, manifest_name: &str) -> SegResult<Self> {
        let manifest = TestManifest::load(&data_dir.join(manifest_name))?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(worker_count())
            .build()
            .map_err(|e| SegError::data_loading("failed to build decode thread pool", e))?;

        debug!(
            images = manifest.len(),
            workers = worker_count(),
            "test dataset opened"
        );

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            records: manifest.images,
            pool,
        })
    }

    /// Returns the number of images in the dataset.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Checks if the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns a lazy iterator over batches of the given size.
    ///
    /// Each step decodes one batch of images; the first decode failure ends
    /// the iteration with an error.
    pub fn batches(&self, batch_size: usize) -> BatchIter<'_> {
        let sampler = BatchSampler::new(batch_size);
        BatchIter {
            dataset: self,
            bounds: sampler.bounds(self.records.len()).into_iter(),
        }
    }

    fn load_batch(&self, range: Range<usize>) -> SegResult<ImageBatch> {
        let records = &self.records[range.clone()];

        let images: Vec<Tensor3D> = self.pool.install(|| {
            records
                .par_iter()
                .map(|record| load_image_chw(&self.data_dir.join(&record.file_name)))
                .collect::<SegResult<Vec<_>>>()
        })?;

        ImageBatch::new(
            images,
            records
                .iter()
                .map(|record| Arc::from(record.file_name.as_str()))
                .collect(),
            range.collect(),
        )
    }
}

/// Lazy iterator over the batches of a [`TestDataset`].
pub struct BatchIter<'a> {
    dataset: &'a TestDataset,
    bounds: std::vec::IntoIter<Range<usize>>,
}

impl Iterator for BatchIter<'_> {
    type Item = SegResult<ImageBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        let range = self.bounds.next()?;
        Some(self.dataset.load_batch(range))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_fixture(dir: &Path, names: &[&str], size: u32) {
        let mut entries = Vec::new();
        for (i, name) in names.iter().enumerate() {
            let path = dir.join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            let img = image::RgbImage::from_pixel(size, size, image::Rgb([i as u8 * 10; 3]));
            img.save(&path).unwrap();
            entries.push(format!(
                r#"{{"id": {i}, "file_name": "{name}", "width": {size}, "height": {size}}}"#
            ));
        }
        fs::write(
            dir.join("test.json"),
            format!(r#"{{"images": [{}]}}"#, entries.join(",")),
        )
        .unwrap();
    }

    #[test]
    fn batches_preserve_manifest_order() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), &["a.png", "b.png", "c.png", "d.png", "e.png"], 4);

        let dataset = TestDataset::open(dir.path(), "test.json").unwrap();
        assert_eq!(dataset.len(), 5);

        let batches: Vec<ImageBatch> = dataset
            .batches(3)
            .collect::<SegResult<Vec<_>>>()
            .unwrap();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), 3);
        assert_eq!(batches[1].len(), 2);

        let names: Vec<&str> = batches
            .iter()
            .flat_map(|b| b.file_names.iter().map(|n| n.as_ref()))
            .collect();
        assert_eq!(names, vec!["a.png", "b.png", "c.png", "d.png", "e.png"]);
        assert_eq!(batches[1].indexes, vec![3, 4]);
    }

    #[test]
    fn decoded_tensors_are_chw_in_unit_range() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), &["a.png"], 4);

        let dataset = TestDataset::open(dir.path(), "test.json").unwrap();
        let batch = dataset.batches(1).next().unwrap().unwrap();
        let tensor = &batch.images[0];
        assert_eq!(tensor.dim(), (3, 4, 4));
        assert!(tensor.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn missing_image_fails_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), &["a.png"], 4);
        fs::write(
            dir.path().join("test.json"),
            r#"{"images": [{"id": 0, "file_name": "missing.png"}]}"#,
        )
        .unwrap();

        let dataset = TestDataset::open(dir.path(), "test.json").unwrap();
        let result = dataset.batches(1).next().unwrap();
        assert!(matches!(result, Err(SegError::DataLoading { .. })));
    }
}
