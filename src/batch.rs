//! Batch processing of a folder of scans
//!
//! Discovers JPEG files, crops each one independently and collects a
//! per-file outcome. A failing image never stops the batch.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::crop::{ContentCropper, CropError, CropRect, Result, DEFAULT_MARGIN};

/// Filename suffixes accepted as input (case-sensitive)
pub const JPEG_SUFFIXES: [&str; 2] = [".jpg", ".jpeg"];

/// Default JPEG encoder quality (1-100)
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Whether `file_name` ends with one of the accepted suffixes
pub fn is_jpeg_name(file_name: &str) -> bool {
    JPEG_SUFFIXES.iter().any(|suffix| file_name.ends_with(suffix))
}

/// Collect input images from `dir`, sorted by filename
pub fn discover_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut images = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let accepted = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(is_jpeg_name);
        if accepted {
            images.push(path);
        } else {
            debug!(path = %path.display(), "Skipping non-JPEG file");
        }
    }

    images.sort();
    Ok(images)
}

/// Decode, crop and write one image to `output_dir` under the same filename
pub fn process_image(input: &Path, output_dir: &Path, margin: u32, quality: u8) -> Result<CropRect> {
    let img = image::open(input).map_err(|source| CropError::Decode {
        path: input.to_path_buf(),
        source,
    })?;
    debug!(
        path = %input.display(),
        width = img.width(),
        height = img.height(),
        "Decoded image"
    );

    let (cropped, rect) = ContentCropper::crop(&img, margin).into_result()?;

    let file_name = input.file_name().unwrap_or(input.as_os_str());
    let output = output_dir.join(file_name);
    write_jpeg(&cropped, &output, quality)?;

    Ok(rect)
}

/// Encode `img` as JPEG in memory, then write it to `path`.
///
/// No file is left at `path` when either step fails.
fn write_jpeg(img: &DynamicImage, path: &Path, quality: u8) -> Result<()> {
    let to_write_error = |source: ImageError| CropError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut encoded = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut encoded, quality.clamp(1, 100));

    // JPEG has no alpha channel
    let written = if img.color().has_alpha() {
        DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)
    } else {
        img.write_with_encoder(encoder)
    };
    written.map_err(to_write_error)?;

    if let Err(e) = fs::write(path, &encoded) {
        if path.exists() {
            let _ = fs::remove_file(path);
        }
        return Err(to_write_error(ImageError::IoError(e)));
    }
    Ok(())
}

// ============================================================
// Outcomes
// ============================================================

/// Outcome of one image in a batch
#[derive(Debug)]
pub struct ImageOutcome {
    /// Input filename (no directory)
    pub file_name: String,
    /// Crop rectangle on success
    pub result: Result<CropRect>,
}

impl ImageOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// A file that could not be cropped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedImage {
    pub file_name: String,
    pub reason: String,
}

/// Final tally of a batch run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Number of input images considered
    pub total: usize,
    /// Number of images cropped and written
    pub succeeded: usize,
    /// Every image that failed, in processing order
    pub failed: Vec<FailedImage>,
    /// Margin applied to every image
    pub margin: u32,
    /// Wall-clock duration of the run
    pub elapsed_secs: f64,
}

impl BatchSummary {
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }

    /// Fold one outcome into the tally
    pub fn record(&mut self, outcome: &ImageOutcome) {
        match &outcome.result {
            Ok(_) => self.succeeded += 1,
            Err(e) => self.failed.push(FailedImage {
                file_name: outcome.file_name.clone(),
                reason: e.to_string(),
            }),
        }
    }

    /// Serialize as pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

// ============================================================
// Batch Job
// ============================================================

/// Receives batch progress as it happens
pub trait BatchObserver {
    /// Called once before the first image
    fn on_batch_start(&mut self, _total: usize) {}

    /// Called before an image is processed (`index` is 1-based)
    fn on_image_start(&mut self, _index: usize, _total: usize, _file_name: &str) {}

    /// Called after an image has been processed
    fn on_image_done(&mut self, _index: usize, _total: usize, _outcome: &ImageOutcome) {}
}

/// Observer that ignores every event
pub struct SilentObserver;

impl BatchObserver for SilentObserver {}

/// Options applied uniformly to every image in a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Margin in pixels around the detected content
    pub margin: u32,
    /// JPEG encoder quality (1-100)
    pub jpeg_quality: u8,
    /// Worker threads; 1 processes sequentially, 0 uses every core
    pub threads: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            margin: DEFAULT_MARGIN,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            threads: 1,
        }
    }
}

/// Crop every JPEG in `input_dir` into `output_dir`
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub options: BatchOptions,
}

impl BatchJob {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>, options: BatchOptions) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            options,
        }
    }

    /// Process the whole folder, reporting progress to `observer`.
    ///
    /// Only a failure to list `input_dir` is returned as an error; per-image
    /// failures end up in [`BatchSummary::failed`].
    pub fn run(&self, observer: &mut dyn BatchObserver) -> Result<BatchSummary> {
        let start = Instant::now();
        let images = discover_images(&self.input_dir)?;
        let total = images.len();

        info!(
            total,
            margin = self.options.margin,
            input = %self.input_dir.display(),
            output = %self.output_dir.display(),
            "Starting batch"
        );
        observer.on_batch_start(total);

        let mut summary = BatchSummary {
            total,
            margin: self.options.margin,
            ..Default::default()
        };

        match self.worker_count() {
            1 => {
                for (i, path) in images.iter().enumerate() {
                    let index = i + 1;
                    observer.on_image_start(index, total, &display_name(path));
                    let outcome = self.process_one(path);
                    summary.record(&outcome);
                    observer.on_image_done(index, total, &outcome);
                }
            }
            workers => {
                for (i, outcome) in self.process_parallel(&images, workers).iter().enumerate() {
                    let index = i + 1;
                    observer.on_image_start(index, total, &outcome.file_name);
                    summary.record(outcome);
                    observer.on_image_done(index, total, outcome);
                }
            }
        }

        summary.elapsed_secs = start.elapsed().as_secs_f64();
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed_count(),
            elapsed = summary.elapsed_secs,
            "Batch finished"
        );

        Ok(summary)
    }

    fn worker_count(&self) -> usize {
        match self.options.threads {
            0 => num_cpus::get(),
            n => n,
        }
    }

    fn process_one(&self, path: &Path) -> ImageOutcome {
        let result = process_image(
            path,
            &self.output_dir,
            self.options.margin,
            self.options.jpeg_quality,
        );
        if let Err(e) = &result {
            warn!(path = %path.display(), error = %e, "Could not crop image");
        }
        ImageOutcome {
            file_name: display_name(path),
            result,
        }
    }

    /// Crop on a dedicated rayon pool; outcomes keep input order
    fn process_parallel(&self, images: &[PathBuf], workers: usize) -> Vec<ImageOutcome> {
        use rayon::prelude::*;

        match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
            Ok(pool) => pool.install(|| images.par_iter().map(|p| self.process_one(p)).collect()),
            Err(e) => {
                warn!(error = %e, "Could not start worker pool, processing sequentially");
                images.iter().map(|p| self.process_one(p)).collect()
            }
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
