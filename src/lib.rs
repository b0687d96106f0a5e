//! scan-cropper - batch cropper for scanned photos
//!
//! Finds the photograph on a scanned page (dropping the white scanner bed
//! around it) and crops each image to that content plus a margin.
//!
//! # Modules
//!
//! - [`crop`] - foreground extraction and crop rectangle calculation
//! - [`batch`] - folder discovery, per-image processing and the batch tally
//! - [`config`] - TOML configuration and CLI overrides
//! - [`progress`] - console reporting
//! - [`prompt`] - interactive margin prompt

pub mod batch;
pub mod cli;
pub mod config;
pub mod crop;
pub mod logging;
pub mod progress;
pub mod prompt;

pub use batch::{
    discover_images, is_jpeg_name, process_image, BatchJob, BatchObserver, BatchOptions,
    BatchSummary, FailedImage, ImageOutcome, SilentObserver,
};
pub use cli::{Cli, Commands, CropArgs};
pub use config::{CliOverrides, Config, ConfigError};
pub use crop::{
    ContentCropper, CropError, CropOutcome, CropRect, CropRectCalculator, ForegroundExtractor,
    ForegroundMask, RegionOutline, DEFAULT_MARGIN, FOREGROUND_THRESHOLD,
};
pub use progress::{ConsoleTheme, OutputMode, Reporter};
pub use prompt::{parse_margin, prompt_margin, wait_for_enter, MarginInputError};

/// Process exit codes
pub mod exit_codes {
    /// Every image was cropped
    pub const SUCCESS: i32 = 0;
    /// Unexpected run-level error
    pub const GENERAL_ERROR: i32 = 1;
    /// Input folder missing or unreadable
    pub const INPUT_NOT_FOUND: i32 = 3;
    /// The batch ran but at least one image failed
    pub const PARTIAL_FAILURE: i32 = 4;
}
