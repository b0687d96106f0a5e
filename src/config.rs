//! Configuration file support
//!
//! Settings are read from TOML. Lookup order:
//!
//! 1. `--config <path>`
//! 2. `./scan-cropper.toml`
//! 3. `<config dir>/scan-cropper/config.toml`
//!
//! Command-line arguments override file values through [`CliOverrides`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::batch::{BatchOptions, DEFAULT_JPEG_QUALITY};

/// Default folder holding the scans to crop
pub const DEFAULT_INPUT_DIR: &str = "input_images";

/// Default folder receiving the cropped images
pub const DEFAULT_OUTPUT_DIR: &str = "output_images_cropped";

/// Config file name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "scan-cropper.toml";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Run configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Folder holding the scans
    pub input_dir: PathBuf,
    /// Folder receiving the crops
    pub output_dir: PathBuf,
    /// Margin in pixels; prompted for when absent in an interactive session
    pub margin: Option<u32>,
    /// JPEG encoder quality (1-100)
    pub jpeg_quality: u8,
    /// Worker threads (1 = sequential, 0 = all cores)
    pub threads: usize,
    /// Colored console output
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            margin: None,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            threads: 1,
            color: true,
        }
    }
}

impl Config {
    /// Load from an explicit path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from the first config file found in the search paths
    pub fn load() -> Result<Self> {
        match Self::search_paths().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    /// Candidate config file locations, in lookup order
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("scan-cropper").join("config.toml"));
        }
        paths
    }

    pub fn from_toml_str(text: &str) -> std::result::Result<Self, toml::de::Error> {
        let mut config: Config = toml::from_str(text)?;
        config.jpeg_quality = config.jpeg_quality.clamp(1, 100);
        Ok(config)
    }

    /// Apply command-line overrides; CLI values win
    #[must_use]
    pub fn merge_with_cli(&self, cli: &CliOverrides) -> Config {
        let mut merged = self.clone();

        if let Some(dir) = &cli.input_dir {
            merged.input_dir = dir.clone();
        }
        if let Some(dir) = &cli.output_dir {
            merged.output_dir = dir.clone();
        }
        if cli.margin.is_some() {
            merged.margin = cli.margin;
        }
        if let Some(quality) = cli.jpeg_quality {
            merged.jpeg_quality = quality.clamp(1, 100);
        }
        if let Some(threads) = cli.threads {
            merged.threads = threads;
        }
        if cli.no_color {
            merged.color = false;
        }

        merged
    }

    /// Batch options for a resolved margin
    pub fn batch_options(&self, margin: u32) -> BatchOptions {
        BatchOptions {
            margin,
            jpeg_quality: self.jpeg_quality,
            threads: self.threads,
        }
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub margin: Option<u32>,
    pub jpeg_quality: Option<u8>,
    pub threads: Option<usize>,
    pub no_color: bool,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }
}
