//! Command-line interface definitions

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::CliOverrides;

/// Crop scanned photos to their content
#[derive(Debug, Parser)]
#[command(name = "scan-cropper", version, about, args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Arguments for the default `crop` command
    #[command(flatten)]
    pub crop: CropArgs,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Crop every .jpg/.jpeg in the input folder (default)
    Crop(CropArgs),
    /// Show version, system and config file information
    Info,
}

#[derive(Debug, Clone, Default, Args)]
pub struct CropArgs {
    /// Folder containing the scans
    #[arg(short, long, value_name = "DIR")]
    pub input: Option<PathBuf>,

    /// Folder receiving the cropped images
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Border in pixels kept around the detected content
    #[arg(short, long, value_name = "PIXELS")]
    pub margin: Option<u32>,

    /// JPEG quality of the written images (1-100)
    #[arg(long, value_name = "Q", value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,

    /// Worker threads (1 = sequential, 0 = all cores)
    #[arg(short = 'j', long, value_name = "N")]
    pub threads: Option<usize>,

    /// Config file (TOML)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write the batch summary as JSON to this path
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Skip the banner and prompts; use the default margin when none is given
    #[arg(short, long)]
    pub yes: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only print errors and the final summary
    #[arg(short, long)]
    pub quiet: bool,
}

impl CropArgs {
    /// Values that override the config file
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            input_dir: self.input.clone(),
            output_dir: self.output.clone(),
            margin: self.margin,
            jpeg_quality: self.quality,
            threads: self.threads,
            no_color: self.no_color,
        }
    }

    /// Whether prompts and the banner may be shown
    pub fn allows_prompts(&self) -> bool {
        !self.yes && !self.quiet
    }
}
