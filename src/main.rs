//! scan-cropper - batch cropper for scanned photos
//!
//! CLI entry point

use anyhow::Context;
use clap::Parser;
use std::io::{self, IsTerminal};
use std::path::Path;
use tracing::warn;

use scan_cropper::{
    exit_codes, logging, prompt_margin, wait_for_enter, BatchJob, Cli, Commands, Config,
    ConsoleTheme, CropArgs, CropError, OutputMode, Reporter, DEFAULT_MARGIN,
};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Crop(args)) => run_crop(&args),
        Some(Commands::Info) => run_info().map(|()| exit_codes::SUCCESS),
        None => run_crop(&cli.crop),
    };

    std::process::exit(match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_codes::GENERAL_ERROR
        }
    });
}

// ============ Crop Command ============

fn run_crop(args: &CropArgs) -> anyhow::Result<i32> {
    logging::init_logging(args.verbose, args.quiet);

    let file_config = match &args.config {
        Some(path) => Config::load_from_path(path).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load config file, using defaults");
            Config::default()
        }),
        None => Config::load().unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring unreadable config file");
            Config::default()
        }),
    };
    let config = file_config.merge_with_cli(&args.overrides());

    let interactive = args.allows_prompts() && io::stdin().is_terminal();
    let theme = ConsoleTheme::new(config.color && io::stdout().is_terminal());
    let mode = OutputMode::from_verbosity(args.verbose, args.quiet);
    let mut reporter = Reporter::stdout(theme, mode);

    for dir in [&config.input_dir, &config.output_dir] {
        if let Err(e) = ensure_dir(dir) {
            reporter.error(&e.to_string());
            return Ok(exit_codes::GENERAL_ERROR);
        }
    }

    if interactive {
        reporter.print_banner(
            &config.input_dir.display().to_string(),
            &config.output_dir.display().to_string(),
        );
    }

    let margin = match config.margin {
        Some(margin) => margin,
        None if interactive => prompt_margin(&mut io::stdin().lock(), &mut io::stdout(), theme)
            .context("Failed to read the margin")?,
        None => DEFAULT_MARGIN,
    };

    if interactive {
        wait_for_enter(
            &mut io::stdin().lock(),
            &mut io::stdout(),
            "Press Enter to start processing the images...",
        )?;
    }

    let job = BatchJob::new(
        config.input_dir.clone(),
        config.output_dir.clone(),
        config.batch_options(margin),
    );

    let summary = match job.run(&mut reporter) {
        Ok(summary) => summary,
        Err(e) => {
            reporter.error(&format!(
                "Could not read input folder {}: {}",
                config.input_dir.display(),
                e
            ));
            return Ok(exit_codes::INPUT_NOT_FOUND);
        }
    };

    reporter.print_summary(&summary);

    if let Some(path) = &args.report {
        let json = summary.to_json().context("Failed to serialize the batch report")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
    }

    Ok(if summary.all_succeeded() {
        exit_codes::SUCCESS
    } else {
        exit_codes::PARTIAL_FAILURE
    })
}

/// Create `dir` if it does not exist yet
fn ensure_dir(dir: &Path) -> Result<(), CropError> {
    std::fs::create_dir_all(dir).map_err(|source| CropError::DirectorySetup {
        path: dir.to_path_buf(),
        source,
    })
}

// ============ Info Command ============

fn run_info() -> anyhow::Result<()> {
    println!("scan-cropper v{}", env!("CARGO_PKG_VERSION"));
    println!();

    println!("System Information:");
    println!("  Platform: {}", std::env::consts::OS);
    println!("  Arch: {}", std::env::consts::ARCH);
    println!("  CPUs: {}", num_cpus::get());

    println!();
    println!("Defaults:");
    let defaults = Config::default();
    println!("  Input folder:  {}", defaults.input_dir.display());
    println!("  Output folder: {}", defaults.output_dir.display());
    println!("  Margin:        {} px", DEFAULT_MARGIN);
    println!("  JPEG quality:  {}", defaults.jpeg_quality);

    println!();
    println!("Config File Locations:");
    for path in Config::search_paths() {
        let state = if path.is_file() { "found" } else { "not found" };
        println!("  {} ({})", path.display(), state);
    }

    Ok(())
}
