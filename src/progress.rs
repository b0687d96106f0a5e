//! Console reporting for batch runs.
//!
//! Per-image progress lines, the final tally and the welcome banner. All
//! styling comes from an immutable [`ConsoleTheme`] handed to the
//! [`Reporter`] at construction.

use std::io::{self, Write};

use crate::batch::{BatchObserver, BatchSummary, ImageOutcome};

const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Width of separator rules
const RULE_WIDTH: usize = 80;

/// ANSI styling for console output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleTheme {
    enabled: bool,
}

impl Default for ConsoleTheme {
    fn default() -> Self {
        Self::colored()
    }
}

impl ConsoleTheme {
    pub fn colored() -> Self {
        Self { enabled: true }
    }

    pub fn plain() -> Self {
        Self { enabled: false }
    }

    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn paint(&self, codes: &[&str], text: &str) -> String {
        if self.enabled {
            format!("{}{}{}", codes.concat(), text, RESET)
        } else {
            text.to_string()
        }
    }

    /// Bold red
    pub fn error(&self, text: &str) -> String {
        self.paint(&[RED, BOLD], text)
    }

    pub fn success(&self, text: &str) -> String {
        self.paint(&[GREEN], text)
    }

    /// Bold yellow section heading
    pub fn heading(&self, text: &str) -> String {
        self.paint(&[YELLOW, BOLD], text)
    }

    /// Bold blue program title
    pub fn title(&self, text: &str) -> String {
        self.paint(&[BLUE, BOLD], text)
    }

    pub fn dim(&self, text: &str) -> String {
        self.paint(&[DIM], text)
    }
}

/// Output verbosity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Errors and the final summary only
    Quiet,
    /// Per-image progress lines
    #[default]
    Normal,
    /// Progress lines plus crop rectangles
    Verbose,
}

impl OutputMode {
    /// Create OutputMode from verbosity level
    pub fn from_verbosity(level: u8, quiet: bool) -> Self {
        match (quiet, level) {
            (true, _) => OutputMode::Quiet,
            (false, 0) => OutputMode::Normal,
            (false, _) => OutputMode::Verbose,
        }
    }

    /// Check if output should be shown at this mode
    pub fn should_show(&self, required: OutputMode) -> bool {
        use OutputMode::*;
        matches!(
            (self, required),
            (_, Quiet) | (Normal | Verbose, Normal) | (Verbose, Verbose)
        )
    }
}

/// Writes batch progress and summaries to a console stream
pub struct Reporter<W: Write> {
    out: W,
    theme: ConsoleTheme,
    mode: OutputMode,
}

impl Reporter<io::Stdout> {
    pub fn stdout(theme: ConsoleTheme, mode: OutputMode) -> Self {
        Self::new(io::stdout(), theme, mode)
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, theme: ConsoleTheme, mode: OutputMode) -> Self {
        Self { out, theme, mode }
    }

    pub fn theme(&self) -> ConsoleTheme {
        self.theme
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    // Console write failures are not worth aborting a batch over
    fn line(&mut self, text: &str) {
        let _ = writeln!(self.out, "{}", text);
    }

    /// Print an error message in the theme's error style
    pub fn error(&mut self, message: &str) {
        let styled = self.theme.error(message);
        self.line(&styled);
    }

    /// Program title, description and usage steps
    pub fn print_banner(&mut self, input_dir: &str, output_dir: &str) {
        if !self.mode.should_show(OutputMode::Normal) {
            return;
        }
        let t = self.theme;
        self.line(&t.title("Scanned Image Cropper"));
        self.line(&t.dim(
            "Crops scanned photos saved as jpg/jpeg to their content and saves them in a new folder.",
        ));
        self.line(&t.dim(&"=".repeat(RULE_WIDTH)));
        self.line("");
        self.line(&t.heading("Instructions"));
        self.line(&format!(
            "1. Place all the scanned images in the '{}' folder.",
            input_dir
        ));
        self.line("2. Enter the number of border pixels to keep around the content, if needed.");
        self.line(&format!(
            "3. The cropped images will be saved in the '{}' folder under their original names.",
            output_dir
        ));
        self.line("");
    }

    /// Final tally with every failed filename
    pub fn print_summary(&mut self, summary: &BatchSummary) {
        let t = self.theme;
        let rule = "=".repeat(RULE_WIDTH);

        self.line("");
        self.line(&rule);
        self.line(&t.heading("Processing Summary"));
        self.line(&rule);
        self.line(&format!("  Total images: {}", summary.total));
        self.line(&t.success(&format!("  Succeeded:    {}", summary.succeeded)));
        let failed = format!("  Failed:       {}", summary.failed_count());
        if summary.all_succeeded() {
            self.line(&failed);
        } else {
            self.line(&t.error(&failed));
            for f in &summary.failed {
                self.line(&format!("    - {} ({})", f.file_name, f.reason));
            }
        }
        self.line(&format!("  Margin:       {} px", summary.margin));
        self.line(&format!("  Elapsed:      {:.2}s", summary.elapsed_secs));
        self.line(&rule);
        let _ = self.out.flush();
    }
}

impl<W: Write> BatchObserver for Reporter<W> {
    fn on_batch_start(&mut self, total: usize) {
        if total == 0 {
            self.error("No .jpg or .jpeg images found in the input folder.");
        } else if self.mode.should_show(OutputMode::Normal) {
            self.line(&format!("Processing {} image(s)...", total));
        }
    }

    fn on_image_start(&mut self, index: usize, total: usize, file_name: &str) {
        if self.mode.should_show(OutputMode::Normal) {
            self.line(&format!("[{}/{}] {}", index, total, file_name));
        }
    }

    fn on_image_done(&mut self, _index: usize, _total: usize, outcome: &ImageOutcome) {
        match &outcome.result {
            Ok(rect) => {
                if self.mode.should_show(OutputMode::Verbose) {
                    let text = format!(
                        "  Cropped to {}x{} at ({}, {})",
                        rect.width, rect.height, rect.x, rect.y
                    );
                    self.line(&self.theme.success(&text));
                } else if self.mode.should_show(OutputMode::Normal) {
                    self.line(&self.theme.success("  Cropped and saved"));
                }
            }
            Err(e) => {
                self.error(&format!("  Could not crop {}: {}", outcome.file_name, e));
            }
        }
    }
}
