//! Interactive margin prompt
//!
//! Invalid input is answered with an error message and the question is asked
//! again. An empty answer (or end of input) takes [`DEFAULT_MARGIN`].

use std::io::{self, BufRead, Write};
use thiserror::Error;

use crate::crop::DEFAULT_MARGIN;
use crate::progress::ConsoleTheme;

/// Reasons a margin answer is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarginInputError {
    #[error("The margin cannot be negative.")]
    Negative,

    #[error("Please enter a valid number.")]
    NotANumber,
}

/// Parse one answer; `Ok(None)` means the answer was empty
pub fn parse_margin(input: &str) -> Result<Option<u32>, MarginInputError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    match trimmed.parse::<i64>() {
        Ok(n) if n < 0 => Err(MarginInputError::Negative),
        Ok(n) => u32::try_from(n)
            .map(Some)
            .map_err(|_| MarginInputError::NotANumber),
        Err(_) => Err(MarginInputError::NotANumber),
    }
}

/// Ask for the margin until a valid answer is given
pub fn prompt_margin<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    theme: ConsoleTheme,
) -> io::Result<u32> {
    writeln!(
        output,
        "Would you like to keep a border around the content?\n\
         Some scanners add a border around the scanned area, so a few pixels of margin can help."
    )?;

    loop {
        write!(
            output,
            "Number of border pixels to keep around the content (default is {}): ",
            DEFAULT_MARGIN
        )?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Ok(DEFAULT_MARGIN);
        }

        match parse_margin(&line) {
            Ok(Some(margin)) => return Ok(margin),
            Ok(None) => return Ok(DEFAULT_MARGIN),
            Err(e) => writeln!(output, "{}", theme.error(&e.to_string()))?,
        }
    }
}

/// Print `message` and block until a line is read
pub fn wait_for_enter<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    message: &str,
) -> io::Result<()> {
    write!(output, "{}", message)?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(())
}
