//! CLI argument parsing for pdfstitch.
//!
//! This module is also compiled by `build.rs` to render the man page, so it
//! only depends on `clap`, `pdfstitch` and std.

use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

use pdfstitch::config::{CompressionLevel, Config, OverwriteMode};
use pdfstitch::error::{Result, StitchError};
use pdfstitch::sink::DEFAULT_FILENAME;

/// Collect PDF files, put them in order and merge them into one.
///
/// Files are merged in the order given. Anything that is not a PDF is
/// skipped with a warning. Use --interactive to add, remove and reorder
/// files before merging.
#[derive(Parser, Debug)]
#[command(name = "pdfstitch")]
#[command(version)]
#[command(about = "Collect PDF files, put them in order and merge them into one", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Input files or glob patterns, in merge order
    ///
    /// Matches of one pattern are taken in sorted order.
    ///
    /// Examples:
    ///   pdfstitch cover.pdf "chapters/*.pdf" appendix.pdf
    ///   pdfstitch -i scans/*.pdf
    #[arg(value_name = "FILE", required_unless_present = "interactive")]
    pub inputs: Vec<String>,

    /// Where to save the merged PDF
    ///
    /// A directory receives `merged.pdf`. An existing file is kept and the
    /// new one is saved as `merged (1).pdf` unless --force or --no-clobber
    /// says otherwise.
    #[arg(short, long, value_name = "PATH", env = "PDFSTITCH_OUTPUT", default_value = DEFAULT_FILENAME)]
    pub output: PathBuf,

    /// Overwrite an existing output file
    #[arg(short, long)]
    pub force: bool,

    /// Fail instead of picking a new name when the output exists
    #[arg(long, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Compression level for output PDF
    ///
    /// - none: Write streams as loaded
    /// - standard: Compress uncompressed streams (default)
    /// - maximum: Also drop empty streams
    #[arg(short, long, value_name = "LEVEL", default_value = "standard")]
    #[arg(value_parser = ["none", "standard", "maximum"])]
    pub compression: String,

    /// Number of files read concurrently
    ///
    /// Default is the number of CPU cores.
    #[arg(short, long, value_name = "N", env = "PDFSTITCH_JOBS")]
    pub jobs: Option<usize>,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Show debug logs and merge details
    #[arg(short, long)]
    pub verbose: bool,

    /// Open a shell to edit the collection before merging
    #[arg(short, long)]
    pub interactive: bool,

    /// Print the final collection state as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Convert CLI arguments into a validated Config.
    ///
    /// # Errors
    ///
    /// Returns an error if the compression level is unknown or the
    /// resulting configuration does not validate.
    pub fn to_config(&self) -> Result<Config> {
        let compression = CompressionLevel::from_str(&self.compression)?;

        let overwrite_mode = if self.force {
            OverwriteMode::Force
        } else if self.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Rename
        };

        let config = Config {
            output: self.output.clone(),
            overwrite_mode,
            compression,
            quiet: self.quiet,
            verbose: self.verbose,
            jobs: self.jobs,
        };

        config.validate().map_err(|e| {
            StitchError::invalid_config(format!("Configuration validation failed: {e}"))
        })?;

        Ok(config)
    }

    /// Validate CLI arguments before any file is touched.
    ///
    /// # Errors
    ///
    /// Returns an error if there is nothing to do or a flag is out of range.
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() && !self.interactive {
            return Err(StitchError::invalid_config("No input files specified"));
        }

        if let Some(jobs) = self.jobs
            && jobs == 0
        {
            return Err(StitchError::invalid_config(
                "Number of jobs must be at least 1",
            ));
        }

        if self.inputs.iter().any(|input| input.trim().is_empty()) {
            return Err(StitchError::invalid_config("Empty input path"));
        }

        Ok(())
    }

    /// Filter directive for the log subscriber when `RUST_LOG` is unset.
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }
}
