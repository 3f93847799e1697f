//! Configuration for a stitching session.
//!
//! Front ends translate their own arguments into a [`Config`], which is
//! validated once and then drives the engine, the artifact sink and the
//! output formatter.

use anyhow::{Result, bail};

use crate::StitchError;
use crate::sink::DEFAULT_FILENAME;
use std::{path::PathBuf, str::FromStr};

/// Compression level for the merged PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    /// No compression - streams are written as loaded.
    None,
    /// Compress uncompressed streams.
    #[default]
    Standard,
    /// Compress streams and drop unreachable objects.
    Maximum,
}

impl FromStr for CompressionLevel {
    type Err = StitchError;

    /// Parse compression level from "none", "standard" or "maximum".
    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "maximum" => Ok(Self::Maximum),
            _ => Err(StitchError::invalid_config(format!(
                "Invalid compression level: {s}. Must be one of: none, standard, maximum"
            ))),
        }
    }
}

/// What to do when the artifact's target file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Pick the next free name, `merged (1).pdf`, `merged (2).pdf`, ...
    #[default]
    Rename,
    /// Replace the existing file.
    Force,
    /// Fail if the file exists.
    NoClobber,
}

/// Complete configuration for a stitching session.
#[derive(Debug, Clone)]
pub struct Config {
    /// Where the merged PDF is written.
    pub output: PathBuf,

    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,

    /// Compression level for output.
    pub compression: CompressionLevel,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// Number of files loaded concurrently (None = auto-detect).
    pub jobs: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_FILENAME),
            overwrite_mode: OverwriteMode::default(),
            compression: CompressionLevel::default(),
            quiet: false,
            verbose: false,
            jobs: None,
        }
    }
}

impl Config {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Verbose and quiet modes are both enabled
    /// - Jobs count is zero
    /// - The output is neither a directory nor a file name ending in `.pdf`
    pub fn validate(&self) -> Result<()> {
        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        if let Some(jobs) = self.jobs
            && jobs == 0
        {
            bail!("Number of jobs must be at least 1");
        }

        let is_pdf = self
            .output
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if !is_pdf && !self.output_is_directory() {
            bail!(
                "Output file must have a .pdf extension: {}",
                self.output.display()
            );
        }

        Ok(())
    }

    /// Whether `output` names a directory that receives `merged.pdf`.
    pub fn output_is_directory(&self) -> bool {
        crate::io::writer::is_directory_target(&self.output)
    }

    /// Get the effective number of concurrent loads.
    pub fn effective_jobs(&self) -> usize {
        self.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}
