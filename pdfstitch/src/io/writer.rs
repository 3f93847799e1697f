//! Artifact writing.
//!
//! [`FileSink`] saves merged artifacts to disk with:
//! - Atomic writes (write to a temp file, then rename)
//! - Overwrite handling (`Force`, `NoClobber`, browser-style `Rename`)
//! - Directory targets that take the artifact's own filename
//!
//! # Examples
//!
//! ```no_run
//! use pdfstitch::config::OverwriteMode;
//! use pdfstitch::io::FileSink;
//! use pdfstitch::sink::{Artifact, ArtifactSink};
//!
//! # async fn example(bytes: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let sink = FileSink::new("downloads/", OverwriteMode::Rename);
//! let delivery = sink.deliver(Artifact::merged_pdf(bytes)).await?;
//! println!("Saved to {}", delivery.location);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::task;
use tracing::{debug, warn};

use crate::config::{Config, OverwriteMode};
use crate::error::{Result, StitchError};
use crate::sink::{Artifact, ArtifactSink, Delivery};

/// Highest suffix tried when looking for a free file name.
const MAX_RENAME_ATTEMPTS: u32 = 9_999;

/// Options for writing artifact files.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Use atomic writes (write to temp file, then rename).
    pub atomic: bool,

    /// Buffer size for writing (in bytes).
    pub buffer_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            atomic: true,
            buffer_size: 8192,
        }
    }
}

/// Sink that writes artifacts to the local filesystem.
#[derive(Debug, Clone)]
pub struct FileSink {
    /// Output file, or a directory that receives the artifact's filename.
    target: PathBuf,
    overwrite_mode: OverwriteMode,
    options: WriteOptions,
}

impl FileSink {
    /// Create a sink writing to `target`.
    ///
    /// An existing directory, or a path ending in a separator, is treated
    /// as a directory and the artifact's filename is appended.
    pub fn new(target: impl Into<PathBuf>, overwrite_mode: OverwriteMode) -> Self {
        Self {
            target: target.into(),
            overwrite_mode,
            options: WriteOptions::default(),
        }
    }

    /// Create a sink from session configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.output.clone(), config.overwrite_mode)
    }

    /// Create a sink with custom write options.
    pub fn with_options(mut self, options: WriteOptions) -> Self {
        self.options = options;
        self
    }

    /// Work out the final path for `artifact`, applying the overwrite mode.
    pub fn resolve_path(&self, artifact: &Artifact) -> Result<PathBuf> {
        let path = if is_directory_target(&self.target) {
            self.target.join(&artifact.filename)
        } else {
            self.target.clone()
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.is_dir()
        {
            return Err(StitchError::invalid_config(format!(
                "Output directory does not exist: {}",
                parent.display()
            )));
        }

        if !path.exists() {
            return Ok(path);
        }

        match self.overwrite_mode {
            OverwriteMode::Force => Ok(path),
            OverwriteMode::NoClobber => Err(StitchError::output_exists(path)),
            OverwriteMode::Rename => next_free_path(&path),
        }
    }
}

#[async_trait]
impl ArtifactSink for FileSink {
    async fn deliver(&self, artifact: Artifact) -> Result<Delivery> {
        let path = self.resolve_path(&artifact)?;
        let options = self.options.clone();

        debug!(path = %path.display(), size = artifact.bytes.len(), "writing artifact");

        let written = path.clone();
        let size = task::spawn_blocking(move || write_file(&written, &artifact.bytes, &options))
            .await
            .map_err(|e| StitchError::unexpected(format!("Write task failed: {e}")))??;

        Ok(Delivery {
            location: path.display().to_string(),
            size,
        })
    }
}

fn write_file(path: &Path, bytes: &[u8], options: &WriteOptions) -> Result<u64> {
    let write_path = if options.atomic {
        temp_path_for(path)
    } else {
        path.to_path_buf()
    };

    let result = write_buffered(&write_path, bytes, options.buffer_size).and_then(|()| {
        if options.atomic {
            std::fs::rename(&write_path, path).map_err(|e| StitchError::FailedToWrite {
                path: path.to_path_buf(),
                source: e,
            })
        } else {
            Ok(())
        }
    });

    if let Err(err) = result {
        if options.atomic && write_path.exists() {
            if let Err(cleanup) = std::fs::remove_file(&write_path) {
                warn!(path = %write_path.display(), error = %cleanup, "failed to remove temp file");
            }
        }
        return Err(err);
    }

    Ok(bytes.len() as u64)
}

fn write_buffered(path: &Path, bytes: &[u8], buffer_size: usize) -> Result<()> {
    let to_write_error = |e| StitchError::FailedToWrite {
        path: path.to_path_buf(),
        source: e,
    };

    let file = std::fs::File::create(path).map_err(to_write_error)?;
    let mut writer = std::io::BufWriter::with_capacity(buffer_size, file);
    writer.write_all(bytes).map_err(to_write_error)?;
    writer.flush().map_err(to_write_error)?;
    Ok(())
}

/// An existing directory, or a path spelled with a trailing separator.
pub(crate) fn is_directory_target(target: &Path) -> bool {
    target.is_dir()
        || target
            .as_os_str()
            .to_string_lossy()
            .ends_with(std::path::MAIN_SEPARATOR)
}

/// `out/merged.pdf` -> `out/.merged.pdf.part`
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(".part");
    path.with_file_name(name)
}

/// First `stem (n).ext` that does not exist yet.
fn next_free_path(path: &Path) -> Result<PathBuf> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (1..=MAX_RENAME_ATTEMPTS)
        .map(|n| path.with_file_name(format!("{stem} ({n}){extension}")))
        .find(|candidate| !candidate.exists())
        .ok_or_else(|| StitchError::output_exists(path.to_path_buf()))
}
