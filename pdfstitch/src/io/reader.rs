//! Loading raw file inputs from disk.
//!
//! The loader plays the part of a file picker: it reads bytes and declares a
//! content kind from the file extension. It does not parse PDFs; that is the
//! engine's job at merge time.
//!
//! # Examples
//!
//! ```no_run
//! use pdfstitch::io::InputLoader;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = InputLoader::new();
//! let paths = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
//! let results = loader.load_all(&paths, 4).await;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::candidate::{ContentKind, FileInput};
use crate::error::{Result, StitchError};

/// Reads files into [`FileInput`]s.
#[derive(Debug, Clone, Default)]
pub struct InputLoader;

impl InputLoader {
    /// Create a new loader.
    pub fn new() -> Self {
        Self
    }

    /// Load a single file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File does not exist
    /// - Path is not a regular file
    /// - File cannot be read
    pub async fn load(&self, path: &Path) -> Result<FileInput> {
        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StitchError::file_not_found(path.to_path_buf()));
            }
            Err(e) => {
                return Err(StitchError::FileNotAccessible {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };

        if !metadata.is_file() {
            return Err(StitchError::FileNotAccessible {
                path: path.to_path_buf(),
                source: std::io::Error::other("not a regular file"),
            });
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| StitchError::FileNotAccessible {
                path: path.to_path_buf(),
                source: e,
            })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        debug!(path = %path.display(), size = bytes.len(), "loaded input");

        Ok(FileInput::new(name, ContentKind::from_path(path), bytes))
    }

    /// Load files with at most `workers` reads in flight.
    ///
    /// Results come back in the same order as `paths`.
    pub async fn load_all(&self, paths: &[PathBuf], workers: usize) -> Vec<Result<FileInput>> {
        use futures::stream::{self, StreamExt};

        let workers = workers.max(1);

        let tasks = paths.iter().map(|path| {
            let loader = self.clone();
            async move { loader.load(path).await }
        });

        // `buffered` keeps input order, which becomes collection order
        stream::iter(tasks).buffered(workers).collect().await
    }
}
