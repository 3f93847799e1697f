//! File I/O for pdfstitch.
//!
//! This module covers the filesystem edges of a session:
//! - Expanding picker patterns into paths
//! - Loading raw file inputs
//! - Writing merged artifacts
//!
//! # Examples
//!
//! ```no_run
//! use pdfstitch::io::{InputLoader, expand_patterns};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let paths = expand_patterns(["chapters/*.pdf"])?;
//! let inputs = InputLoader::new().load_all(&paths, 4).await;
//! # Ok(())
//! # }
//! ```

pub mod reader;
pub mod writer;

pub use reader::InputLoader;
pub use writer::{FileSink, WriteOptions};

use crate::error::{Result, StitchError};
use std::path::PathBuf;

/// Expand glob patterns into filesystem paths.
///
/// Matches of one pattern are sorted, patterns keep their given order.
/// A pattern that matches nothing is passed through as a literal path, so a
/// mistyped name surfaces later as "file not found" rather than vanishing.
///
/// # Errors
///
/// Returns an error if a pattern is malformed or a match cannot be read.
pub fn expand_patterns<T>(patterns: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut resolved_paths = Vec::new();

    for pattern in patterns {
        let pattern = pattern.as_ref();
        let paths = glob::glob(pattern).map_err(|err| {
            StitchError::invalid_config(format!("Invalid pattern '{pattern}': {err}"))
        })?;

        let mut matched = Vec::new();
        for entry in paths {
            let path = entry.map_err(|err| StitchError::FileNotAccessible {
                path: err.path().to_path_buf(),
                source: std::io::Error::new(err.error().kind(), err.to_string()),
            })?;
            matched.push(path);
        }

        if matched.is_empty() {
            resolved_paths.push(PathBuf::from(pattern));
        } else {
            resolved_paths.extend(matched);
        }
    }

    Ok(resolved_paths)
}
