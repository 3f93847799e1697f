//! Error types for pdfstitch.
//!
//! Every failure the collection controller can observe is a variant of
//! [`StitchError`]. Merge failures are tagged so callers can tell an
//! undersized collection from a rejected document without string matching.
//!
//! # Error Categories
//!
//! - **Advisory**: some inputs were dropped, the rest were accepted
//! - **Merge**: not enough input, engine rejected a document, unexpected fault
//! - **State**: the controller is busy merging
//! - **I/O and configuration**: loading inputs and writing the artifact

use std::io;
use std::path::PathBuf;

/// Result type alias for pdfstitch operations.
pub type Result<T> = std::result::Result<T, StitchError>;

/// Message shown when a batch contained non-PDF files.
pub const NOT_A_PDF_MESSAGE: &str = "Some files were not PDFs and have been ignored.";

/// Message shown when a merge is requested with fewer than two documents.
pub const INSUFFICIENT_INPUT_MESSAGE: &str = "You need at least two PDF files to merge.";

/// Message shown when a merge fails for a reason not tied to one document.
pub const UNEXPECTED_FAILURE_MESSAGE: &str = "An unexpected error occurred during merging.";

/// Main error type for pdfstitch operations.
#[derive(Debug, thiserror::Error)]
pub enum StitchError {
    /// Some inputs of an `add` batch were not PDFs and were dropped.
    #[error("{rejected} file(s) were not PDFs and have been ignored")]
    NotAPdf {
        /// Number of dropped inputs.
        rejected: usize,
    },

    /// A merge was requested with fewer than two candidates.
    #[error("At least two PDF files are required to merge, found {count}")]
    InsufficientInput {
        /// Number of candidates in the collection at the time of the request.
        count: usize,
    },

    /// The merge engine rejected the input.
    #[error("Merge engine failure{}: {reason}", .document.as_ref().map(|d| format!(" on \"{d}\"")).unwrap_or_default())]
    EngineFailure {
        /// Display name of the rejected document, when it can be determined.
        document: Option<String>,
        /// Why the engine gave up.
        reason: String,
    },

    /// Any other fault raised while merging or delivering the artifact.
    #[error("Unexpected failure during merge: {detail}")]
    UnexpectedFailure {
        /// Description of the fault.
        detail: String,
    },

    /// The controller is merging and does not accept this operation.
    #[error("A merge is already in progress")]
    Busy,

    /// Input file was not found.
    #[error("File not found: {}", .path.display())]
    FileNotFound {
        /// Path to the file that was not found.
        path: PathBuf,
    },

    /// Input file exists but could not be read.
    #[error("Cannot access file: {}\n  Reason: {source}", .path.display())]
    FileNotAccessible {
        /// Path to the inaccessible file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  Use --force to overwrite or choose a different output path",
        .path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Failed to write the merged artifact.
    #[error("Failed to write to output file: {}\n  Reason: {source}", .path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },
}

impl From<anyhow::Error> for StitchError {
    fn from(err: anyhow::Error) -> Self {
        Self::invalid_config(err.to_string())
    }
}

impl StitchError {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create an EngineFailure error.
    pub fn engine_failure(document: Option<String>, reason: impl Into<String>) -> Self {
        Self::EngineFailure {
            document,
            reason: reason.into(),
        }
    }

    /// Create an UnexpectedFailure error.
    pub fn unexpected(detail: impl Into<String>) -> Self {
        Self::UnexpectedFailure {
            detail: detail.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// The message placed in the controller's error slot for this failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotAPdf { .. } => NOT_A_PDF_MESSAGE.to_string(),
            Self::InsufficientInput { .. } => INSUFFICIENT_INPUT_MESSAGE.to_string(),
            Self::EngineFailure {
                document: Some(name),
                ..
            } => format!("Could not process \"{name}\". It might be corrupted or not a valid PDF."),
            Self::EngineFailure { document: None, .. } | Self::UnexpectedFailure { .. } => {
                UNEXPECTED_FAILURE_MESSAGE.to_string()
            }
            other => other.to_string(),
        }
    }

    /// Check if this error is informational only.
    ///
    /// Advisory errors never block the operation that raised them.
    pub fn is_advisory(&self) -> bool {
        matches!(self, Self::NotAPdf { .. })
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotAPdf { .. } => 0,
            Self::InsufficientInput { .. } => 1,
            Self::InvalidConfig { .. } => 1,
            Self::FileNotFound { .. } => 2,
            Self::FileNotAccessible { .. } => 2,
            Self::EngineFailure { .. } => 3,
            Self::OutputExists { .. } => 4,
            Self::FailedToWrite { .. } => 5,
            Self::Io { .. } => 5,
            Self::UnexpectedFailure { .. } => 6,
            Self::Busy => 75, // EX_TEMPFAIL
        }
    }
}
