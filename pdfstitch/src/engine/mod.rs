//! Document merge engines.
//!
//! An engine turns an ordered list of PDF byte buffers into one PDF byte
//! buffer. Pages of the output follow the input order, and each document
//! keeps its own page order. Engines never mutate or retain the buffers they
//! are given and produce identical output for identical input.
//!
//! # Examples
//!
//! ```no_run
//! use pdfstitch::engine::{LopdfEngine, MergeEngine};
//! use std::sync::Arc;
//!
//! # async fn example(a: Vec<u8>, b: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let engine = LopdfEngine::new();
//! let merged = engine.merge(vec![Arc::from(a), Arc::from(b)]).await?;
//! println!("Merged document is {} bytes", merged.len());
//! # Ok(())
//! # }
//! ```

pub mod merger;

pub use merger::{EngineOptions, LopdfEngine};

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Why an engine refused one input document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// The bytes do not parse as a PDF.
    Corrupted(String),
    /// The document is encrypted.
    Encrypted,
    /// The document parses but has no pages.
    NoPages,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Corrupted(details) => write!(f, "corrupted or unsupported structure: {details}"),
            Self::Encrypted => write!(f, "document is encrypted"),
            Self::NoPages => write!(f, "document has no pages"),
        }
    }
}

/// Failure reported by a merge engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The input at `index` could not be processed.
    #[error("document #{index} rejected: {reason}")]
    Rejected {
        /// Zero-based position of the document in the input.
        index: usize,
        /// What was wrong with it.
        reason: RejectReason,
    },

    /// Fewer than two documents were supplied.
    #[error("at least two documents are required, got {0}")]
    TooFewDocuments(usize),

    /// The inputs were fine but assembling or serializing the output failed.
    #[error("{0}")]
    Internal(String),
}

/// An engine that merges ordered PDF byte buffers into one document.
#[async_trait]
pub trait MergeEngine: Send + Sync {
    /// Merge `documents` in order.
    ///
    /// Implementations must fail with [`EngineError::TooFewDocuments`] when
    /// given fewer than two buffers.
    async fn merge(&self, documents: Vec<Arc<[u8]>>) -> Result<Vec<u8>, EngineError>;
}

#[async_trait]
impl<E: MergeEngine + ?Sized> MergeEngine for Arc<E> {
    async fn merge(&self, documents: Vec<Arc<[u8]>>) -> Result<Vec<u8>, EngineError> {
        (**self).merge(documents).await
    }
}
