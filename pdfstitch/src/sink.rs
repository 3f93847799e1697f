//! Delivery of the merged document.
//!
//! After a successful merge the controller wraps the engine output in an
//! [`Artifact`] and hands it to an [`ArtifactSink`]. In a browser that is a
//! download; on a terminal it is a file write ([`crate::io::FileSink`]).

use async_trait::async_trait;
use std::sync::Mutex;

use crate::error::Result;

pub use crate::candidate::PDF_MIME_TYPE;

/// Filename given to every merged document.
pub const DEFAULT_FILENAME: &str = "merged.pdf";

/// A finished document ready to be saved by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Suggested file name.
    pub filename: String,
    /// MIME type of the payload.
    pub mime_type: String,
    /// Document bytes.
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// Wrap merged PDF bytes under the default filename.
    pub fn merged_pdf(bytes: Vec<u8>) -> Self {
        Self {
            filename: DEFAULT_FILENAME.to_string(),
            mime_type: PDF_MIME_TYPE.to_string(),
            bytes,
        }
    }
}

/// Where and how much a sink delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Human readable location, e.g. the written path.
    pub location: String,
    /// Number of bytes delivered.
    pub size: u64,
}

/// Receives merged artifacts.
///
/// A sink must release any temporary resource it creates before `deliver`
/// returns, whether or not delivery succeeded.
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Save or offer `artifact` to the user.
    async fn deliver(&self, artifact: Artifact) -> Result<Delivery>;
}

/// Sink that keeps artifacts in memory.
///
/// Useful for embedding front ends that render the download themselves.
#[derive(Debug, Default)]
pub struct MemorySink {
    artifacts: Mutex<Vec<Artifact>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Artifacts delivered so far, oldest first.
    pub fn artifacts(&self) -> Vec<Artifact> {
        self.artifacts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Remove and return all delivered artifacts.
    pub fn take(&self) -> Vec<Artifact> {
        std::mem::take(
            &mut *self
                .artifacts
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }
}

#[async_trait]
impl ArtifactSink for MemorySink {
    async fn deliver(&self, artifact: Artifact) -> Result<Delivery> {
        let delivery = Delivery {
            location: format!("memory:{}", artifact.filename),
            size: artifact.bytes.len() as u64,
        };
        self.artifacts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(artifact);
        Ok(delivery)
    }
}
