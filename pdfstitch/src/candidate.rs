//! Document candidates and raw file inputs.
//!
//! A [`FileInput`] is what a picker or a drop hands over: a name, the content
//! kind the platform declared for it, and its bytes. Only inputs declared as
//! PDF become [`Candidate`]s.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// MIME type a PDF input must declare.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Declared content kind of a raw input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentKind {
    /// Declared as `application/pdf`.
    Pdf,
    /// Anything else, with the declared MIME type (empty when unknown).
    Other(String),
}

impl ContentKind {
    /// Map a declared MIME type to a content kind.
    ///
    /// Only an exact `application/pdf` counts as PDF.
    pub fn from_mime(mime: &str) -> Self {
        if mime == PDF_MIME_TYPE {
            Self::Pdf
        } else {
            Self::Other(mime.to_string())
        }
    }

    /// Declare a content kind from a file extension.
    ///
    /// Mirrors how browsers fill in `File.type`: the extension decides,
    /// the contents are never sniffed.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => Self::Pdf,
            Some(ext) => Self::Other(guess_mime(ext).to_string()),
            None => Self::Other(String::new()),
        }
    }

    /// Check if this is the PDF kind.
    pub fn is_pdf(&self) -> bool {
        matches!(self, Self::Pdf)
    }

    /// MIME type string for this kind.
    pub fn mime(&self) -> &str {
        match self {
            Self::Pdf => PDF_MIME_TYPE,
            Self::Other(mime) => mime,
        }
    }
}

fn guess_mime(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}

/// A raw file as supplied by a picker selection or a drop.
#[derive(Clone)]
pub struct FileInput {
    /// Display name of the file.
    pub name: String,
    /// Content kind declared by the platform.
    pub content_kind: ContentKind,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl FileInput {
    /// Create a new input.
    pub fn new(name: impl Into<String>, content_kind: ContentKind, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_kind,
            bytes,
        }
    }

    /// Create an input declared as PDF.
    pub fn pdf(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::new(name, ContentKind::Pdf, bytes)
    }
}

impl fmt::Debug for FileInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileInput")
            .field("name", &self.name)
            .field("content_kind", &self.content_kind)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A verified PDF input waiting in the collection.
///
/// Cloning is cheap: the payload sits behind an `Arc` and is never mutated
/// after acceptance.
#[derive(Clone)]
pub struct Candidate {
    name: String,
    bytes: Arc<[u8]>,
}

impl Candidate {
    /// Accept an input if it is declared as PDF.
    ///
    /// Hands the input back unchanged when it is not.
    pub fn try_from_input(input: FileInput) -> std::result::Result<Self, FileInput> {
        if !input.content_kind.is_pdf() {
            return Err(input);
        }

        Ok(Self {
            name: input.name,
            bytes: Arc::from(input.bytes),
        })
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Byte length of the payload.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Shared handle to the payload.
    pub fn bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    /// Serializable summary without the payload.
    pub fn summary(&self) -> CandidateSummary {
        CandidateSummary {
            name: self.name.clone(),
            size: self.size(),
        }
    }
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate")
            .field("name", &self.name)
            .field("size", &self.size())
            .finish()
    }
}

/// Name and size of a candidate, as shown to a UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSummary {
    /// Display name.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
}
