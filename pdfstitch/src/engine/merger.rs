//! lopdf-backed merge engine.
//!
//! The first document becomes the base. Every later document is renumbered
//! past the base's highest object id and its objects are copied over. The
//! root `Pages` node of every input then becomes a kid of one new, bare
//! `Pages` node. Grafting whole trees keeps the attributes pages inherit
//! from their own ancestors (`Resources`, `MediaBox`, `Rotate`), and the
//! bare top node keeps one document's inherited attributes from leaking
//! into another's pages.

use async_trait::async_trait;
use lopdf::{Document, Object, ObjectId, dictionary};
use std::sync::Arc;
use tokio::task;

use crate::config::{CompressionLevel, Config};
use crate::engine::{EngineError, MergeEngine, RejectReason};

/// Options for the lopdf engine.
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    /// Compression applied to the merged document.
    pub compression: CompressionLevel,
}

/// Merge engine built on lopdf.
#[derive(Debug, Clone, Default)]
pub struct LopdfEngine {
    options: EngineOptions,
}

impl LopdfEngine {
    /// Create an engine with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with custom options.
    pub fn with_options(options: EngineOptions) -> Self {
        Self { options }
    }

    /// Create an engine from session configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::with_options(EngineOptions {
            compression: config.compression,
        })
    }
}

#[async_trait]
impl MergeEngine for LopdfEngine {
    async fn merge(&self, documents: Vec<Arc<[u8]>>) -> Result<Vec<u8>, EngineError> {
        if documents.len() < 2 {
            return Err(EngineError::TooFewDocuments(documents.len()));
        }

        let options = self.options.clone();

        // Parsing and serializing are CPU bound
        task::spawn_blocking(move || merge_buffers(&documents, &options))
            .await
            .map_err(|e| EngineError::Internal(format!("Merge task failed: {e}")))?
    }
}

/// Merge already validated buffers synchronously.
fn merge_buffers(documents: &[Arc<[u8]>], options: &EngineOptions) -> Result<Vec<u8>, EngineError> {
    let mut loaded = Vec::with_capacity(documents.len());
    for (index, bytes) in documents.iter().enumerate() {
        loaded.push(load_document(index, bytes)?);
    }

    let mut docs = loaded.into_iter();
    let Some(mut merged) = docs.next() else {
        return Err(EngineError::TooFewDocuments(0));
    };
    let base = root_pages_id(&merged).map_err(|reason| EngineError::Rejected { index: 0, reason })?;
    let mut trees = vec![(base, merged.get_pages().len())];

    for (offset, mut doc) in docs.enumerate() {
        let index = offset + 1;

        doc.renumber_objects_with(merged.max_id + 1);
        let subtree =
            root_pages_id(&doc).map_err(|reason| EngineError::Rejected { index, reason })?;
        trees.push((subtree, doc.get_pages().len()));

        merged.max_id = doc.max_id;
        merged.objects.extend(doc.objects);
    }

    join_page_trees(&mut merged, &trees)?;

    // Catalogs and outlines of the grafted documents are unreachable now
    merged.prune_objects();

    match options.compression {
        CompressionLevel::None => {}
        CompressionLevel::Standard => {
            merged.compress();
        }
        CompressionLevel::Maximum => {
            merged.compress();
            merged.delete_zero_length_streams();
        }
    }

    merged.renumber_objects();

    let mut buffer = Vec::new();
    merged
        .save_to(&mut buffer)
        .map_err(|e| EngineError::Internal(format!("Failed to serialize merged PDF: {e}")))?;

    Ok(buffer)
}

fn load_document(index: usize, bytes: &[u8]) -> Result<Document, EngineError> {
    let doc = Document::load_mem(bytes).map_err(|e| {
        let err_msg = e.to_string();
        let lowered = err_msg.to_lowercase();
        let reason = if lowered.contains("encrypt") || lowered.contains("password") {
            RejectReason::Encrypted
        } else {
            RejectReason::Corrupted(err_msg)
        };
        EngineError::Rejected { index, reason }
    })?;

    if doc.get_pages().is_empty() {
        return Err(EngineError::Rejected {
            index,
            reason: RejectReason::NoPages,
        });
    }

    Ok(doc)
}

fn root_pages_id(doc: &Document) -> Result<ObjectId, RejectReason> {
    doc.catalog()
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(Object::as_reference)
        .map_err(|e| RejectReason::Corrupted(format!("missing page tree: {e}")))
}

/// Hang every `(root, page_count)` tree under a new top-level `Pages` node
/// and point the catalog at it.
///
/// The new node carries no inheritable attributes, so each tree resolves
/// `Rotate`, `MediaBox`, `CropBox` and `Resources` only from its own chain.
fn join_page_trees(merged: &mut Document, trees: &[(ObjectId, usize)]) -> Result<(), EngineError> {
    let top = merged.new_object_id();

    for &(root, _) in trees {
        merged
            .get_dictionary_mut(root)
            .map_err(|e| EngineError::Internal(format!("Failed to get pages object: {e}")))?
            .set("Parent", Object::Reference(top));
    }

    let kids: Vec<Object> = trees.iter().map(|&(root, _)| Object::Reference(root)).collect();
    let count: usize = trees.iter().map(|&(_, pages)| pages).sum();
    merged.objects.insert(
        top,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count as i64,
        }),
    );

    merged
        .catalog_mut()
        .map_err(|e| EngineError::Internal(format!("Failed to get catalog: {e}")))?
        .set("Pages", Object::Reference(top));

    Ok(())
}
