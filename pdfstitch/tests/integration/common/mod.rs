//! Shared fixtures for the integration tests.
//!
//! PDFs are generated in memory with lopdf so no binary fixtures live in the
//! repository. Engine and sink doubles record how the controller drives them.

#![allow(dead_code)]

use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use pdfstitch::candidate::{ContentKind, FileInput};
use pdfstitch::engine::{EngineError, MergeEngine};
use pdfstitch::sink::{Artifact, ArtifactSink, Delivery};

/// Build a PDF with one page per label. Each page draws its label.
pub fn build_pdf(labels: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let kids: Vec<Object> = labels
        .iter()
        .map(|label| {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 18.into()]),
                    Operation::new("Td", vec![100.into(), 600.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*label)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            page_id.into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => labels.len() as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// Labels drawn on the pages of a PDF, in page order.
pub fn page_labels(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .into_values()
        .map(|page_id| {
            doc.get_and_decode_page_content(page_id)
                .unwrap()
                .operations
                .iter()
                .find(|op| op.operator == "Tj")
                .and_then(|op| op.operands.first())
                .and_then(|operand| operand.as_str().ok())
                .map(|raw| String::from_utf8_lossy(raw).into_owned())
                .unwrap_or_default()
        })
        .collect()
}

/// A PDF input whose pages are labelled `<name>-1`, `<name>-2`, ...
pub fn pdf_input(name: &str, pages: usize) -> FileInput {
    let labels: Vec<String> = (1..=pages).map(|n| format!("{name}-{n}")).collect();
    let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
    FileInput::pdf(format!("{name}.pdf"), build_pdf(&labels))
}

/// An input declared as something other than PDF.
pub fn non_pdf_input(name: &str, mime: &str) -> FileInput {
    FileInput::new(name, ContentKind::from_mime(mime), b"not a pdf".to_vec())
}

/// An input declared as PDF whose bytes are not a PDF.
pub fn corrupted_input(name: &str) -> FileInput {
    FileInput::pdf(name, b"%PDF-1.4\nthis is not a real document".to_vec())
}

/// Write a generated PDF into `dir` and return its path.
pub fn write_pdf(dir: &Path, name: &str, labels: &[&str]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, build_pdf(labels)).unwrap();
    path
}

/// Wraps an engine and counts merge calls.
pub struct CountingEngine<E> {
    inner: E,
    calls: AtomicUsize,
}

impl<E> CountingEngine<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<E: MergeEngine> MergeEngine for CountingEngine<E> {
    async fn merge(&self, documents: Vec<Arc<[u8]>>) -> Result<Vec<u8>, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.merge(documents).await
    }
}

/// Engine that always fails with the given error.
pub struct FailingEngine(pub EngineError);

#[async_trait]
impl MergeEngine for FailingEngine {
    async fn merge(&self, _documents: Vec<Arc<[u8]>>) -> Result<Vec<u8>, EngineError> {
        Err(self.0.clone())
    }
}

/// Engine that waits for a gate before returning fixed bytes.
pub struct GatedEngine {
    pub gate: Arc<Notify>,
    pub entered: Arc<Notify>,
    pub output: Vec<u8>,
}

impl GatedEngine {
    pub fn new(output: Vec<u8>) -> Self {
        Self {
            gate: Arc::new(Notify::new()),
            entered: Arc::new(Notify::new()),
            output,
        }
    }
}

#[async_trait]
impl MergeEngine for GatedEngine {
    async fn merge(&self, _documents: Vec<Arc<[u8]>>) -> Result<Vec<u8>, EngineError> {
        self.entered.notify_one();
        self.gate.notified().await;
        Ok(self.output.clone())
    }
}

/// Engine that panics mid-merge.
pub struct PanickingEngine;

#[async_trait]
impl MergeEngine for PanickingEngine {
    async fn merge(&self, _documents: Vec<Arc<[u8]>>) -> Result<Vec<u8>, EngineError> {
        panic!("merge engine crashed");
    }
}

/// Sink that records every artifact it is handed.
#[derive(Default)]
pub struct RecordingSink {
    delivered: Mutex<Vec<Artifact>>,
}

impl RecordingSink {
    pub fn delivered(&self) -> Vec<Artifact> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArtifactSink for RecordingSink {
    async fn deliver(&self, artifact: Artifact) -> pdfstitch::Result<Delivery> {
        let size = artifact.bytes.len() as u64;
        let location = format!("recorded:{}", artifact.filename);
        self.delivered.lock().unwrap().push(artifact);
        Ok(Delivery { location, size })
    }
}
