//! End-to-end merges through the lopdf engine and real sinks.

use std::sync::Arc;

use pdfstitch::config::{CompressionLevel, Config, OverwriteMode};
use pdfstitch::controller::{Controller, ControllerEvent};
use pdfstitch::engine::{EngineError, EngineOptions, LopdfEngine, RejectReason};
use pdfstitch::error::{INSUFFICIENT_INPUT_MESSAGE, StitchError, UNEXPECTED_FAILURE_MESSAGE};
use pdfstitch::io::{FileSink, InputLoader};
use pdfstitch::sink::{DEFAULT_FILENAME, MemorySink, PDF_MIME_TYPE};
use tempfile::TempDir;

use crate::common::{
    CountingEngine, FailingEngine, GatedEngine, PanickingEngine, RecordingSink, corrupted_input,
    page_labels, pdf_input, write_pdf,
};

#[tokio::test]
async fn test_merge_output_follows_collection_order() {
    let sink = Arc::new(MemorySink::new());
    let controller = Controller::with_shared(Arc::new(LopdfEngine::new()), sink.clone());
    controller
        .add(vec![pdf_input("a", 2), pdf_input("b", 1), pdf_input("c", 3)])
        .unwrap();
    controller.reorder(2, 0).unwrap();

    let receipt = controller.merge_and_export().await.unwrap();

    let artifacts = sink.take();
    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0].filename, DEFAULT_FILENAME);
    assert_eq!(artifacts[0].mime_type, PDF_MIME_TYPE);
    assert_eq!(receipt.documents, 3);
    assert_eq!(receipt.size, artifacts[0].bytes.len() as u64);
    assert_eq!(
        page_labels(&artifacts[0].bytes),
        vec!["c-1", "c-2", "c-3", "a-1", "a-2", "b-1"]
    );
}

#[tokio::test]
async fn test_success_clears_state_and_downloads_once() {
    let engine = Arc::new(CountingEngine::new(LopdfEngine::new()));
    let sink = Arc::new(RecordingSink::default());
    let controller = Controller::with_shared(engine.clone(), sink.clone());
    controller.add(vec![pdf_input("a", 1), pdf_input("b", 1)]).unwrap();

    controller.merge_and_export().await.unwrap();

    let snapshot = controller.snapshot();
    assert!(snapshot.candidates.is_empty());
    assert_eq!(snapshot.last_error, None);
    assert!(!snapshot.busy);
    assert_eq!(engine.calls(), 1);
    assert_eq!(sink.delivered().len(), 1);
}

#[tokio::test]
async fn test_precondition_never_reaches_engine() {
    let engine = Arc::new(CountingEngine::new(LopdfEngine::new()));
    let sink = Arc::new(RecordingSink::default());
    let controller = Controller::with_shared(engine.clone(), sink.clone());

    let empty = controller.merge_and_export().await;
    controller.add(vec![pdf_input("only", 1)]).unwrap();
    let single = controller.merge_and_export().await;

    assert!(matches!(empty, Err(StitchError::InsufficientInput { count: 0 })));
    assert!(matches!(single, Err(StitchError::InsufficientInput { count: 1 })));
    assert_eq!(engine.calls(), 0);
    assert!(sink.delivered().is_empty());
    assert_eq!(controller.len(), 1);
    assert_eq!(controller.last_error().as_deref(), Some(INSUFFICIENT_INPUT_MESSAGE));
}

#[tokio::test]
async fn test_corrupted_document_is_named_and_collection_kept() {
    let sink = Arc::new(RecordingSink::default());
    let controller = Controller::with_shared(Arc::new(LopdfEngine::new()), sink.clone());
    controller
        .add(vec![
            pdf_input("good", 1),
            corrupted_input("broken.pdf"),
            pdf_input("fine", 1),
        ])
        .unwrap();

    let result = controller.merge_and_export().await;

    assert!(matches!(
        result,
        Err(StitchError::EngineFailure { document: Some(ref name), .. }) if name == "broken.pdf"
    ));
    assert_eq!(
        controller.snapshot().names(),
        vec!["good.pdf", "broken.pdf", "fine.pdf"]
    );
    assert_eq!(
        controller.last_error().as_deref(),
        Some("Could not process \"broken.pdf\". It might be corrupted or not a valid PDF.")
    );
    assert!(!controller.is_busy());
    assert!(sink.delivered().is_empty());
}

#[tokio::test]
async fn test_failed_merge_can_be_fixed_and_retried() {
    let controller = Controller::new(LopdfEngine::new(), MemorySink::new());
    controller
        .add(vec![pdf_input("a", 1), corrupted_input("bad.pdf"), pdf_input("b", 1)])
        .unwrap();

    assert!(controller.merge_and_export().await.is_err());

    controller.remove(1).unwrap();
    assert_eq!(controller.last_error(), None);

    let receipt = controller.merge_and_export().await.unwrap();
    assert_eq!(receipt.documents, 2);
}

#[tokio::test]
async fn test_encrypted_rejection_maps_to_document() {
    let engine = FailingEngine(EngineError::Rejected {
        index: 0,
        reason: RejectReason::Encrypted,
    });
    let controller = Controller::new(engine, MemorySink::new());
    controller.add(vec![pdf_input("locked", 1), pdf_input("open", 1)]).unwrap();

    let err = controller.merge_and_export().await.unwrap_err();

    assert_eq!(
        err.user_message(),
        "Could not process \"locked.pdf\". It might be corrupted or not a valid PDF."
    );
    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
async fn test_panicking_engine_is_an_unexpected_failure() {
    let controller = Controller::new(PanickingEngine, MemorySink::new());
    controller.add(vec![pdf_input("a", 1), pdf_input("b", 1)]).unwrap();

    let result = controller.merge_and_export().await;

    assert!(matches!(result, Err(StitchError::UnexpectedFailure { .. })));
    assert_eq!(controller.last_error().as_deref(), Some(UNEXPECTED_FAILURE_MESSAGE));
    assert_eq!(controller.len(), 2);
    assert!(!controller.is_busy());
}

#[tokio::test]
async fn test_merge_is_single_flight() {
    let engine = Arc::new(CountingEngine::new(GatedEngine::new(b"%PDF-merged".to_vec())));
    let sink = Arc::new(RecordingSink::default());
    let controller = Arc::new(Controller::with_shared(engine.clone(), sink.clone()));
    controller.add(vec![pdf_input("a", 1), pdf_input("b", 1)]).unwrap();

    let mut events = controller.subscribe();
    let running = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move { controller.merge_and_export().await })
    };

    while !controller.is_busy() {
        tokio::task::yield_now().await;
    }

    let second = controller.merge_and_export().await;
    let added = controller.add(vec![pdf_input("late", 1)]);
    let moved = controller.reorder(0, 1);

    assert!(matches!(second, Err(StitchError::Busy)));
    assert!(matches!(added, Err(StitchError::Busy)));
    assert!(matches!(moved, Err(StitchError::Busy)));
    assert_eq!(controller.snapshot().names(), vec!["a.pdf", "b.pdf"]);

    engine.inner().gate.notify_one();

    let receipt = running.await.unwrap().unwrap();
    assert_eq!(receipt.size, b"%PDF-merged".len() as u64);
    assert_eq!(engine.calls(), 1);
    assert_eq!(sink.delivered().len(), 1);
    assert_eq!(sink.delivered()[0].bytes, b"%PDF-merged");

    let exported = std::iter::from_fn(|| events.try_recv().ok())
        .filter(|event| matches!(event, ControllerEvent::Exported(_)))
        .count();
    assert_eq!(exported, 1);
}

#[tokio::test]
async fn test_files_on_disk_to_merged_file() {
    let dir = TempDir::new().unwrap();
    let paths = vec![
        write_pdf(dir.path(), "one.pdf", &["1a", "1b"]),
        write_pdf(dir.path(), "two.pdf", &["2a"]),
    ];
    std::fs::write(dir.path().join("readme.txt"), b"hello").unwrap();
    let mut all = paths.clone();
    all.push(dir.path().join("readme.txt"));

    let config = Config {
        output: dir.path().join("out.pdf"),
        overwrite_mode: OverwriteMode::NoClobber,
        compression: CompressionLevel::Maximum,
        ..Config::default()
    };
    config.validate().unwrap();

    let inputs = InputLoader::new()
        .load_all(&all, config.effective_jobs())
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    let controller = Controller::new(
        LopdfEngine::from_config(&config),
        FileSink::from_config(&config),
    );
    let report = controller.add(inputs).unwrap();
    assert_eq!(report.rejected, 1);

    let receipt = controller.merge_and_export().await.unwrap();

    assert_eq!(receipt.location, config.output.display().to_string());
    let written = std::fs::read(&config.output).unwrap();
    assert_eq!(page_labels(&written), vec!["1a", "1b", "2a"]);
}

#[tokio::test]
async fn test_no_clobber_failure_keeps_collection() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("merged.pdf");
    std::fs::write(&target, b"existing").unwrap();

    let controller = Controller::new(
        LopdfEngine::with_options(EngineOptions {
            compression: CompressionLevel::None,
        }),
        FileSink::new(&target, OverwriteMode::NoClobber),
    );
    controller.add(vec![pdf_input("a", 1), pdf_input("b", 1)]).unwrap();

    let result = controller.merge_and_export().await;

    assert!(matches!(result, Err(StitchError::OutputExists { .. })));
    assert_eq!(controller.len(), 2);
    assert!(controller.last_error().is_some());
    assert_eq!(std::fs::read(&target).unwrap(), b"existing");
}

#[tokio::test]
async fn test_repeated_exports_into_directory_are_renamed() {
    let dir = TempDir::new().unwrap();
    let controller = Controller::new(
        LopdfEngine::new(),
        FileSink::new(dir.path(), OverwriteMode::Rename),
    );

    for _ in 0..2 {
        controller.add(vec![pdf_input("a", 1), pdf_input("b", 1)]).unwrap();
        controller.merge_and_export().await.unwrap();
    }

    assert!(dir.path().join("merged.pdf").exists());
    assert!(dir.path().join("merged (1).pdf").exists());
}
