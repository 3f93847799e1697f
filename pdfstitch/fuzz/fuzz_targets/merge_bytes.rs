#![no_main]

use libfuzzer_sys::fuzz_target;
use pdfstitch::candidate::FileInput;
use pdfstitch::controller::Controller;
use pdfstitch::engine::LopdfEngine;
use pdfstitch::sink::MemorySink;
use std::sync::OnceLock;
use tokio::runtime::{Builder, Runtime};

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

fn runtime() -> &'static Runtime {
    RUNTIME.get_or_init(|| Builder::new_multi_thread().enable_all().build().unwrap())
}

fuzz_target!(|data: &[u8]| {
    let split = data.len() / 2;
    let controller = Controller::new(LopdfEngine::new(), MemorySink::new());
    controller
        .add(vec![
            FileInput::pdf("left.pdf", data[..split].to_vec()),
            FileInput::pdf("right.pdf", data[split..].to_vec()),
        ])
        .unwrap();

    let result = runtime().block_on(controller.merge_and_export());

    // Whatever the bytes, the controller settles
    assert!(!controller.is_busy());
    if result.is_err() {
        assert_eq!(controller.len(), 2);
        assert!(controller.last_error().is_some());
    } else {
        assert!(controller.is_empty());
    }
});
