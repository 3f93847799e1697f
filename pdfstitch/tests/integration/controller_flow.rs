//! Collection behavior seen from a UI: adding, filtering, reordering and the
//! notifications a view renders from.

use pdfstitch::controller::{Controller, ControllerEvent};
use pdfstitch::engine::LopdfEngine;
use pdfstitch::error::NOT_A_PDF_MESSAGE;
use pdfstitch::sink::MemorySink;
use rstest::rstest;

use crate::common::{non_pdf_input, pdf_input};

fn controller() -> Controller {
    Controller::new(LopdfEngine::new(), MemorySink::new())
}

fn loaded(names: &[&str]) -> Controller {
    let controller = controller();
    controller
        .add(names.iter().map(|name| pdf_input(name, 1)).collect())
        .unwrap();
    controller
}

fn names(controller: &Controller) -> Vec<String> {
    controller
        .snapshot()
        .candidates
        .into_iter()
        .map(|c| c.name)
        .collect()
}

#[test]
fn test_add_appends_in_call_order() {
    let controller = loaded(&["a", "b"]);
    controller.add(vec![pdf_input("c", 2), pdf_input("d", 1)]).unwrap();

    assert_eq!(names(&controller), vec!["a.pdf", "b.pdf", "c.pdf", "d.pdf"]);
}

#[test]
fn test_mixed_batch_keeps_pdfs_and_warns() {
    let controller = controller();
    let report = controller
        .add(vec![
            pdf_input("a", 1),
            non_pdf_input("photo.jpg", "image/jpeg"),
            pdf_input("b", 1),
            non_pdf_input("sheet.xlsx", ""),
        ])
        .unwrap();

    assert_eq!(report.accepted, 2);
    assert_eq!(report.rejected, 2);
    assert_eq!(names(&controller), vec!["a.pdf", "b.pdf"]);
    assert_eq!(controller.last_error().as_deref(), Some(NOT_A_PDF_MESSAGE));
}

#[test]
fn test_candidate_sizes_match_payloads() {
    let input = pdf_input("sized", 3);
    let expected = input.bytes.len() as u64;

    let controller = controller();
    controller.add(vec![input]).unwrap();

    assert_eq!(controller.snapshot().total_size(), expected);
}

#[rstest]
#[case(0, 2, &["B", "C", "A", "D"])]
#[case(3, 0, &["D", "A", "B", "C"])]
#[case(1, 1, &["A", "B", "C", "D"])]
#[case(0, 3, &["B", "C", "D", "A"])]
#[case(2, 1, &["A", "C", "B", "D"])]
fn test_reorder_moves_one_item(#[case] from: usize, #[case] to: usize, #[case] expected: &[&str]) {
    let controller = loaded(&["A", "B", "C", "D"]);
    controller.reorder(from, to).unwrap();

    let expected: Vec<String> = expected.iter().map(|n| format!("{n}.pdf")).collect();
    assert_eq!(names(&controller), expected);
}

#[test]
fn test_reorder_is_a_permutation() {
    let controller = loaded(&["A", "B", "C", "D", "E"]);
    for (from, to) in [(4, 0), (1, 3), (2, 2), (0, 4), (3, 1)] {
        controller.reorder(from, to).unwrap();
    }

    let mut result = names(&controller);
    result.sort();
    assert_eq!(result, vec!["A.pdf", "B.pdf", "C.pdf", "D.pdf", "E.pdf"]);
}

#[test]
fn test_remove_then_clear() {
    let controller = loaded(&["A", "B", "C"]);

    controller.remove(1).unwrap();
    assert_eq!(names(&controller), vec!["A.pdf", "C.pdf"]);

    controller.remove(7).unwrap();
    assert_eq!(names(&controller), vec!["A.pdf", "C.pdf"]);

    controller.clear().unwrap();
    assert!(controller.is_empty());
}

#[test]
fn test_drag_gesture_reorders_like_reorder() {
    let dragged = loaded(&["A", "B", "C", "D"]);
    let moved = loaded(&["A", "B", "C", "D"]);

    dragged.drag_gesture(3).unwrap().release(0).unwrap();
    moved.reorder(3, 0).unwrap();

    assert_eq!(names(&dragged), names(&moved));
    assert_eq!(dragged.snapshot().drag_source, None);
}

#[test]
fn test_file_drop_flow() {
    let controller = controller();

    controller.drag_enter_zone();
    assert!(controller.snapshot().drop_target);

    controller
        .drop_files(vec![pdf_input("x", 1), pdf_input("y", 1)])
        .unwrap();

    let snapshot = controller.snapshot();
    assert!(!snapshot.drop_target);
    assert_eq!(snapshot.names(), vec!["x.pdf", "y.pdf"]);
}

#[test]
fn test_subscribers_see_every_change() {
    let controller = controller();
    let mut events = controller.subscribe();

    controller.add(vec![pdf_input("a", 1)]).unwrap();
    controller.add(vec![non_pdf_input("b.txt", "text/plain")]).unwrap();
    controller.clear().unwrap();

    let snapshots: Vec<_> = std::iter::from_fn(|| events.try_recv().ok())
        .map(|event| match event {
            ControllerEvent::StateChanged(snapshot) => snapshot,
            ControllerEvent::Exported(_) => panic!("nothing was exported"),
        })
        .collect();

    assert_eq!(snapshots.len(), 3);
    assert_eq!(snapshots[0].names(), vec!["a.pdf"]);
    assert_eq!(snapshots[1].last_error.as_deref(), Some(NOT_A_PDF_MESSAGE));
    assert!(snapshots[2].candidates.is_empty());
    assert_eq!(snapshots[2].last_error, None);
}

#[test]
fn test_snapshot_json_has_no_payload() {
    let controller = loaded(&["a"]);
    let json = serde_json::to_value(controller.snapshot()).unwrap();

    assert_eq!(json["candidates"][0]["name"], "a.pdf");
    assert!(json["candidates"][0].get("bytes").is_none());
    assert_eq!(json["busy"], false);
}
