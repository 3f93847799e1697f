//! The collection controller.
//!
//! [`Controller`] owns the ordered list of pending documents and the
//! transient UI flags around it. All mutations are synchronous and
//! serialized by one lock. The merge is the only suspension point; while it
//! runs the controller is `busy` and refuses every other mutation and any
//! second merge.
//!
//! UIs never read fields directly. They subscribe to [`ControllerEvent`]s
//! and re-render from the [`StateSnapshot`] carried by each event.
//!
//! # Examples
//!
//! ```no_run
//! use pdfstitch::candidate::FileInput;
//! use pdfstitch::controller::Controller;
//! use pdfstitch::engine::LopdfEngine;
//! use pdfstitch::sink::MemorySink;
//!
//! # async fn example(a: Vec<u8>, b: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let controller = Controller::new(LopdfEngine::new(), MemorySink::new());
//! controller.add(vec![FileInput::pdf("a.pdf", a), FileInput::pdf("b.pdf", b)])?;
//! controller.reorder(1, 0)?;
//! let receipt = controller.merge_and_export().await?;
//! println!("Merged {} documents", receipt.documents);
//! # Ok(())
//! # }
//! ```

mod gesture;
mod state;

pub use gesture::DragGuard;
pub use state::{AddReport, ControllerEvent, ExportReceipt, StateSnapshot};

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::candidate::{Candidate, FileInput};
use crate::engine::{EngineError, MergeEngine};
use crate::error::{Result, StitchError};
use crate::sink::{Artifact, ArtifactSink};
use state::SessionState;

/// Capacity of the event channel. Slow subscribers skip ahead.
const EVENT_CAPACITY: usize = 64;

/// Owns the collection and coordinates merges.
pub struct Controller {
    engine: Arc<dyn MergeEngine>,
    sink: Arc<dyn ArtifactSink>,
    state: Mutex<SessionState>,
    events: broadcast::Sender<ControllerEvent>,
}

impl Controller {
    /// Create a controller with an engine and a sink.
    pub fn new(engine: impl MergeEngine + 'static, sink: impl ArtifactSink + 'static) -> Self {
        Self::with_shared(Arc::new(engine), Arc::new(sink))
    }

    /// Create a controller from shared collaborators.
    pub fn with_shared(engine: Arc<dyn MergeEngine>, sink: Arc<dyn ArtifactSink>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            engine,
            sink,
            state: Mutex::new(SessionState::default()),
            events,
        }
    }

    /// Subscribe to state notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    /// Current state.
    pub fn snapshot(&self) -> StateSnapshot {
        self.lock().snapshot()
    }

    /// Number of pending documents.
    pub fn len(&self) -> usize {
        self.lock().candidates.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().candidates.is_empty()
    }

    /// Whether a merge is outstanding.
    pub fn is_busy(&self) -> bool {
        self.lock().busy
    }

    /// The message currently shown to the user.
    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    /// Append the PDF inputs of a batch, in the order given.
    ///
    /// Inputs not declared as PDF are dropped and leave an advisory message
    /// in the error slot; the rest of the batch is still accepted.
    pub fn add(&self, inputs: Vec<FileInput>) -> Result<AddReport> {
        self.mutate("add", |state| {
            let mut rejected = 0;
            let mut accepted = Vec::with_capacity(inputs.len());

            for input in inputs {
                match Candidate::try_from_input(input) {
                    Ok(candidate) => accepted.push(candidate),
                    Err(input) => {
                        rejected += 1;
                        warn!(name = %input.name, kind = input.content_kind.mime(), "ignoring non-PDF input");
                    }
                }
            }

            if rejected > 0 {
                state.last_error = Some(StitchError::NotAPdf { rejected }.user_message());
            }

            let report = AddReport {
                accepted: accepted.len(),
                rejected,
            };
            state.candidates.extend(accepted);

            debug!(
                accepted = report.accepted,
                rejected = report.rejected,
                count = state.candidates.len(),
                "added inputs"
            );
            report
        })
    }

    /// Remove the candidate at `index`. Out-of-range indices are ignored.
    pub fn remove(&self, index: usize) -> Result<()> {
        self.mutate("remove", |state| {
            if index >= state.candidates.len() {
                debug!(index, count = state.candidates.len(), "remove out of range");
                return;
            }

            let removed = state.candidates.remove(index);
            state.drag_source = None;
            debug!(index, name = removed.name(), "removed candidate");
        })
    }

    /// Empty the collection and the error slot.
    pub fn clear(&self) -> Result<()> {
        self.mutate("clear", |state| {
            state.candidates.clear();
            state.drag_source = None;
            debug!("cleared collection");
        })
    }

    /// Move the candidate at `from` to position `to`.
    ///
    /// Later candidates shift to close the gap, so `[A,B,C,D]` with
    /// `reorder(0, 2)` becomes `[B,C,A,D]`. Invalid or equal indices leave
    /// the order unchanged. A drag in progress keeps following the item it
    /// picked up.
    pub fn reorder(&self, from: usize, to: usize) -> Result<()> {
        self.mutate("reorder", |state| {
            if move_candidate(&mut state.candidates, from, to) {
                state.drag_source = state
                    .drag_source
                    .map(|source| shifted_index(source, from, to));
                debug!(from, to, "moved candidate");
            }
        })
    }

    /// Merge the collection in order and deliver the result.
    ///
    /// On success the collection is cleared. On failure the collection is
    /// left exactly as it was and the error slot explains why. `busy` is
    /// reset on every exit path, including a panicking engine.
    ///
    /// # Errors
    ///
    /// - [`StitchError::Busy`] if a merge is already running
    /// - [`StitchError::InsufficientInput`] with fewer than two candidates
    /// - [`StitchError::EngineFailure`] if the engine rejected the input
    /// - [`StitchError::UnexpectedFailure`] for any other fault
    /// - the sink's error if the artifact could not be delivered
    pub async fn merge_and_export(&self) -> Result<ExportReceipt> {
        let (names, documents) = self.begin_merge()?;
        let guard = BusyGuard::new(self);

        info!(documents = documents.len(), "merge started");
        let outcome = self.run_merge(&names, documents).await;

        match outcome {
            Ok(receipt) => {
                guard.release(|state| {
                    state.candidates.clear();
                    state.drag_source = None;
                    state.last_error = None;
                });
                info!(
                    documents = receipt.documents,
                    size = receipt.size,
                    location = %receipt.location,
                    "merge exported"
                );
                self.publish(ControllerEvent::Exported(receipt.clone()));
                Ok(receipt)
            }
            Err(err) => {
                let message = err.user_message();
                guard.release(|state| state.last_error = Some(message));
                warn!(error = %err, "merge failed");
                Err(err)
            }
        }
    }

    /// Check preconditions, flip to busy and snapshot the payloads.
    fn begin_merge(&self) -> Result<(Vec<String>, Vec<Arc<[u8]>>)> {
        let (result, snapshot) = {
            let mut state = self.lock();

            if state.busy {
                warn!("merge requested while another merge is running");
                return Err(StitchError::Busy);
            }

            let count = state.candidates.len();
            if count < 2 {
                let err = StitchError::InsufficientInput { count };
                state.last_error = Some(err.user_message());
                (Err(err), state.snapshot())
            } else {
                state.busy = true;
                state.last_error = None;
                let names = state
                    .candidates
                    .iter()
                    .map(|c| c.name().to_string())
                    .collect();
                let documents = state.candidates.iter().map(Candidate::bytes).collect();
                (Ok((names, documents)), state.snapshot())
            }
        };

        self.publish(ControllerEvent::StateChanged(snapshot));
        result
    }

    async fn run_merge(&self, names: &[String], documents: Vec<Arc<[u8]>>) -> Result<ExportReceipt> {
        let count = documents.len();

        let merged = AssertUnwindSafe(self.engine.merge(documents))
            .catch_unwind()
            .await
            .map_err(|panic| {
                StitchError::unexpected(format!("merge engine panicked: {}", panic_message(&panic)))
            })?
            .map_err(|err| engine_error_to_stitch(err, names))?;

        let delivery = AssertUnwindSafe(self.sink.deliver(Artifact::merged_pdf(merged)))
            .catch_unwind()
            .await
            .map_err(|panic| {
                StitchError::unexpected(format!("artifact sink panicked: {}", panic_message(&panic)))
            })??;

        Ok(ExportReceipt {
            documents: count,
            size: delivery.size,
            location: delivery.location,
        })
    }

    /// Apply a collection mutation unless a merge is running.
    ///
    /// Every mutation attempt starts by clearing the error slot.
    fn mutate<R>(&self, operation: &'static str, f: impl FnOnce(&mut SessionState) -> R) -> Result<R> {
        let (result, snapshot) = {
            let mut state = self.lock();
            if state.busy {
                warn!(operation, "rejected while a merge is running");
                return Err(StitchError::Busy);
            }

            state.last_error = None;
            let result = f(&mut state);
            (result, state.snapshot())
        };

        self.publish(ControllerEvent::StateChanged(snapshot));
        Ok(result)
    }

    /// Apply a change to presentation-only state.
    fn update<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let (result, snapshot) = {
            let mut state = self.lock();
            let result = f(&mut state);
            (result, state.snapshot())
        };

        self.publish(ControllerEvent::StateChanged(snapshot));
        result
    }

    fn publish(&self, event: ControllerEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("state", &self.snapshot())
            .finish_non_exhaustive()
    }
}

/// Holds `busy` for the duration of a merge.
///
/// Dropping the guard without [`BusyGuard::release`] (the merge future was
/// dropped, or something unwound) still resets `busy`.
struct BusyGuard<'a> {
    controller: &'a Controller,
    released: bool,
}

impl<'a> BusyGuard<'a> {
    fn new(controller: &'a Controller) -> Self {
        Self {
            controller,
            released: false,
        }
    }

    /// Apply the merge outcome and leave the busy state in one step.
    fn release(mut self, f: impl FnOnce(&mut SessionState)) {
        self.controller.update(|state| {
            f(state);
            state.busy = false;
        });
        self.released = true;
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        if !self.released {
            warn!("merge abandoned before completion");
            self.controller.update(|state| state.busy = false);
        }
    }
}

/// Remove-then-insert move. Returns whether anything moved.
fn move_candidate<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from == to || from >= items.len() || to >= items.len() {
        return false;
    }

    let item = items.remove(from);
    items.insert(to, item);
    true
}

/// Where the item at `index` ends up after moving `from` to `to`.
fn shifted_index(index: usize, from: usize, to: usize) -> usize {
    if index == from {
        to
    } else if from < index && index <= to {
        index - 1
    } else if to <= index && index < from {
        index + 1
    } else {
        index
    }
}

fn engine_error_to_stitch(err: EngineError, names: &[String]) -> StitchError {
    match err {
        EngineError::Rejected { index, reason } => {
            StitchError::engine_failure(names.get(index).cloned(), reason.to_string())
        }
        EngineError::Internal(reason) => StitchError::engine_failure(None, reason),
        EngineError::TooFewDocuments(_) => StitchError::unexpected(err.to_string()),
    }
}

fn panic_message(panic: &Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
