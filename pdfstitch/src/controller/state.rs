//! Session state owned by the controller and the views it publishes.

use serde::{Deserialize, Serialize};

use crate::candidate::{Candidate, CandidateSummary};

/// Mutable state of one session. Only the controller touches it.
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    /// Pending documents in merge order.
    pub(crate) candidates: Vec<Candidate>,
    /// True exactly while a merge is outstanding.
    pub(crate) busy: bool,
    /// Index of the candidate being dragged for reorder.
    pub(crate) drag_source: Option<usize>,
    /// True while a drag carrying files hovers over the drop region.
    pub(crate) drop_target: bool,
    /// Most recent user-facing error.
    pub(crate) last_error: Option<String>,
}

impl SessionState {
    pub(crate) fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            candidates: self.candidates.iter().map(Candidate::summary).collect(),
            busy: self.busy,
            drag_source: self.drag_source,
            drop_target: self.drop_target,
            last_error: self.last_error.clone(),
        }
    }
}

/// Read-only copy of the session state, as rendered by a UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    /// Pending documents in merge order.
    pub candidates: Vec<CandidateSummary>,
    /// Whether a merge is running.
    pub busy: bool,
    /// Index of the candidate being dragged, if any.
    pub drag_source: Option<usize>,
    /// Whether the drop region should be highlighted.
    pub drop_target: bool,
    /// Message to show the user, if any.
    pub last_error: Option<String>,
}

impl StateSnapshot {
    /// Candidate names in order.
    pub fn names(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.name.as_str()).collect()
    }

    /// Combined size of all candidates in bytes.
    pub fn total_size(&self) -> u64 {
        self.candidates.iter().map(|c| c.size).sum()
    }
}

/// Outcome of an `add` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddReport {
    /// Inputs appended to the collection.
    pub accepted: usize,
    /// Inputs dropped because they were not declared as PDF.
    pub rejected: usize,
}

/// Result of a successful merge and export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReceipt {
    /// Number of documents that went into the merge.
    pub documents: usize,
    /// Size of the merged document in bytes.
    pub size: u64,
    /// Where the sink put it.
    pub location: String,
}

/// Notification published by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    /// The session state changed; re-render from the snapshot.
    StateChanged(StateSnapshot),
    /// A merged document was delivered.
    Exported(ExportReceipt),
}
