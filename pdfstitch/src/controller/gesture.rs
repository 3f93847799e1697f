//! Drag-and-drop gestures.
//!
//! Two gestures feed the controller. Dragging an existing candidate onto
//! another one reorders the collection. Dragging files from outside onto
//! the drop region adds them. Both keep presentation state (`drag_source`,
//! `drop_target`) that a UI renders as highlights.

use tracing::debug;

use super::{AddReport, Controller, ControllerEvent};
use crate::candidate::FileInput;
use crate::error::{Result, StitchError};

impl Controller {
    /// Start dragging the candidate at `index`.
    ///
    /// An out-of-range index leaves no drag in progress.
    pub fn begin_drag(&self, index: usize) -> Result<()> {
        let snapshot = {
            let mut state = self.lock();
            if state.busy {
                return Err(StitchError::Busy);
            }

            state.drag_source = (index < state.candidates.len()).then_some(index);
            debug!(source = ?state.drag_source, "drag started");
            state.snapshot()
        };

        self.publish(ControllerEvent::StateChanged(snapshot));
        Ok(())
    }

    /// Abandon the drag without moving anything.
    pub fn end_drag(&self) {
        self.update(|state| state.drag_source = None);
    }

    /// Drop the dragged candidate onto position `to`.
    ///
    /// Without a drag in progress this does nothing.
    pub fn drop_on_item(&self, to: usize) -> Result<()> {
        let source = self.lock().drag_source;
        match source {
            Some(from) => {
                self.reorder(from, to)?;
                self.end_drag();
                Ok(())
            }
            None => {
                debug!(to, "drop without drag source");
                Ok(())
            }
        }
    }

    /// A drag carrying files entered the drop region.
    pub fn drag_enter_zone(&self) {
        self.update(|state| state.drop_target = true);
    }

    /// The drag left the drop region.
    pub fn drag_leave_zone(&self) {
        self.update(|state| state.drop_target = false);
    }

    /// Files were dropped on the drop region.
    pub fn drop_files(&self, inputs: Vec<FileInput>) -> Result<AddReport> {
        self.drag_leave_zone();
        self.add(inputs)
    }

    /// Start a drag that ends when the returned guard is released or dropped.
    pub fn drag_gesture(&self, index: usize) -> Result<DragGuard<'_>> {
        self.begin_drag(index)?;
        Ok(DragGuard { controller: self })
    }
}

/// An in-progress reorder drag.
///
/// Dropping the guard cancels the drag.
#[must_use = "dropping the guard cancels the drag"]
#[derive(Debug)]
pub struct DragGuard<'a> {
    controller: &'a Controller,
}

impl DragGuard<'_> {
    /// Drop the dragged candidate at position `to`.
    pub fn release(self, to: usize) -> Result<()> {
        self.controller.drop_on_item(to)
    }
}

impl Drop for DragGuard<'_> {
    fn drop(&mut self) {
        if self.controller.lock().drag_source.is_some() {
            self.controller.end_drag();
        }
    }
}
