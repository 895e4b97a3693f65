//! Selection box actions: move, delete and resize.
//!
//! Resize works from snapshots taken at grab time and is fed the cumulative
//! drag, so the result does not depend on how many intermediate frames arrive.

use std::collections::BTreeMap;

use tracing::{debug, info};

use super::EquationCanvas;
use crate::geometry::Point;
use crate::input::InputState;

impl EquationCanvas {
    pub fn selection_move_grab(&mut self) {
        self.commit_text_entry();
        self.input = InputState::MovingSelection;
    }

    pub fn selection_move(&mut self, delta: Point) {
        if self.translate_selected(delta) > 0 && !delta.is_zero() {
            self.geometry_changed();
        } else {
            self.positions_moved();
        }
    }

    /// Finish a selection move, deleting members that left the canvas.
    pub fn selection_move_end(&mut self) {
        let selected = self.selected_ids();
        self.remove_outside(&selected);
        if matches!(self.input, InputState::MovingSelection) {
            self.input.reset();
        }
        self.geometry_changed();
    }

    /// Remove every selected symbol; returns how many were removed.
    pub fn delete_selection(&mut self) -> usize {
        let selected = self.selected_ids();
        for id in &selected {
            self.remove_symbol(*id);
        }
        if !selected.is_empty() {
            info!(count = selected.len(), "Deleted selection");
            self.changed = true;
        }
        selected.len()
    }

    /// Snapshot the selection for resizing. Only a single selected symbol
    /// can be resized.
    pub fn start_resize(&mut self) -> bool {
        self.commit_text_entry();
        let snapshots: BTreeMap<_, _> = self
            .symbols
            .iter()
            .filter(|(_, s)| s.selected)
            .map(|(id, s)| (*id, s.clone()))
            .collect();
        if snapshots.len() != 1 {
            debug!(selected = snapshots.len(), "Resize needs exactly one selected symbol");
            return false;
        }
        self.input = InputState::Resizing { snapshots };
        true
    }

    /// Recompute each resized symbol from its snapshot and the total drag.
    pub fn resize(&mut self, total: Point) {
        let Some(snapshots) = self.input.resize_snapshots() else {
            return;
        };
        let mut resized = 0;
        for (id, snapshot) in snapshots {
            if let Some(live) = self.symbols.get_mut(id) {
                live.apply_resize_delta(snapshot, total.x, total.y);
                resized += 1;
            }
        }
        if resized > 0 {
            self.geometry_changed();
        }
    }

    pub fn end_resize(&mut self) {
        if self.input.is_resizing() {
            self.input.reset();
        }
    }
}
