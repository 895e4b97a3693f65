//! Background and per-symbol gesture handling.
//!
//! Background gestures pan or lasso depending on the mode; a background click
//! either clears the selection or opens the text entry, never both. Symbol
//! gestures drag one symbol or the whole selection and delete anything that
//! ends up outside the canvas on drop.

use tracing::debug;

use super::{EquationCanvas, InteractionMode};
use crate::geometry::{Point, Rect};
use crate::input::{InputState, Modifiers, PointerSource};
use crate::types::SymbolId;

impl EquationCanvas {
    // ------------------------------------------------------------------
    // Background
    // ------------------------------------------------------------------

    pub fn background_grab(&mut self, local: Point) {
        self.commit_text_entry();
        match self.mode {
            InteractionMode::Pan => self.input = InputState::Panning,
            InteractionMode::Lasso => self.input.start_lasso(local),
        }
        debug!(mode = ?self.mode, x = local.x, y = local.y, "Background grab");
    }

    pub fn background_drag(&mut self, total: Point, delta: Point) {
        crate::profile_scope!("background_drag");
        match self.input {
            InputState::Panning => {
                // Relative geometry is unchanged, so no notification.
                for s in self.symbols.values_mut() {
                    s.translate(delta);
                }
                self.positions_moved();
            }
            InputState::Lasso { origin, .. } => {
                if let Some(rect) = self.input.set_lasso_current(origin + total) {
                    self.select_centers_inside(&rect);
                }
            }
            _ => {}
        }
    }

    pub fn background_drop(&mut self) {
        if matches!(self.input, InputState::Panning | InputState::Lasso { .. }) {
            self.input.reset();
        }
    }

    /// Returns true if the click opened the text entry.
    pub fn background_click(&mut self, local: Point) -> bool {
        let deselected = self.deselect_all();
        if deselected > 0 {
            debug!(deselected, "Background click cleared selection");
            return false;
        }
        self.open_text_entry(local);
        true
    }

    /// Replace the selection with the symbols whose center is strictly inside.
    fn select_centers_inside(&mut self, rect: &Rect) {
        self.refresh_index();
        let hits = self.index.centers_inside(rect);
        self.deselect_all();
        for id in hits {
            if let Some(s) = self.symbols.get_mut(&id) {
                s.selected = true;
            }
        }
    }

    // ------------------------------------------------------------------
    // Symbols
    // ------------------------------------------------------------------

    pub fn symbol_grab(&mut self, id: SymbolId, source: PointerSource) {
        self.commit_text_entry();
        self.touch_locator = (source == PointerSource::Touch).then_some(id);
        self.input = InputState::DraggingSymbol { grabbed: id };
        debug!(%id, ?source, "Symbol grab");
    }

    /// Move the symbol by `delta`. An unselected symbol drags alone and clears
    /// the selection; a selected one drags the whole selection.
    pub fn symbol_drag(&mut self, id: SymbolId, delta: Point) {
        crate::profile_scope!("symbol_drag");
        let Some(grabbed) = self.symbols.get_mut(&id) else {
            debug!(%id, "Drag for missing symbol ignored");
            return;
        };
        grabbed.translate(delta);
        let was_selected = grabbed.selected;

        if was_selected {
            for (other, s) in self.symbols.iter_mut() {
                if *other != id && s.selected {
                    s.translate(delta);
                }
            }
        } else {
            self.deselect_all();
        }

        if delta.is_zero() {
            self.positions_moved();
        } else {
            self.geometry_changed();
        }
    }

    /// Delete the dragged symbol and the selection members that now lie
    /// outside the canvas.
    pub fn symbol_drop(&mut self, id: SymbolId) {
        let mut dragged = self.selected_ids();
        if !dragged.contains(&id) {
            dragged.push(id);
        }
        if self.remove_outside(&dragged) > 0 {
            self.geometry_changed();
        }

        self.touch_locator = None;
        if self.input.dragged_symbol().is_some() {
            self.input.reset();
        }
    }

    /// Modifier click toggles this symbol; a plain click solo-selects it.
    pub fn symbol_click(&mut self, id: SymbolId, modifiers: Modifiers) {
        if !self.symbols.contains_key(&id) {
            return;
        }
        if modifiers.toggles_selection() {
            if let Some(s) = self.symbols.get_mut(&id) {
                s.selected = !s.selected;
            }
        } else {
            self.deselect_all();
            if let Some(s) = self.symbols.get_mut(&id) {
                s.selected = true;
            }
        }
    }
}
