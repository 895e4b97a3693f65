//! Canvas state machine.
//!
//! [`EquationCanvas`] exclusively owns the symbol mapping. Every mutation goes
//! through one of its entry points, which are grouped by the gesture stream
//! that drives them:
//!
//! - `gestures` - background and per-symbol grab/drag/drop/click
//! - `selection` - selection box move, delete and resize
//! - `text_entry` - the in-canvas text affordance
//!
//! All coordinates are canvas-local. Mutations that change the relative
//! geometry of the symbols raise a pending change that the owner collects with
//! [`EquationCanvas::take_change`]; pure pans and selection changes do not.

mod gestures;
mod selection;
mod text_entry;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::constants::DEFAULT_FONT_SIZE;
use crate::geometry::{Point, Rect};
use crate::input::{InputState, Key};
use crate::spatial_index::{SpatialEntry, SpatialIndex};
use crate::text_metrics::SharedMeasurer;
use crate::types::{Symbol, SymbolId, SymbolIdGenerator, SymbolSpec};

pub use text_entry::{TextAlign, TextEntry};

/// Symbols keyed by id; iteration order is creation order.
pub type SymbolMap = BTreeMap<SymbolId, Symbol>;

/// What a background drag does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    Pan,
    #[default]
    Lasso,
}

/// Raised after a mutation that changed relative geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeNotification {
    pub symbols: SymbolMap,
}

pub struct EquationCanvas {
    symbols: SymbolMap,
    ids: SymbolIdGenerator,
    mode: InteractionMode,
    input: InputState,
    text_entry: Option<TextEntry>,
    /// Symbol freshly grabbed by touch; shows a crosshair.
    touch_locator: Option<SymbolId>,
    width: f32,
    height: f32,
    default_font_size: f32,
    measurer: SharedMeasurer,
    changed: bool,
    index: SpatialIndex,
    index_dirty: bool,
}

impl EquationCanvas {
    pub fn new(width: f32, height: f32, measurer: SharedMeasurer) -> Self {
        Self {
            symbols: SymbolMap::new(),
            ids: SymbolIdGenerator::new(),
            mode: InteractionMode::default(),
            input: InputState::default(),
            text_entry: None,
            touch_locator: None,
            width,
            height,
            default_font_size: DEFAULT_FONT_SIZE,
            measurer,
            changed: false,
            index: SpatialIndex::new(),
            index_dirty: false,
        }
    }

    pub fn with_default_font_size(mut self, font_size: f32) -> Self {
        self.default_font_size = font_size;
        self
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn symbols(&self) -> &SymbolMap {
        &self.symbols
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(&id)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn input_state(&self) -> &InputState {
        &self.input
    }

    pub fn text_entry(&self) -> Option<&TextEntry> {
        self.text_entry.as_ref()
    }

    pub fn touch_locator(&self) -> Option<SymbolId> {
        self.touch_locator
    }

    pub fn default_font_size(&self) -> f32 {
        self.default_font_size
    }

    pub fn measurer(&self) -> &SharedMeasurer {
        &self.measurer
    }

    /// The canvas rectangle in its own coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    pub fn symbol_bounds(&self, id: SymbolId) -> Option<Rect> {
        self.symbols.get(&id).map(|s| s.bounds(self.measurer.as_ref()))
    }

    pub fn selected_ids(&self) -> Vec<SymbolId> {
        self.symbols
            .iter()
            .filter(|(_, s)| s.selected)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.symbols.values().filter(|s| s.selected).count()
    }

    /// Union of the bounds of every selected symbol. Derived, never stored.
    pub fn selection_bounds(&self) -> Option<Rect> {
        self.symbols
            .values()
            .filter(|s| s.selected)
            .map(|s| s.bounds(self.measurer.as_ref()))
            .reduce(|acc, b| acc.union(&b))
    }

    /// Topmost symbol under `p`. Call [`refresh_index`](Self::refresh_index)
    /// after mutations for the indexed path.
    pub fn symbol_at(&self, p: Point) -> Option<SymbolId> {
        if self.index_dirty {
            return self
                .symbols
                .iter()
                .rev()
                .find(|(_, s)| s.hit_rect(self.measurer.as_ref()).contains(p))
                .map(|(id, _)| *id);
        }
        self.index.topmost_at(p)
    }

    pub fn refresh_index(&mut self) {
        if !self.index_dirty {
            return;
        }
        crate::profile_scope!("canvas_refresh_index");
        let measurer = self.measurer.as_ref();
        self.index.rebuild(
            self.symbols
                .iter()
                .map(|(id, s)| SpatialEntry::new(*id, s.hit_rect(measurer), s.center())),
        );
        self.index_dirty = false;
    }

    // ------------------------------------------------------------------
    // Mutations shared by every gesture stream
    // ------------------------------------------------------------------

    pub fn set_size(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    pub fn set_mode(&mut self, mode: InteractionMode) {
        if self.mode != mode {
            debug!(?mode, "Interaction mode changed");
            self.mode = mode;
        }
    }

    /// Insert a symbol centered at (`x`, `y`) and notify.
    pub fn add_symbol(&mut self, x: f32, y: f32, spec: SymbolSpec) -> SymbolId {
        let id = self.ids.next_id();
        debug!(%id, ?spec, x, y, "Adding symbol");
        self.symbols.insert(id, Symbol::new(x, y, spec));
        self.changed = true;
        self.index_insert(id);
        id
    }

    /// Spawn from a palette drop. Rejected unless `at` lies strictly inside
    /// the canvas.
    pub fn spawn(&mut self, at: Point, spec: SymbolSpec) -> Option<SymbolId> {
        if !self.bounds().contains_strictly(at) {
            debug!(x = at.x, y = at.y, "Spawn rejected outside canvas");
            return None;
        }
        Some(self.add_symbol(at.x, at.y, spec))
    }

    /// Clear the selection; returns how many symbols were deselected.
    pub fn deselect_all(&mut self) -> usize {
        let mut deselected = 0;
        for s in self.symbols.values_mut().filter(|s| s.selected) {
            s.selected = false;
            deselected += 1;
        }
        deselected
    }

    /// Mark which symbols the last recognition left out. Geometry is untouched.
    pub fn apply_recognition(&mut self, unused: &[SymbolId]) {
        for (id, s) in self.symbols.iter_mut() {
            s.unused = unused.contains(id);
        }
    }

    /// Handle a key while the canvas has focus. Returns whether it was used.
    pub fn key_down(&mut self, key: Key) -> bool {
        if self.text_entry.is_some() {
            match key {
                Key::Enter => {
                    self.commit_text_entry();
                }
                Key::Escape => self.cancel_text_entry(),
                Key::Backspace => self.text_entry_pop(),
                Key::Char(c) => self.text_entry_push(c),
                Key::Delete => return false,
            }
            return true;
        }

        match key {
            Key::Delete => {
                self.delete_selection();
                true
            }
            _ => false,
        }
    }

    /// The pending change notification, if any mutation raised one.
    pub fn take_change(&mut self) -> Option<ChangeNotification> {
        if !std::mem::take(&mut self.changed) {
            return None;
        }
        Some(ChangeNotification {
            symbols: self.symbols.clone(),
        })
    }

    pub fn has_pending_change(&self) -> bool {
        self.changed
    }

    fn geometry_changed(&mut self) {
        self.changed = true;
        self.index_dirty = true;
    }

    /// Position moved without changing relative geometry.
    fn positions_moved(&mut self) {
        self.index_dirty = true;
    }

    /// Keep a clean index in step with a new symbol; a dirty one is rebuilt
    /// wholesale later anyway.
    fn index_insert(&mut self, id: SymbolId) {
        if self.index_dirty {
            return;
        }
        if let Some(s) = self.symbols.get(&id) {
            let entry = SpatialEntry::new(id, s.hit_rect(self.measurer.as_ref()), s.center());
            self.index.insert(entry);
        }
    }

    fn remove_symbol(&mut self, id: SymbolId) -> bool {
        self.index.remove(id);
        self.symbols.remove(&id).is_some()
    }

    fn translate_selected(&mut self, by: Point) -> usize {
        let mut moved = 0;
        for s in self.symbols.values_mut().filter(|s| s.selected) {
            s.translate(by);
            moved += 1;
        }
        moved
    }

    /// Delete every listed symbol whose center is outside the canvas.
    fn remove_outside(&mut self, ids: &[SymbolId]) -> usize {
        let bounds = self.bounds();
        let mut removed = 0;
        for id in ids {
            let outside = self
                .symbols
                .get(id)
                .is_some_and(|s| !bounds.contains(s.center()));
            if outside && self.remove_symbol(*id) {
                info!(%id, "Symbol dropped outside canvas; deleted");
                removed += 1;
            }
        }
        if removed > 0 {
            self.changed = true;
        }
        removed
    }
}
