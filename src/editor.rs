//! The editor: canvas, palettes and recognition wired to one input stream.
//!
//! The host feeds raw page-space input to [`EquationEditor::handle_input`]. The
//! editor hit-tests its own layout, lets the gesture router turn the input into
//! per-target grab/drag/drop/click events, and applies them. Geometry changes
//! are forwarded to the recognition bridge after every call.
//!
//! ## Hit-test order (topmost first)
//!
//! 1. Open sub-palettes and their page-wide backgrounds
//! 2. Mode toggles
//! 3. Selection box handles
//! 4. The text entry box
//! 5. Symbols (newest on top)
//! 6. Palette buttons
//! 7. The canvas background

use std::collections::HashSet;
use std::time::Instant;

use tracing::{debug, info};

use crate::canvas::{EquationCanvas, InteractionMode};
use crate::geometry::Point;
use crate::input::{
    GestureEvent, GestureKind, GestureRouter, InputDisposition, Key, PointerSource, RawInput,
    TargetLocator,
};
use crate::layout::{EditorLayout, SelectionHandles};
use crate::palette::{DockedPalette, PaletteHit, SpawnRequest};
use crate::recognition::{RecognitionBridge, RecognitionView, Recognizer};
use crate::render::Scene;
use crate::settings::EditorSettings;
use crate::text_metrics::{SharedMeasurer, default_measurer};
use crate::types::SymbolId;

/// Everything in the editor that can receive gestures.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    Canvas,
    Symbol(SymbolId),
    SelectionMove,
    SelectionDelete,
    SelectionResize,
    Mode(InteractionMode),
    /// Absorbs presses on the open text entry.
    TextEntry,
    PaletteButton {
        palette: usize,
        path: Vec<usize>,
        index: usize,
    },
    SubPaletteBackground {
        palette: usize,
        path: Vec<usize>,
    },
}

impl Target {
    fn from_palette_hit(palette: usize, hit: PaletteHit) -> Self {
        match hit {
            PaletteHit::Button { path, index } => Target::PaletteButton {
                palette,
                path,
                index,
            },
            PaletteHit::SubBackground { path } => Target::SubPaletteBackground { palette, path },
        }
    }
}

/// Read-only view of the editor used by the router for hit testing.
struct EditorLocator<'a> {
    canvas: &'a EquationCanvas,
    palettes: &'a [DockedPalette],
    layout: &'a EditorLayout,
}

impl EditorLocator<'_> {
    fn selection_handles(&self) -> Option<SelectionHandles> {
        let bounds = self.canvas.selection_bounds()?;
        Some(SelectionHandles::around(
            self.layout.converter().rect_to_page(bounds),
            self.canvas.selected_count() == 1,
        ))
    }

    fn palette_hit(&self, palette: usize, hit: &PaletteHit) -> Option<Point> {
        self.palettes.get(palette)?.palette.origin_of(hit)
    }
}

impl TargetLocator<Target> for EditorLocator<'_> {
    fn hit_test(&self, page: Point) -> Option<Target> {
        for (i, docked) in self.palettes.iter().enumerate().rev() {
            if let Some(hit) = docked.palette.overlay_hit_test(page) {
                return Some(Target::from_palette_hit(i, hit));
            }
        }

        for mode in [InteractionMode::Pan, InteractionMode::Lasso] {
            if self.layout.mode_toggle(mode).contains(page) {
                return Some(Target::Mode(mode));
            }
        }

        if let Some(handles) = self.selection_handles() {
            if handles.resize_handle.is_some_and(|r| r.contains(page)) {
                return Some(Target::SelectionResize);
            }
            if handles.delete_handle.contains(page) {
                return Some(Target::SelectionDelete);
            }
            if handles.move_handle.contains(page) {
                return Some(Target::SelectionMove);
            }
        }

        let conv = self.layout.converter();
        if let Some(entry) = self.canvas.text_entry()
            && conv.rect_to_page(entry.frame()).contains(page)
        {
            return Some(Target::TextEntry);
        }

        if self.layout.canvas.contains(page)
            && let Some(id) = self.canvas.symbol_at(conv.page_to_canvas(page))
        {
            return Some(Target::Symbol(id));
        }

        for (i, docked) in self.palettes.iter().enumerate() {
            if let Some(hit) = docked.palette.hit_test(page) {
                return Some(Target::from_palette_hit(i, hit));
            }
        }

        self.layout.canvas.contains(page).then_some(Target::Canvas)
    }

    fn origin(&self, target: &Target) -> Option<Point> {
        let conv = self.layout.converter();
        match target {
            Target::Canvas => Some(self.layout.canvas.origin()),
            Target::Symbol(id) => self
                .canvas
                .symbol_bounds(*id)
                .map(|b| conv.rect_to_page(b).origin()),
            Target::SelectionMove => self.selection_handles().map(|h| h.move_handle.origin()),
            Target::SelectionDelete => self.selection_handles().map(|h| h.delete_handle.origin()),
            Target::SelectionResize => self
                .selection_handles()
                .and_then(|h| h.resize_handle)
                .map(|r| r.origin()),
            Target::Mode(mode) => Some(self.layout.mode_toggle(*mode).origin()),
            Target::TextEntry => self
                .canvas
                .text_entry()
                .map(|e| conv.rect_to_page(e.frame()).origin()),
            Target::PaletteButton {
                palette,
                path,
                index,
            } => self.palette_hit(
                *palette,
                &PaletteHit::Button {
                    path: path.clone(),
                    index: *index,
                },
            ),
            Target::SubPaletteBackground { palette, path } => {
                self.palette_hit(*palette, &PaletteHit::SubBackground { path: path.clone() })
            }
        }
    }
}

pub struct EquationEditor {
    canvas: EquationCanvas,
    palettes: Vec<DockedPalette>,
    layout: EditorLayout,
    router: GestureRouter<Target>,
    recognition: RecognitionBridge,
    button_size: f32,
}

impl EquationEditor {
    pub fn new(
        width: f32,
        height: f32,
        settings: &EditorSettings,
        measurer: SharedMeasurer,
        recognizer: Box<dyn Recognizer>,
    ) -> Self {
        let layout = EditorLayout::standard(width, height, settings.button_size);
        let canvas = EquationCanvas::new(layout.canvas.width, layout.canvas.height, measurer.clone())
            .with_default_font_size(settings.default_font_size);
        let palettes = settings
            .palettes
            .iter()
            .map(|def| def.instantiate(layout.palette_frame(def.dock), layout.page, settings.button_size))
            .collect();

        let mut editor = Self {
            canvas,
            palettes,
            layout,
            router: GestureRouter::new(settings.click_threshold),
            recognition: RecognitionBridge::new(recognizer, measurer, settings.debounce()),
            button_size: settings.button_size,
        };
        editor.sync_targets();
        info!(width, height, palettes = editor.palettes.len(), "Equation editor ready");
        editor
    }

    /// Editor with system fonts and the recognizer named in `settings`.
    pub fn from_settings(width: f32, height: f32, settings: &EditorSettings) -> Self {
        Self::new(width, height, settings, default_measurer(), settings.recognizer())
    }

    pub fn canvas(&self) -> &EquationCanvas {
        &self.canvas
    }

    /// Direct access for programmatic edits; changes are forwarded on the next
    /// [`tick`](Self::tick).
    pub fn canvas_mut(&mut self) -> &mut EquationCanvas {
        &mut self.canvas
    }

    pub fn palettes(&self) -> &[DockedPalette] {
        &self.palettes
    }

    pub fn layout(&self) -> &EditorLayout {
        &self.layout
    }

    pub fn router(&self) -> &GestureRouter<Target> {
        &self.router
    }

    pub fn recognition(&self) -> &RecognitionView {
        self.recognition.view()
    }

    pub fn recognition_bridge(&self) -> &RecognitionBridge {
        &self.recognition
    }

    /// When the host should call [`tick`](Self::tick) next, if anything waits.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.recognition.next_deadline()
    }

    /// Topmost target under a page position.
    pub fn target_at(&mut self, page: Point) -> Option<Target> {
        self.canvas.refresh_index();
        self.locator().hit_test(page)
    }

    fn locator(&self) -> EditorLocator<'_> {
        EditorLocator {
            canvas: &self.canvas,
            palettes: &self.palettes,
            layout: &self.layout,
        }
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        let layout = EditorLayout::standard(width, height, self.button_size);
        self.set_layout(layout);
    }

    pub fn set_layout(&mut self, layout: EditorLayout) {
        self.layout = layout;
        self.canvas.set_size(layout.canvas.width, layout.canvas.height);
        for docked in &mut self.palettes {
            docked
                .palette
                .set_frame(layout.palette_frame(docked.dock), layout.page);
        }
        self.sync_targets();
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    pub fn handle_input(&mut self, input: &RawInput, now: Instant) -> InputDisposition {
        crate::profile_scope!("editor_handle_input", crate::perf::FRAME_BUDGET_MS);
        self.canvas.refresh_index();
        let routed = {
            let locator = EditorLocator {
                canvas: &self.canvas,
                palettes: &self.palettes,
                layout: &self.layout,
            };
            self.router.route(input, &locator)
        };
        for event in routed.events {
            self.dispatch(event);
        }
        self.sync_targets();
        self.flush_change(now);
        InputDisposition::from_handled(routed.handled)
    }

    pub fn handle_key(&mut self, key: Key, now: Instant) -> InputDisposition {
        let handled = self.canvas.key_down(key);
        self.sync_targets();
        self.flush_change(now);
        InputDisposition::from_handled(handled)
    }

    /// Focus left the text entry.
    pub fn blur_text_entry(&mut self, now: Instant) {
        self.canvas.blur_text_entry();
        self.sync_targets();
        self.flush_change(now);
    }

    /// Advance the debounce timer and collect a finished recognition.
    pub fn tick(&mut self, now: Instant) {
        self.flush_change(now);
        if let Some(response) = self.recognition.tick(now) {
            self.canvas.apply_recognition(&response.unused_symbols);
        }
    }

    pub fn scene(&self) -> Scene {
        Scene::build(
            &self.canvas,
            &self.palettes,
            &self.layout,
            self.recognition.view(),
        )
    }

    /// Detach every gesture target and stop recognition.
    pub fn teardown(&mut self) {
        debug!(
            targets = self.router.attached_count(),
            captures = self.router.window_listener_count(),
            "Tearing down editor"
        );
        self.router.detach_all();
        self.recognition.shutdown();
    }

    fn flush_change(&mut self, now: Instant) {
        if let Some(change) = self.canvas.take_change() {
            self.recognition.notify_change(change, now);
        }
    }

    fn dispatch(&mut self, event: GestureEvent<Target>) {
        let GestureEvent {
            target,
            kind,
            source,
            modifiers,
        } = event;

        // Pressing anything but the entry itself takes focus from it.
        if matches!(kind, GestureKind::Grab { .. }) && target != Target::TextEntry {
            self.canvas.commit_text_entry();
        }

        match target {
            Target::Canvas => match kind {
                GestureKind::Grab { local, .. } => self.canvas.background_grab(local),
                GestureKind::Drag { total, delta } => self.canvas.background_drag(total, delta),
                GestureKind::Drop { .. } => self.canvas.background_drop(),
                GestureKind::Click { local, .. } => {
                    self.canvas.background_click(local);
                }
            },
            Target::Symbol(id) => match kind {
                GestureKind::Grab { .. } => self.canvas.symbol_grab(id, source),
                GestureKind::Drag { delta, .. } => self.canvas.symbol_drag(id, delta),
                GestureKind::Drop { .. } => self.canvas.symbol_drop(id),
                GestureKind::Click { .. } => self.canvas.symbol_click(id, modifiers),
            },
            Target::SelectionMove => match kind {
                GestureKind::Grab { .. } => self.canvas.selection_move_grab(),
                GestureKind::Drag { delta, .. } => self.canvas.selection_move(delta),
                GestureKind::Drop { .. } => self.canvas.selection_move_end(),
                GestureKind::Click { .. } => {}
            },
            Target::SelectionDelete => {
                if let GestureKind::Click { .. } = kind {
                    self.canvas.delete_selection();
                }
            }
            Target::SelectionResize => match kind {
                GestureKind::Grab { .. } => {
                    self.canvas.start_resize();
                }
                GestureKind::Drag { total, .. } => self.canvas.resize(total),
                GestureKind::Drop { .. } => self.canvas.end_resize(),
                GestureKind::Click { .. } => {}
            },
            Target::Mode(mode) => {
                if let GestureKind::Click { .. } = kind {
                    self.canvas.set_mode(mode);
                }
            }
            Target::TextEntry => {}
            Target::PaletteButton {
                palette,
                path,
                index,
            } => self.dispatch_palette_button(palette, &path, index, kind, source),
            Target::SubPaletteBackground { palette, path } => {
                if let (GestureKind::Click { .. }, Some(docked)) = (kind, self.palettes.get_mut(palette)) {
                    docked.palette.close_sub_at(&path);
                }
            }
        }
    }

    fn dispatch_palette_button(
        &mut self,
        palette: usize,
        path: &[usize],
        index: usize,
        kind: GestureKind,
        source: PointerSource,
    ) {
        let Some(docked) = self.palettes.get_mut(palette) else {
            return;
        };
        match kind {
            GestureKind::Grab { .. } => {
                if let Some(p) = docked.palette.descend_mut(path) {
                    p.grab_button(index, source);
                }
            }
            GestureKind::Drag { total, .. } => {
                if let Some(p) = docked.palette.descend_mut(path) {
                    p.drag_button(index, total);
                }
            }
            GestureKind::Drop { .. } => {
                if let Some(request) = docked.palette.drop_button(path, index) {
                    self.spawn(request);
                }
            }
            GestureKind::Click { .. } => {
                if let Some(p) = docked.palette.descend_mut(path) {
                    p.click_button(index);
                }
            }
        }
    }

    /// Translate a palette drop into canvas space and spawn there.
    fn spawn(&mut self, request: SpawnRequest) -> Option<SymbolId> {
        let local = self.layout.converter().page_to_canvas(request.page);
        self.canvas.spawn(local, request.spec)
    }

    /// Attach targets that appeared and detach the ones that went away.
    fn sync_targets(&mut self) {
        let mut wanted: HashSet<Target> = HashSet::new();
        wanted.insert(Target::Canvas);
        wanted.insert(Target::Mode(InteractionMode::Pan));
        wanted.insert(Target::Mode(InteractionMode::Lasso));
        wanted.extend(self.canvas.symbols().keys().map(|id| Target::Symbol(*id)));

        let selected = self.canvas.selected_count();
        if selected > 0 {
            wanted.insert(Target::SelectionMove);
            wanted.insert(Target::SelectionDelete);
        }
        if selected == 1 {
            wanted.insert(Target::SelectionResize);
        }
        if self.canvas.text_entry().is_some() {
            wanted.insert(Target::TextEntry);
        }
        for (i, docked) in self.palettes.iter().enumerate() {
            wanted.extend(
                docked
                    .palette
                    .targets()
                    .into_iter()
                    .map(|hit| Target::from_palette_hit(i, hit)),
            );
        }

        let stale: Vec<Target> = self
            .router
            .attached()
            .filter(|t| !wanted.contains(*t))
            .cloned()
            .collect();
        for target in &stale {
            self.router.detach(target);
        }
        for target in wanted {
            self.router.attach(target);
        }
    }
}

impl Drop for EquationEditor {
    fn drop(&mut self) {
        self.teardown();
    }
}
