//! Render model.
//!
//! [`Scene`] is a plain snapshot of everything a host needs to paint one
//! frame, in page coordinates. Text symbols carry their spec so the host can
//! draw the glyph with its own text stack; lines and containers come with a
//! ready-made stroke path relative to their bounds.
//!
//! ## Performance Notes
//!
//! Built once per frame. Symbols entirely outside the canvas are culled.
//! Enable profiling with `cargo build --features profiling` to see timing.

use crate::canvas::{EquationCanvas, InteractionMode, TextAlign};
use crate::geometry::{Point, Rect};
use crate::layout::{EditorLayout, SelectionHandles};
use crate::palette::{DockedPalette, Orientation, Palette};
use crate::recognition::RecognitionView;
use crate::symbol::StrokePath;
use crate::types::{SymbolId, SymbolSpec};

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub page: Rect,
    pub canvas: Rect,
    pub symbols: Vec<SymbolView>,
    pub lasso: Option<Rect>,
    pub selection: Option<SelectionHandles>,
    pub text_entry: Option<TextEntryView>,
    pub mode_toggles: Vec<ModeToggleView>,
    pub palettes: Vec<PaletteView>,
    pub equation: EquationView,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolView {
    pub id: SymbolId,
    pub bounds: Rect,
    pub spec: SymbolSpec,
    pub selected: bool,
    pub unused: bool,
    /// Crosshair shown while a touch drags this symbol.
    pub locator: bool,
    pub stroke: Option<StrokePath>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextEntryView {
    pub frame: Rect,
    pub value: String,
    pub font_size: f32,
    pub align: TextAlign,
    pub padding_left: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeToggleView {
    pub mode: InteractionMode,
    pub frame: Rect,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ButtonView {
    pub frame: Rect,
    pub spec: SymbolSpec,
    pub opens_sub_menu: bool,
    /// The button's prototype is currently carried as a ghost.
    pub dragging: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GhostView {
    pub center: Point,
    pub spec: SymbolSpec,
    pub locator: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubPaletteView {
    pub background: Rect,
    pub palette: PaletteView,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaletteView {
    pub name: String,
    pub frame: Rect,
    pub orientation: Orientation,
    pub scroll: f32,
    /// Buttons intersecting the viewport; the host clips to `frame`.
    pub buttons: Vec<ButtonView>,
    pub ghost: Option<GhostView>,
    pub sub: Option<Box<SubPaletteView>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EquationView {
    pub frame: Rect,
    pub mathml: String,
    pub loading: bool,
}

impl Scene {
    pub fn build(
        canvas: &EquationCanvas,
        palettes: &[DockedPalette],
        layout: &EditorLayout,
        recognition: &RecognitionView,
    ) -> Self {
        crate::profile_scope!("build_scene");
        let conv = layout.converter();

        let selection = canvas.selection_bounds().map(|bounds| {
            SelectionHandles::around(conv.rect_to_page(bounds), canvas.selected_count() == 1)
        });

        let text_entry = canvas.text_entry().map(|entry| TextEntryView {
            frame: conv.rect_to_page(entry.frame()),
            value: entry.value().to_string(),
            font_size: entry.font_size(),
            align: entry.align(),
            padding_left: entry.padding_left(),
        });

        let mode_toggles = [InteractionMode::Pan, InteractionMode::Lasso]
            .into_iter()
            .map(|mode| ModeToggleView {
                mode,
                frame: layout.mode_toggle(mode),
                active: canvas.mode() == mode,
            })
            .collect();

        Self {
            page: layout.page,
            canvas: layout.canvas,
            symbols: render_symbols(canvas, layout),
            lasso: canvas.input_state().lasso_rect().map(|r| conv.rect_to_page(r)),
            selection,
            text_entry,
            mode_toggles,
            palettes: palettes
                .iter()
                .map(|docked| render_palette(&docked.name, &docked.palette))
                .collect(),
            equation: EquationView {
                frame: layout.equation_panel,
                mathml: recognition.mathml.clone(),
                loading: recognition.loading,
            },
        }
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&SymbolView> {
        self.symbols.iter().find(|s| s.id == id)
    }
}

fn render_symbols(canvas: &EquationCanvas, layout: &EditorLayout) -> Vec<SymbolView> {
    crate::profile_scope!("render_symbols");
    let conv = layout.converter();
    let local = canvas.bounds();
    let measurer = canvas.measurer().as_ref();
    let locator = canvas.touch_locator();

    let mut views = Vec::with_capacity(canvas.len());
    for (id, symbol) in canvas.symbols() {
        let bounds = symbol.bounds(measurer);
        // Culling: nothing of it is visible.
        if bounds.right() < local.left
            || bounds.left > local.right()
            || bounds.bottom() < local.top
            || bounds.top > local.bottom()
        {
            continue;
        }
        views.push(SymbolView {
            id: *id,
            bounds: conv.rect_to_page(bounds),
            spec: symbol.spec().clone(),
            selected: symbol.is_selected(),
            unused: symbol.is_unused(),
            locator: locator == Some(*id),
            stroke: symbol.stroke_path(),
        });
    }
    views
}

fn render_palette(name: &str, palette: &Palette) -> PaletteView {
    let frame = palette.frame();
    let dragging = palette.dragging_index();
    let buttons = palette
        .entries()
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| {
            let rect = palette.button_rect(i);
            let visible = rect.right() > frame.left
                && rect.left < frame.right()
                && rect.bottom() > frame.top
                && rect.top < frame.bottom();
            visible.then(|| ButtonView {
                frame: rect,
                spec: entry.spec.clone(),
                opens_sub_menu: entry.opens_sub_menu(),
                dragging: dragging == Some(i),
            })
        })
        .collect();

    PaletteView {
        name: name.to_string(),
        frame,
        orientation: palette.orientation(),
        scroll: palette.scroll(),
        buttons,
        ghost: palette.ghost().map(|g| GhostView {
            center: g.center,
            spec: g.spec.clone(),
            locator: g.locator,
        }),
        sub: palette.sub().map(|sub| {
            Box::new(SubPaletteView {
                background: sub.background(),
                palette: render_palette(name, sub.palette()),
            })
        }),
    }
}
