//! Runtime palette: scrolling, drag-to-spawn and nested sub-palettes.
//!
//! Dragging a button scrolls the list while the drag stays within one button
//! size of the list axis, and carries a ghost of the prototype otherwise. A
//! drop hands the ghost's page position and a clone of its symbol spec to the owner.
//!
//! Sub-palettes are addressed by a path of button indices from the root
//! palette, one index per level of nesting.

use tracing::debug;

use super::{Orientation, PaletteEntry};
use crate::geometry::{Point, Rect};
use crate::input::PointerSource;
use crate::types::SymbolSpec;

/// A dropped prototype, in page coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRequest {
    pub page: Point,
    pub spec: SymbolSpec,
}

/// The floating copy of a button being dragged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ghost<'a> {
    pub center: Point,
    pub spec: &'a SymbolSpec,
    pub locator: bool,
}

/// What a page position hits within a palette tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PaletteHit {
    Button { path: Vec<usize>, index: usize },
    /// Background of the sub-palette reached through `path`.
    SubBackground { path: Vec<usize> },
}

#[derive(Debug, Clone, Copy)]
struct ButtonDrag {
    index: usize,
    grab_scroll: f32,
    total: Point,
    touch: bool,
    /// Set once a spawnable button has moved.
    ghost: bool,
}

#[derive(Debug, Clone)]
pub struct SubPalette {
    opened_from: usize,
    background: Rect,
    palette: Palette,
}

impl SubPalette {
    pub fn opened_from(&self) -> usize {
        self.opened_from
    }

    pub fn background(&self) -> Rect {
        self.background
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }
}

#[derive(Debug, Clone)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
    orientation: Orientation,
    button_size: f32,
    /// Viewport in page coordinates.
    frame: Rect,
    /// Whole page, covered by a sub-palette's background.
    page: Rect,
    scroll: f32,
    scrolling: bool,
    drag: Option<ButtonDrag>,
    sub: Option<Box<SubPalette>>,
}

impl Palette {
    pub fn new(
        entries: Vec<PaletteEntry>,
        orientation: Orientation,
        button_size: f32,
        frame: Rect,
        page: Rect,
    ) -> Self {
        Self {
            entries,
            orientation,
            button_size,
            frame,
            page,
            scroll: 0.0,
            scrolling: false,
            drag: None,
            sub: None,
        }
    }

    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn button_size(&self) -> f32 {
        self.button_size
    }

    pub fn frame(&self) -> Rect {
        self.frame
    }

    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    /// Whether the last drag scrolled the list rather than carrying a button.
    pub fn is_scrolling(&self) -> bool {
        self.scrolling
    }

    pub fn sub(&self) -> Option<&SubPalette> {
        self.sub.as_deref()
    }

    /// Button currently carried as a ghost.
    pub fn dragging_index(&self) -> Option<usize> {
        self.drag.filter(|d| d.ghost).map(|d| d.index)
    }

    pub fn set_frame(&mut self, frame: Rect, page: Rect) {
        self.frame = frame;
        self.page = page;
        self.scroll = self.scroll.clamp(0.0, self.max_scroll());
        self.sub = None;
    }

    pub fn list_length(&self) -> f32 {
        self.entries.len() as f32 * self.button_size
    }

    pub fn viewport_length(&self) -> f32 {
        match self.orientation {
            Orientation::Horizontal => self.frame.width,
            Orientation::Vertical => self.frame.height,
        }
    }

    pub fn max_scroll(&self) -> f32 {
        (self.list_length() - self.viewport_length()).max(0.0)
    }

    /// Offset of button `index` along the list axis, scroll applied.
    fn axis_offset(&self, index: usize, scroll: f32) -> Point {
        let along = index as f32 * self.button_size - scroll;
        match self.orientation {
            Orientation::Horizontal => Point::new(along, 0.0),
            Orientation::Vertical => Point::new(0.0, along),
        }
    }

    /// Page rectangle of a button; may extend past the viewport.
    pub fn button_rect(&self, index: usize) -> Rect {
        let origin = self.frame.origin() + self.axis_offset(index, self.scroll);
        Rect::new(origin.x, origin.y, self.button_size, self.button_size)
    }

    /// Button under a page position, clipped to the viewport.
    pub fn button_at(&self, page: Point) -> Option<usize> {
        if !self.frame.contains(page) || self.button_size <= 0.0 {
            return None;
        }
        let along = match self.orientation {
            Orientation::Horizontal => page.x - self.frame.left,
            Orientation::Vertical => page.y - self.frame.top,
        } + self.scroll;
        let index = (along / self.button_size).floor();
        (index >= 0.0 && (index as usize) < self.entries.len()).then_some(index as usize)
    }

    // ------------------------------------------------------------------
    // Button gestures
    // ------------------------------------------------------------------

    pub fn grab_button(&mut self, index: usize, source: PointerSource) {
        if index >= self.entries.len() {
            return;
        }
        self.scrolling = false;
        self.drag = Some(ButtonDrag {
            index,
            grab_scroll: self.scroll,
            total: Point::ZERO,
            touch: source == PointerSource::Touch,
            ghost: false,
        });
    }

    pub fn drag_button(&mut self, index: usize, total: Point) {
        let max_scroll = self.max_scroll();
        let Some(drag) = self.drag.as_mut().filter(|d| d.index == index) else {
            return;
        };
        let (along, across) = match self.orientation {
            Orientation::Horizontal => (total.x, total.y),
            Orientation::Vertical => (total.y, total.x),
        };

        let overflow = (max_scroll - drag.grab_scroll).max(0.0);
        let underflow = drag.grab_scroll.max(0.0);
        self.scrolling = across.abs() < self.button_size;
        self.scroll = if self.scrolling {
            if along < 0.0 {
                drag.grab_scroll + (-along).min(overflow)
            } else {
                drag.grab_scroll - along.min(underflow)
            }
        } else {
            drag.grab_scroll
        };

        drag.total = total;
        drag.ghost = !self.entries[index].opens_sub_menu();
    }

    /// Finish a drag on this palette's own button.
    fn drop_own_button(&mut self, index: usize) -> Option<SpawnRequest> {
        let drag = self.drag.take()?;
        if drag.index != index || !drag.ghost {
            return None;
        }
        let center = self.ghost_center(&drag);
        Some(SpawnRequest {
            page: center,
            spec: self.entries[index].spec.clone(),
        })
    }

    /// Finish a button drag anywhere in the tree. A spawn from a sub-palette
    /// closes it, unless its list was scrolling.
    pub fn drop_button(&mut self, path: &[usize], index: usize) -> Option<SpawnRequest> {
        let Some((&opened, rest)) = path.split_first() else {
            return self.drop_own_button(index);
        };
        let sub = self.sub.as_mut().filter(|s| s.opened_from == opened)?;
        let request = sub.palette.drop_button(rest, index)?;
        if sub.palette.scrolling {
            debug!("Spawn from scrolling sub-palette suppressed");
            return None;
        }
        self.sub = None;
        Some(request)
    }

    /// Clicking a sub-menu button opens its sub-palette.
    pub fn click_button(&mut self, index: usize) -> bool {
        let Some(entries) = self.entries.get(index).and_then(|e| e.sub_menu.clone()) else {
            return false;
        };
        let frame = self.sub_frame(index, entries.len());
        debug!(index, entries = entries.len(), "Opening sub-palette");
        self.sub = Some(Box::new(SubPalette {
            opened_from: index,
            background: self.page,
            palette: Palette::new(
                entries,
                Orientation::Vertical,
                self.button_size,
                frame,
                self.page,
            ),
        }));
        true
    }

    /// Sub-palettes sit outside their parent, lined up with the opening button.
    fn sub_frame(&self, index: usize, count: usize) -> Rect {
        let bs = self.button_size;
        let length = count as f32 * bs;
        let button = self.button_rect(index);
        match self.orientation {
            Orientation::Vertical => {
                let top = button.top.max(self.frame.top);
                let height = length.min((self.page.bottom() - top).max(bs));
                // Open inward when there is no room on the left.
                let left = if self.frame.left - bs < self.page.left {
                    self.frame.right()
                } else {
                    self.frame.left - bs
                };
                Rect::new(left, top, bs, height)
            }
            Orientation::Horizontal => {
                let left = button.left.max(self.frame.left);
                let top = self.frame.bottom();
                let height = length.min((self.page.bottom() - top).max(bs));
                Rect::new(left, top, bs, height)
            }
        }
    }

    pub fn close_sub(&mut self) {
        if self.sub.take().is_some() {
            debug!("Sub-palette dismissed");
        }
    }

    fn ghost_center(&self, drag: &ButtonDrag) -> Point {
        let half = self.button_size / 2.0;
        self.frame.origin()
            + self.axis_offset(drag.index, drag.grab_scroll)
            + Point::new(half, half)
            + drag.total
    }

    pub fn ghost(&self) -> Option<Ghost<'_>> {
        let drag = self.drag.filter(|d| d.ghost)?;
        Some(Ghost {
            center: self.ghost_center(&drag),
            spec: &self.entries[drag.index].spec,
            locator: drag.touch,
        })
    }

    // ------------------------------------------------------------------
    // Tree addressing
    // ------------------------------------------------------------------

    pub fn descend(&self, path: &[usize]) -> Option<&Palette> {
        match path.split_first() {
            None => Some(self),
            Some((&opened, rest)) => self
                .sub
                .as_ref()
                .filter(|s| s.opened_from == opened)?
                .palette
                .descend(rest),
        }
    }

    pub fn descend_mut(&mut self, path: &[usize]) -> Option<&mut Palette> {
        match path.split_first() {
            None => Some(self),
            Some((&opened, rest)) => self
                .sub
                .as_mut()
                .filter(|s| s.opened_from == opened)?
                .palette
                .descend_mut(rest),
        }
    }

    /// Deepest hit first: an open sub-palette and its page-wide background
    /// shadow everything beneath.
    pub fn hit_test(&self, page: Point) -> Option<PaletteHit> {
        if let Some(sub) = &self.sub {
            let hit = sub
                .palette
                .hit_test(page)
                .map(|hit| prefix_hit(sub.opened_from, hit));
            if hit.is_some() {
                return hit;
            }
            if sub.background.contains(page) {
                return Some(PaletteHit::SubBackground {
                    path: vec![sub.opened_from],
                });
            }
        }
        self.button_at(page).map(|index| PaletteHit::Button {
            path: Vec::new(),
            index,
        })
    }

    /// Only the overlay part of [`hit_test`](Self::hit_test).
    pub fn overlay_hit_test(&self, page: Point) -> Option<PaletteHit> {
        self.sub.as_ref()?;
        self.hit_test(page)
            .filter(|hit| !matches!(hit, PaletteHit::Button { path, .. } if path.is_empty()))
    }

    /// Page origin of a hit target, for local gesture coordinates.
    pub fn origin_of(&self, hit: &PaletteHit) -> Option<Point> {
        match hit {
            PaletteHit::Button { path, index } => {
                let palette = self.descend(path)?;
                (*index < palette.entries.len()).then(|| palette.button_rect(*index).origin())
            }
            PaletteHit::SubBackground { path } => {
                let (last, parent) = path.split_last()?;
                let sub = self.descend(parent)?.sub.as_ref()?;
                (sub.opened_from == *last).then(|| sub.background.origin())
            }
        }
    }

    /// Every gesture target in the tree.
    pub fn targets(&self) -> Vec<PaletteHit> {
        let mut out: Vec<PaletteHit> = (0..self.entries.len())
            .map(|index| PaletteHit::Button {
                path: Vec::new(),
                index,
            })
            .collect();
        if let Some(sub) = &self.sub {
            out.push(PaletteHit::SubBackground {
                path: vec![sub.opened_from],
            });
            out.extend(
                sub.palette
                    .targets()
                    .into_iter()
                    .map(|hit| prefix_hit(sub.opened_from, hit)),
            );
        }
        out
    }

    /// Close the sub-palette reached through `path`.
    pub fn close_sub_at(&mut self, path: &[usize]) {
        let Some((last, parent)) = path.split_last() else {
            return;
        };
        if let Some(palette) = self.descend_mut(parent)
            && palette.sub.as_ref().is_some_and(|s| s.opened_from == *last)
        {
            palette.close_sub();
        }
    }
}

fn prefix_hit(opened: usize, hit: PaletteHit) -> PaletteHit {
    let prefix = |path: Vec<usize>| {
        let mut full = Vec::with_capacity(path.len() + 1);
        full.push(opened);
        full.extend(path);
        full
    };
    match hit {
        PaletteHit::Button { path, index } => PaletteHit::Button {
            path: prefix(path),
            index,
        },
        PaletteHit::SubBackground { path } => PaletteHit::SubBackground { path: prefix(path) },
    }
}
