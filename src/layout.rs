//! Page layout of the editor chrome.
//!
//! ```text
//! +----+---------- letters ----------+----+
//! |    |                        [P][L]    |
//! | op |          canvas               | var|
//! |    |                               |    |
//! |    +-------- equation -------------+    |
//! +----+-------------------------------+----+
//! ```

use crate::canvas::InteractionMode;
use crate::constants::{
    EQUATION_PANEL_HEIGHT, HANDLE_SIZE, MODE_TOGGLE_MARGIN, MODE_TOGGLE_SIZE, SELECTION_PADDING,
};
use crate::geometry::{Point, Rect};
use crate::input::coords::CoordinateConverter;
use crate::palette::Dock;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorLayout {
    pub page: Rect,
    pub canvas: Rect,
    pub equation_panel: Rect,
    pub top_palette: Rect,
    pub left_palette: Rect,
    pub right_palette: Rect,
}

impl EditorLayout {
    /// Palettes one button deep along three edges, the equation strip at the
    /// bottom and the canvas in between.
    pub fn standard(width: f32, height: f32, button_size: f32) -> Self {
        let bs = button_size;
        let inner_width = (width - 2.0 * bs).max(0.0);
        let side_height = (height - bs).max(0.0);
        let canvas_height = (height - bs - EQUATION_PANEL_HEIGHT).max(0.0);
        Self {
            page: Rect::new(0.0, 0.0, width, height),
            canvas: Rect::new(bs, bs, inner_width, canvas_height),
            equation_panel: Rect::new(bs, bs + canvas_height, inner_width, height - bs - canvas_height),
            top_palette: Rect::new(bs, 0.0, inner_width, bs),
            left_palette: Rect::new(0.0, bs, bs, side_height),
            right_palette: Rect::new(width - bs, bs, bs, side_height),
        }
    }

    pub fn palette_frame(&self, dock: Dock) -> Rect {
        match dock {
            Dock::Top => self.top_palette,
            Dock::Left => self.left_palette,
            Dock::Right => self.right_palette,
        }
    }

    pub fn converter(&self) -> CoordinateConverter {
        CoordinateConverter::new(self.canvas)
    }

    /// Toggles sit in the canvas' top-right corner, lasso outermost.
    pub fn mode_toggle(&self, mode: InteractionMode) -> Rect {
        let step = MODE_TOGGLE_SIZE + MODE_TOGGLE_MARGIN;
        let slot = match mode {
            InteractionMode::Lasso => 1.0,
            InteractionMode::Pan => 2.0,
        };
        Rect::new(
            self.canvas.right() - slot * step,
            self.canvas.top + MODE_TOGGLE_MARGIN,
            MODE_TOGGLE_SIZE,
            MODE_TOGGLE_SIZE,
        )
    }
}

/// Selection box around the selected symbols, in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionHandles {
    pub frame: Rect,
    pub move_handle: Rect,
    pub delete_handle: Rect,
    /// Only a single selected symbol can be resized.
    pub resize_handle: Option<Rect>,
}

impl SelectionHandles {
    pub fn around(selection_bounds: Rect, resizable: bool) -> Self {
        let frame = selection_bounds.inflate(SELECTION_PADDING);
        let handle = |at: Point| Rect::centered(at, HANDLE_SIZE, HANDLE_SIZE);
        Self {
            frame,
            move_handle: handle(frame.origin()),
            delete_handle: handle(Point::new(frame.right(), frame.top)),
            resize_handle: resizable.then(|| handle(Point::new(frame.right(), frame.bottom()))),
        }
    }
}
