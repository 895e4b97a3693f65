//! Coordinate conversion between page space and canvas-local space.
//!
//! Gestures arrive in page coordinates; symbols live in canvas-local ones.
//! Centralized here so spawn, hit testing and the scene agree on one formula.

use crate::geometry::{Point, Rect};

/// Converts through the canvas frame's page position.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateConverter {
    canvas_frame: Rect,
}

impl CoordinateConverter {
    #[inline]
    pub fn new(canvas_frame: Rect) -> Self {
        Self { canvas_frame }
    }

    #[inline]
    pub fn page_to_canvas(&self, page: Point) -> Point {
        page - self.canvas_frame.origin()
    }

    #[inline]
    pub fn canvas_to_page(&self, local: Point) -> Point {
        local + self.canvas_frame.origin()
    }

    #[inline]
    pub fn rect_to_page(&self, local: Rect) -> Rect {
        local.translate(self.canvas_frame.origin())
    }
}
