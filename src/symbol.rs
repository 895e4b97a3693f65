//! Symbol geometry model.
//!
//! Every variant of [`SymbolSpec`] answers three questions:
//!
//! - `bounds` - axis-aligned bounds for a spec centered at a position. Pure;
//!   a symbol's bounds never depend on any other symbol.
//! - `apply_resize_delta` - how a cumulative drag on the resize handle maps
//!   onto the variant's dimensions, always computed from a snapshot taken at
//!   resize start so intermediate frames never compound.
//! - `recognition_token` - what the recognizer is told the symbol is.
//!
//! Non-text variants also produce a [`StrokePath`] so hosts can paint them.

use crate::constants::{
    BRACKETS_TOKEN, LINE_MIN_HIT_HEIGHT, LINE_THICKNESS_RATIO, LINE_TOKEN, MIN_CONTAINER_SIZE, MIN_FONT_SIZE,
    MIN_LINE_LENGTH, MIN_LINE_VISUAL_LENGTH, SQRT_TOKEN, TEXT_RESIZE_GAIN,
};
use crate::geometry::{Point, Rect};
use crate::text_metrics::{FontFace, GlyphMeasurer};
use crate::types::{ContainerKind, Symbol, SymbolSpec};

impl SymbolSpec {
    /// Bounds of this spec centered at (`x`, `y`).
    pub fn bounds(&self, x: f32, y: f32, measurer: &dyn GlyphMeasurer) -> Rect {
        let center = Point::new(x, y);
        match self {
            SymbolSpec::Text { token, font_size } => {
                let face = FontFace::for_token(token, *font_size);
                let ink = measurer.measure(
                    token,
                    face,
                    text_box_width(token, *font_size),
                    font_size * 2.0,
                );
                Rect::centered(center, ink.width, ink.height)
            }
            SymbolSpec::Line { length } => Rect::new(
                x - length / 2.0,
                y - length / (LINE_THICKNESS_RATIO * 2.0),
                *length,
                length / LINE_THICKNESS_RATIO,
            ),
            SymbolSpec::Container { width, height, .. } => Rect::centered(center, *width, *height),
        }
    }

    /// Token the recognizer sees: the glyphs for text, a sentinel otherwise.
    pub fn recognition_token(&self) -> &str {
        match self {
            SymbolSpec::Text { token, .. } => token,
            SymbolSpec::Line { .. } => LINE_TOKEN,
            SymbolSpec::Container {
                sub_type: ContainerKind::Sqrt,
                ..
            } => SQRT_TOKEN,
            SymbolSpec::Container {
                sub_type: ContainerKind::Brackets,
                ..
            } => BRACKETS_TOKEN,
        }
    }
}

/// Width of the surface a token is measured on: one em per character.
fn text_box_width(token: &str, font_size: f32) -> f32 {
    (font_size * token.chars().count() as f32).ceil()
}

impl Symbol {
    pub fn bounds(&self, measurer: &dyn GlyphMeasurer) -> Rect {
        self.spec.bounds(self.x, self.y, measurer)
    }

    /// Area that responds to the pointer. Thin lines get a taller strip.
    pub fn hit_rect(&self, measurer: &dyn GlyphMeasurer) -> Rect {
        match self.spec {
            SymbolSpec::Line { length } => {
                let height = (length / LINE_THICKNESS_RATIO).max(LINE_MIN_HIT_HEIGHT);
                Rect::new(self.x - length / 2.0, self.y - height / 2.0, length, height)
            }
            _ => self.bounds(measurer),
        }
    }

    /// Recompute position and dimensions from `snapshot` and the cumulative
    /// resize drag (`total_dx`, `total_dy`).
    ///
    /// Applying the same total twice yields the same symbol as applying it once.
    pub fn apply_resize_delta(&mut self, snapshot: &Symbol, total_dx: f32, total_dy: f32) {
        match (&mut self.spec, &snapshot.spec) {
            (SymbolSpec::Text { font_size, .. }, SymbolSpec::Text { font_size: start, .. }) => {
                *font_size =
                    (start + total_dx.max(total_dy) * TEXT_RESIZE_GAIN).max(MIN_FONT_SIZE);
                self.x = snapshot.x;
                self.y = snapshot.y;
            }
            (SymbolSpec::Line { length }, SymbolSpec::Line { length: start }) => {
                let dx = total_dx.max(MIN_LINE_VISUAL_LENGTH - start);
                self.x = snapshot.x + dx / 2.0;
                self.y = snapshot.y;
                *length = (start + dx).max(MIN_LINE_LENGTH);
            }
            (
                SymbolSpec::Container { width, height, .. },
                SymbolSpec::Container {
                    width: start_w,
                    height: start_h,
                    ..
                },
            ) => {
                let dx = total_dx.max(MIN_CONTAINER_SIZE - start_w);
                let dy = total_dy.max(MIN_CONTAINER_SIZE - start_h);
                self.x = snapshot.x + dx / 2.0;
                self.y = snapshot.y + dy / 2.0;
                *width = start_w + dx;
                *height = start_h + dy;
            }
            (live, snap) => {
                tracing::warn!(?live, ?snap, "Resize snapshot does not match symbol variant");
            }
        }
    }

    /// Vector outline for non-text symbols, relative to the bounds' top-left.
    pub fn stroke_path(&self) -> Option<StrokePath> {
        match &self.spec {
            SymbolSpec::Text { .. } => None,
            SymbolSpec::Line { length } => Some(line_path(*length)),
            SymbolSpec::Container {
                width,
                height,
                sub_type: ContainerKind::Sqrt,
            } => Some(sqrt_path(*width, *height)),
            SymbolSpec::Container {
                width,
                height,
                sub_type: ContainerKind::Brackets,
            } => Some(brackets_path(*width, *height)),
        }
    }
}

// ============================================================================
// Stroke paths
// ============================================================================

/// One drawing command of a stroke path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    QuadTo { control: Point, to: Point },
}

/// A stroked (unfilled) outline.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokePath {
    pub line_width: f32,
    pub commands: Vec<PathCommand>,
}

fn line_path(length: f32) -> StrokePath {
    let lw = (length / 40.0).clamp(1.5, 3.0);
    let mid = length / LINE_THICKNESS_RATIO / 2.0;
    StrokePath {
        line_width: lw,
        commands: vec![
            PathCommand::MoveTo(Point::new(lw, mid)),
            PathCommand::LineTo(Point::new(length - lw, mid)),
        ],
    }
}

fn sqrt_path(width: f32, height: f32) -> StrokePath {
    let lw = (height / 40.0).max(1.5);
    StrokePath {
        line_width: lw,
        commands: vec![
            PathCommand::MoveTo(Point::new(lw, 0.8 * height)),
            PathCommand::LineTo(Point::new(0.15 * height, height - lw)),
            PathCommand::LineTo(Point::new(0.3 * height, lw / 2.0)),
            PathCommand::LineTo(Point::new(width, lw / 2.0)),
        ],
    }
}

fn brackets_path(width: f32, height: f32) -> StrokePath {
    let lw = (height / 50.0).max(1.5);
    let inset = 0.2 * height;
    let mid = 0.5 * height;
    let bottom = height - lw;
    // Each bracket is two curves: the outer edge and a thinner inner edge.
    let bracket = |top: Point, bottom: Point, outer_x: f32, inner_x: f32| {
        [
            PathCommand::MoveTo(top),
            PathCommand::QuadTo {
                control: Point::new(outer_x, mid),
                to: bottom,
            },
            PathCommand::MoveTo(top),
            PathCommand::QuadTo {
                control: Point::new(inner_x, mid),
                to: bottom,
            },
        ]
    };

    let mut commands = Vec::with_capacity(8);
    commands.extend(bracket(
        Point::new(inset, lw),
        Point::new(inset, bottom),
        0.0,
        1.5 * lw,
    ));
    commands.extend(bracket(
        Point::new(width - inset, lw),
        Point::new(width - inset, bottom),
        width,
        width - 1.5 * lw,
    ));
    StrokePath {
        line_width: lw,
        commands,
    }
}
