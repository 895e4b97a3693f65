//! In-canvas text entry.
//!
//! Opened by a background click. The box grows with its content and commits
//! to a `text` symbol on confirm or blur. Blank content commits as a cancel.

use tracing::debug;

use super::EquationCanvas;
use crate::geometry::{Point, Rect};
use crate::text_metrics::{FontFace, GlyphMeasurer};
use crate::types::{SymbolId, SymbolSpec};

/// Token used to pick the face of an empty entry (a digit, so upright).
const EMPTY_FACE_TOKEN: &str = "3";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Center,
    Left,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextEntry {
    anchor: Point,
    font_size: f32,
    value: String,
    width: f32,
}

impl TextEntry {
    pub fn new(anchor: Point, font_size: f32) -> Self {
        Self {
            anchor,
            font_size,
            value: String::new(),
            width: font_size,
        }
    }

    /// The clicked point the box is positioned around.
    pub fn anchor(&self) -> Point {
        self.anchor
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn face(&self) -> FontFace {
        let token = if self.value.is_empty() {
            EMPTY_FACE_TOKEN
        } else {
            &self.value
        };
        FontFace::for_token(token, self.font_size)
    }

    /// Box in canvas-local coordinates; the anchor sits half an em in.
    pub fn frame(&self) -> Rect {
        Rect::new(
            self.anchor.x - self.font_size / 2.0,
            self.anchor.y - self.font_size / 2.0,
            self.width,
            self.font_size,
        )
    }

    pub fn align(&self) -> TextAlign {
        if self.value.chars().count() < 2 {
            TextAlign::Center
        } else {
            TextAlign::Left
        }
    }

    pub fn padding_left(&self) -> f32 {
        match self.align() {
            TextAlign::Center => 0.0,
            TextAlign::Left => self.font_size / 4.0,
        }
    }

    /// Where the committed symbol is centered.
    pub fn commit_point(&self) -> Point {
        Point::new(
            self.anchor.x - self.font_size / 2.0 + self.width / 2.0,
            self.anchor.y,
        )
    }

    fn set_value(&mut self, value: String, measurer: &dyn GlyphMeasurer) {
        self.value = value;
        let advance = measurer.advance_width(&self.value, self.face());
        self.width = (advance + self.font_size / 2.0).max(self.font_size);
    }
}

impl EquationCanvas {
    pub fn open_text_entry(&mut self, at: Point) {
        debug!(x = at.x, y = at.y, "Opening text entry");
        self.text_entry = Some(TextEntry::new(at, self.default_font_size));
    }

    pub fn set_text_entry_value(&mut self, value: impl Into<String>) {
        if let Some(entry) = self.text_entry.as_mut() {
            entry.set_value(value.into(), self.measurer.as_ref());
        }
    }

    pub fn text_entry_push(&mut self, c: char) {
        if let Some(entry) = self.text_entry.as_mut() {
            let mut value = std::mem::take(&mut entry.value);
            value.push(c);
            entry.set_value(value, self.measurer.as_ref());
        }
    }

    pub fn text_entry_pop(&mut self) {
        if let Some(entry) = self.text_entry.as_mut() {
            let mut value = std::mem::take(&mut entry.value);
            value.pop();
            entry.set_value(value, self.measurer.as_ref());
        }
    }

    /// Close the entry, creating a symbol unless the content is blank.
    pub fn commit_text_entry(&mut self) -> Option<SymbolId> {
        let entry = self.text_entry.take()?;
        let token = entry.value.trim();
        if token.is_empty() {
            debug!("Blank text entry discarded");
            return None;
        }
        let at = entry.commit_point();
        Some(self.add_symbol(at.x, at.y, SymbolSpec::text(token, entry.font_size)))
    }

    pub fn cancel_text_entry(&mut self) {
        if self.text_entry.take().is_some() {
            debug!("Text entry cancelled");
        }
    }

    /// Focus left the entry; same as confirming.
    pub fn blur_text_entry(&mut self) -> Option<SymbolId> {
        self.commit_text_entry()
    }
}
