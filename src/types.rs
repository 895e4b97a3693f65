//! Core types for the equation canvas.
//!
//! This module defines the data model shared by every component: symbol ids,
//! the closed set of symbol variants and the positioned symbol itself. The
//! geometry each variant computes lives in [`crate::symbol`].

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::geometry::Point;

// ============================================================================
// Identity
// ============================================================================

/// Process-unique symbol identity, rendered as `sym-<n>`.
///
/// Ids are handed out by a [`SymbolIdGenerator`] and never recycled, so a
/// gesture event that arrives for a deleted symbol can never hit a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(u64);

impl SymbolId {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sym-{}", self.0)
    }
}

impl FromStr for SymbolId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("sym-")
            .and_then(|n| n.parse::<u64>().ok())
            .map(SymbolId)
            .ok_or_else(|| format!("invalid symbol id '{s}', expected sym-<n>"))
    }
}

impl Serialize for SymbolId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SymbolId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

/// Monotonic id source owned by one canvas instance.
#[derive(Debug, Default)]
pub struct SymbolIdGenerator {
    next: u64,
}

impl SymbolIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> SymbolId {
        let id = SymbolId(self.next);
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u64 {
        self.next
    }
}

// ============================================================================
// Symbol Specs
// ============================================================================

/// Which decorative frame a container draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    Sqrt,
    Brackets,
}

/// Variant payload of a symbol.
///
/// The set is closed; per-variant behavior is a `match` in [`crate::symbol`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SymbolSpec {
    /// A glyph run measured by its ink.
    #[serde(alias = "string", rename_all = "camelCase")]
    Text { token: String, font_size: f32 },
    /// A horizontal bar, e.g. a fraction line.
    Line { length: f32 },
    /// A frame drawn around separately positioned content.
    #[serde(rename_all = "camelCase")]
    Container {
        width: f32,
        height: f32,
        sub_type: ContainerKind,
    },
}

impl SymbolSpec {
    pub fn text(token: impl Into<String>, font_size: f32) -> Self {
        Self::Text {
            token: token.into(),
            font_size,
        }
    }

    pub fn line(length: f32) -> Self {
        Self::Line { length }
    }

    pub fn sqrt(width: f32, height: f32) -> Self {
        Self::Container {
            width,
            height,
            sub_type: ContainerKind::Sqrt,
        }
    }

    pub fn brackets(width: f32, height: f32) -> Self {
        Self::Container {
            width,
            height,
            sub_type: ContainerKind::Brackets,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text { .. })
    }
}

// ============================================================================
// Symbols
// ============================================================================

/// A positioned symbol on the canvas.
///
/// Symbols are owned by [`crate::canvas::EquationCanvas`]; everything outside
/// the canvas reads them through the accessors below.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) spec: SymbolSpec,
    pub(crate) selected: bool,
    /// Set from the last recognition result; not part of the geometry.
    pub(crate) unused: bool,
}

impl Symbol {
    pub fn new(x: f32, y: f32, spec: SymbolSpec) -> Self {
        Self {
            x,
            y,
            spec,
            selected: false,
            unused: false,
        }
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[inline]
    pub fn spec(&self) -> &SymbolSpec {
        &self.spec
    }

    #[inline]
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    #[inline]
    pub fn is_unused(&self) -> bool {
        self.unused
    }

    pub(crate) fn translate(&mut self, by: Point) {
        self.x += by.x;
        self.y += by.y;
    }
}
