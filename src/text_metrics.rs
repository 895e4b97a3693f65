//! Glyph ink measurement for text symbols.
//!
//! A text symbol's bounds hug the ink of its glyphs, not the font's nominal
//! advance box, so a `-` is a thin bar and a `g` includes its descender.
//!
//! - [`OutlineMeasurer`] resolves a system face with `fontdb` and unions the
//!   glyph bounding boxes reported by `ttf-parser`.
//! - [`ApproximateMeasurer`] produces fixed proportional metrics when no font
//!   is available (headless CI, tests).
//! - [`CachedMeasurer`] memoizes any measurer in a bounded LRU. Measurement
//!   sits on the render and hit-test path and the same token/size pairs recur
//!   constantly; a long resize drag visits many sizes exactly once.

use fontdb::{Database, Family, ID, Query, Stretch, Style, Weight};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::constants::{INK_PADDING, MEASURE_CACHE_CAPACITY};
use crate::profile_scope;

/// Which face a token is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceStyle {
    /// Math identifiers (latin letters) are set in italic.
    Italic,
    /// Numbers, operators and everything else.
    Upright,
}

/// A concrete face and size to measure with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontFace {
    pub style: FaceStyle,
    pub size: f32,
}

impl FontFace {
    /// The face a token is displayed in, chosen by its first character.
    pub fn for_token(token: &str, size: f32) -> Self {
        let style = match token.chars().next() {
            Some(c) if c.is_ascii_alphabetic() => FaceStyle::Italic,
            _ => FaceStyle::Upright,
        };
        Self { style, size }
    }
}

/// Tight ink rectangle inside the measurement box, padded by one pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InkBox {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl InkBox {
    /// Box used when a token has no ink at all (whitespace, missing glyphs).
    pub fn blank(box_width: f32, box_height: f32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: box_width,
            height: box_height,
        }
    }

    /// Pad raw ink extents the way the display clips glyph whitespace.
    fn from_extents(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            left: min_x - INK_PADDING,
            top: min_y - INK_PADDING,
            width: max_x - min_x + 3.0 * INK_PADDING,
            height: max_y - min_y + 3.0 * INK_PADDING,
        }
    }
}

/// Measures rendered glyph runs.
pub trait GlyphMeasurer: Send + Sync {
    /// Ink box of `token` drawn at the top-left of a `box_width x box_height`
    /// surface. Ink outside the surface is clipped.
    fn measure(&self, token: &str, face: FontFace, box_width: f32, box_height: f32) -> InkBox;

    /// Typographic advance of `text`, used to size the text entry.
    fn advance_width(&self, text: &str, face: FontFace) -> f32;
}

/// Errors produced while loading fonts.
#[derive(thiserror::Error, Debug)]
pub enum FontError {
    #[error("no fonts found on this system")]
    NoFontsAvailable,

    #[error("failed to parse font face {0:?}")]
    ParseFailed(ID),
}

// ============================================================================
// Outline measurement
// ============================================================================

/// Measures glyph ink from font outlines of system fonts.
pub struct OutlineMeasurer {
    db: Database,
    upright: ID,
    italic: ID,
}

impl OutlineMeasurer {
    /// Load system fonts and pick a serif face for both styles.
    pub fn new() -> Result<Self, FontError> {
        let mut db = Database::new();
        db.load_system_fonts();
        Self::from_database(db)
    }

    pub fn from_database(db: Database) -> Result<Self, FontError> {
        let first = db.faces().next().map(|f| f.id).ok_or(FontError::NoFontsAvailable)?;
        let upright = resolve(&db, Style::Normal).unwrap_or(first);
        let italic = resolve(&db, Style::Italic).unwrap_or(upright);

        // Fail early rather than on the first measurement.
        db.with_face_data(upright, |data, index| ttf_parser::Face::parse(data, index).is_ok())
            .filter(|ok| *ok)
            .ok_or(FontError::ParseFailed(upright))?;

        tracing::debug!(faces = db.len(), "Loaded fonts for glyph measurement");
        Ok(Self { db, upright, italic })
    }

    fn face_id(&self, style: FaceStyle) -> ID {
        match style {
            FaceStyle::Italic => self.italic,
            FaceStyle::Upright => self.upright,
        }
    }
}

/// Advance, in font units, of a character the face has no glyph for.
fn missing_glyph_advance(face: &ttf_parser::Face<'_>) -> f32 {
    face.glyph_hor_advance(ttf_parser::GlyphId(0))
        .filter(|advance| *advance > 0)
        .map(f32::from)
        .unwrap_or(face.units_per_em() as f32 / 2.0)
}

fn resolve(db: &Database, style: Style) -> Option<ID> {
    let families = [Family::Name("STIX Two Math"), Family::Name("Latin Modern Math"), Family::Serif];
    db.query(&Query {
        families: &families,
        weight: Weight::NORMAL,
        stretch: Stretch::Normal,
        style,
    })
}

impl GlyphMeasurer for OutlineMeasurer {
    fn measure(&self, token: &str, face: FontFace, box_width: f32, box_height: f32) -> InkBox {
        profile_scope!("measure_glyphs");

        let measured = self
            .db
            .with_face_data(self.face_id(face.style), |data, index| {
                let parsed = ttf_parser::Face::parse(data, index).ok()?;
                let scale = face.size / parsed.units_per_em() as f32;
                // Text is laid out with its em-box top at y = 0.
                let ascender = parsed.ascender() as f32 * scale;

                let missing_advance = missing_glyph_advance(&parsed) * scale;

                let mut pen_x = 0.0f32;
                let mut extents: Option<(f32, f32, f32, f32)> = None;
                for ch in token.chars() {
                    let Some(gid) = parsed.glyph_index(ch) else {
                        // Drawn as notdef: no ink we can trust, but it still advances.
                        pen_x += missing_advance;
                        continue;
                    };
                    if let Some(bbox) = parsed.glyph_bounding_box(gid) {
                        let min_x = (pen_x + bbox.x_min as f32 * scale).max(0.0);
                        let max_x = (pen_x + bbox.x_max as f32 * scale).min(box_width - 1.0);
                        let min_y = (ascender - bbox.y_max as f32 * scale).max(0.0);
                        let max_y = (ascender - bbox.y_min as f32 * scale).min(box_height - 1.0);
                        if min_x <= max_x && min_y <= max_y {
                            extents = Some(match extents {
                                None => (min_x, min_y, max_x, max_y),
                                Some((a, b, c, d)) => {
                                    (a.min(min_x), b.min(min_y), c.max(max_x), d.max(max_y))
                                }
                            });
                        }
                    }
                    pen_x += parsed.glyph_hor_advance(gid).unwrap_or(0) as f32 * scale;
                }
                extents.map(|(a, b, c, d)| InkBox::from_extents(a.floor(), b.floor(), c.ceil(), d.ceil()))
            })
            .flatten();

        measured.unwrap_or_else(|| InkBox::blank(box_width, box_height))
    }

    fn advance_width(&self, text: &str, face: FontFace) -> f32 {
        self.db
            .with_face_data(self.face_id(face.style), |data, index| {
                let parsed = ttf_parser::Face::parse(data, index).ok()?;
                let scale = face.size / parsed.units_per_em() as f32;
                let fallback = missing_glyph_advance(&parsed);
                let units: f32 = text
                    .chars()
                    .map(|ch| {
                        parsed
                            .glyph_index(ch)
                            .and_then(|gid| parsed.glyph_hor_advance(gid))
                            .map(f32::from)
                            .unwrap_or(fallback)
                    })
                    .sum();
                Some(units * scale)
            })
            .flatten()
            .unwrap_or(0.0)
    }
}

// ============================================================================
// Approximate measurement
// ============================================================================

/// Proportional metrics that need no font files.
///
/// Every character advances by half the font size; ink starts a tenth of
/// the size in from the left, a quarter down from the top, and is 0.7 of the
/// size tall.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateMeasurer;

impl GlyphMeasurer for ApproximateMeasurer {
    fn measure(&self, token: &str, face: FontFace, box_width: f32, box_height: f32) -> InkBox {
        let chars = token.chars().filter(|c| !c.is_whitespace()).count();
        if chars == 0 {
            return InkBox::blank(box_width, box_height);
        }
        let size = face.size;
        let min_x = (size * 0.1).floor();
        let min_y = (size * 0.25).floor();
        let max_x = (min_x + size * 0.5 * chars as f32).min(box_width - 1.0).ceil();
        let max_y = (min_y + size * 0.7).min(box_height - 1.0).ceil();
        InkBox::from_extents(min_x, min_y, max_x, max_y)
    }

    fn advance_width(&self, text: &str, face: FontFace) -> f32 {
        text.chars().count() as f32 * face.size * 0.5
    }
}

// ============================================================================
// Memoization
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MeasureKey {
    token: String,
    style: FaceStyle,
    size: u32,
    box_width: u32,
    box_height: u32,
}

/// Memoizing wrapper; results are identical to the inner measurer's.
///
/// Holds at most `capacity` boxes and evicts the least recently used.
pub struct CachedMeasurer<M> {
    inner: M,
    cache: Mutex<LruCache<MeasureKey, InkBox>>,
}

impl<M: GlyphMeasurer> CachedMeasurer<M> {
    pub fn new(inner: M) -> Self {
        Self::with_capacity(inner, MEASURE_CACHE_CAPACITY)
    }

    pub fn with_capacity(inner: M, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }
}

impl<M: GlyphMeasurer> GlyphMeasurer for CachedMeasurer<M> {
    fn measure(&self, token: &str, face: FontFace, box_width: f32, box_height: f32) -> InkBox {
        let key = MeasureKey {
            token: token.to_owned(),
            style: face.style,
            size: face.size.to_bits(),
            box_width: box_width.to_bits(),
            box_height: box_height.to_bits(),
        };
        if let Some(hit) = self.cache.lock().get(&key) {
            return *hit;
        }
        // Measure without holding the lock; a racing duplicate is harmless.
        let ink = self.inner.measure(token, face, box_width, box_height);
        self.cache.lock().put(key, ink);
        ink
    }

    fn advance_width(&self, text: &str, face: FontFace) -> f32 {
        self.inner.advance_width(text, face)
    }
}

/// Shared measurer handle used by the canvas and the recognition bridge.
pub type SharedMeasurer = Arc<dyn GlyphMeasurer>;

/// Best available measurer: system font outlines, else approximate metrics.
pub fn default_measurer() -> SharedMeasurer {
    match OutlineMeasurer::new() {
        Ok(outline) => Arc::new(CachedMeasurer::new(outline)),
        Err(e) => {
            tracing::warn!("Falling back to approximate glyph metrics: {}", e);
            Arc::new(CachedMeasurer::new(ApproximateMeasurer))
        }
    }
}
