//! Symbol palettes: prototype specs that can be dragged onto the canvas.
//!
//! Definitions are plain configuration ([`PaletteDefinition`]); the runtime
//! state of a palette (scroll, the button being dragged, an open sub-palette)
//! lives in [`Palette`].

mod menu;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_FONT_SIZE;
use crate::geometry::Rect;
use crate::types::SymbolSpec;

pub use menu::{Ghost, Palette, PaletteHit, SpawnRequest, SubPalette};

/// One button: a spawnable prototype, or the opener of a nested palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteEntry {
    #[serde(flatten)]
    pub spec: SymbolSpec,
    #[serde(
        default,
        rename = "subMenu",
        skip_serializing_if = "Option::is_none"
    )]
    pub sub_menu: Option<Vec<PaletteEntry>>,
}

impl PaletteEntry {
    pub fn new(spec: SymbolSpec) -> Self {
        Self {
            spec,
            sub_menu: None,
        }
    }

    pub fn with_sub_menu(mut self, entries: Vec<PaletteEntry>) -> Self {
        self.sub_menu = Some(entries);
        self
    }

    pub fn opens_sub_menu(&self) -> bool {
        self.sub_menu.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Which edge of the editor a palette is docked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dock {
    Top,
    Left,
    Right,
}

impl Dock {
    pub fn orientation(self) -> Orientation {
        match self {
            Dock::Top => Orientation::Horizontal,
            Dock::Left | Dock::Right => Orientation::Vertical,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteDefinition {
    pub name: String,
    pub dock: Dock,
    pub entries: Vec<PaletteEntry>,
}

impl PaletteDefinition {
    /// Runtime palette for this definition inside `frame`.
    pub fn instantiate(&self, frame: Rect, page: Rect, button_size: f32) -> DockedPalette {
        DockedPalette {
            name: self.name.clone(),
            dock: self.dock,
            palette: Palette::new(
                self.entries.clone(),
                self.dock.orientation(),
                button_size,
                frame,
                page,
            ),
        }
    }
}

/// A palette placed on one edge of the editor.
#[derive(Debug, Clone)]
pub struct DockedPalette {
    pub name: String,
    pub dock: Dock,
    pub palette: Palette,
}

/// One text entry per token.
pub fn text_entries<I, S>(tokens: I, font_size: f32) -> Vec<PaletteEntry>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    tokens
        .into_iter()
        .map(|t| PaletteEntry::new(SymbolSpec::text(t, font_size)))
        .collect()
}

/// Letters along the top, operators and frames on the left, Greek and
/// common variables on the right.
pub fn default_palettes() -> Vec<PaletteDefinition> {
    let fs = DEFAULT_FONT_SIZE;

    let top = text_entries(('a'..='z').map(String::from), fs);

    let mut left = text_entries(["+", "="], fs);
    left.push(PaletteEntry::new(SymbolSpec::line(48.0)));
    left.push(PaletteEntry::new(SymbolSpec::brackets(48.0, 36.0)));
    left.push(PaletteEntry::new(SymbolSpec::sqrt(48.0, 36.0)));

    let mut right = text_entries(["α", "x", "y", "z", "m", "g"], fs);
    right[0].sub_menu = Some(text_entries(["α", "β", "γ", "δ"], fs));

    vec![
        PaletteDefinition {
            name: "letters".into(),
            dock: Dock::Top,
            entries: top,
        },
        PaletteDefinition {
            name: "operators".into(),
            dock: Dock::Left,
            entries: left,
        },
        PaletteDefinition {
            name: "variables".into(),
            dock: Dock::Right,
            entries: right,
        },
    ]
}
