//! Input state machine - the canvas-side state of the gesture in progress.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Panning            (background grab in pan mode)
//! Idle -> Lasso              (background grab in lasso mode)
//! Idle -> DraggingSymbol     (symbol grab)
//! Idle -> MovingSelection    (selection move handle grab)
//! Idle -> Resizing           (resize handle grab, exactly one symbol selected)
//!
//! Any -> Idle                (drop - finalizes operation)
//! ```

use std::collections::BTreeMap;

use crate::geometry::{Point, Rect};
use crate::types::{Symbol, SymbolId};

/// Unified input state for canvas interactions.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No active input operation
    #[default]
    Idle,

    /// Background drag translating every symbol
    Panning,

    /// Rectangle selection, in canvas-local coordinates
    Lasso { origin: Point, current: Point },

    /// A symbol (and possibly the rest of the selection) being dragged
    DraggingSymbol { grabbed: SymbolId },

    /// The selection box move handle is being dragged
    MovingSelection,

    /// Resize handle drag; each selected symbol as it was at grab time
    Resizing { snapshots: BTreeMap<SymbolId, Symbol> },
}

impl InputState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_panning(&self) -> bool {
        matches!(self, Self::Panning)
    }

    pub fn is_lasso(&self) -> bool {
        matches!(self, Self::Lasso { .. })
    }

    pub fn is_resizing(&self) -> bool {
        matches!(self, Self::Resizing { .. })
    }

    pub fn reset(&mut self) {
        *self = Self::Idle;
    }

    pub fn start_lasso(&mut self, origin: Point) {
        *self = Self::Lasso {
            origin,
            current: origin,
        };
    }

    /// Update lasso corner; returns the new rectangle.
    pub fn set_lasso_current(&mut self, to: Point) -> Option<Rect> {
        if let Self::Lasso { origin, current } = self {
            *current = to;
            Some(Rect::from_corners(*origin, to))
        } else {
            None
        }
    }

    pub fn lasso_origin(&self) -> Option<Point> {
        match self {
            Self::Lasso { origin, .. } => Some(*origin),
            _ => None,
        }
    }

    /// The lasso rectangle, once the pointer has moved.
    pub fn lasso_rect(&self) -> Option<Rect> {
        match self {
            Self::Lasso { origin, current } if origin != current => {
                Some(Rect::from_corners(*origin, *current))
            }
            _ => None,
        }
    }

    pub fn dragged_symbol(&self) -> Option<SymbolId> {
        match self {
            Self::DraggingSymbol { grabbed } => Some(*grabbed),
            _ => None,
        }
    }

    pub fn resize_snapshots(&self) -> Option<&BTreeMap<SymbolId, Symbol>> {
        match self {
            Self::Resizing { snapshots } => Some(snapshots),
            _ => None,
        }
    }
}
