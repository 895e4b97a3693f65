//! Pointer and keyboard input for the editor.
//!
//! ## Architecture
//!
//! Raw host events are normalized by the gesture layer into grab/drag/drop/click
//! events per target. The canvas tracks the interaction in progress with an
//! explicit state machine (`InputState`) so impossible combinations of flags
//! cannot be represented.
//!
//! ## Modules
//!
//! - `gesture` - Gesture adapter and router (mouse + single-finger touch)
//! - `state` - Canvas input state machine
//! - `coords` - Page to canvas-local coordinate conversion

pub mod coords;
pub mod gesture;
mod state;

pub use gesture::{
    GestureAdapter, GestureEvent, GestureKind, GestureRouter, Modifiers, PointerSource, RawInput,
    Routed, TargetLocator,
};
pub use state::InputState;

/// Keys the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    Delete,
    Backspace,
    Char(char),
}

/// Whether the host should suppress its default handling of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputDisposition {
    Handled,
    Ignored,
}

impl InputDisposition {
    pub fn from_handled(handled: bool) -> Self {
        if handled { Self::Handled } else { Self::Ignored }
    }

    pub fn is_handled(self) -> bool {
        matches!(self, Self::Handled)
    }
}
