//! Direct-manipulation canvas for composing math expressions from positioned
//! symbols.
//!
//! Symbols are dragged off palettes onto a canvas, moved, lasso-selected and
//! resized; every geometry change is debounced and sent to an external
//! recognizer that returns typeset MathML. The crate is headless: a host feeds
//! page-space input into [`EquationEditor`] and paints the [`Scene`] it returns.
//!
//! ```ignore
//! let settings = EditorSettings::load();
//! let mut editor = EquationEditor::from_settings(1024.0, 768.0, &settings);
//! editor.handle_input(&RawInput::mouse_down(300.0, 200.0), Instant::now());
//! editor.tick(Instant::now());
//! let scene = editor.scene();
//! ```

pub mod canvas;
pub mod constants;
pub mod editor;
pub mod geometry;
pub mod input;
pub mod layout;
pub mod logging;
pub mod palette;
pub mod perf;
pub mod recognition;
pub mod render;
pub mod settings;
pub mod spatial_index;
pub mod symbol;
pub mod text_metrics;
pub mod types;

pub use canvas::{ChangeNotification, EquationCanvas, InteractionMode, SymbolMap};
pub use editor::{EquationEditor, Target};
pub use geometry::{Point, Rect};
pub use input::{InputDisposition, Key, Modifiers, RawInput};
pub use render::Scene;
pub use settings::EditorSettings;
pub use types::{Symbol, SymbolId, SymbolSpec};
