//! Engine-wide constants.
//!
//! Centralizes magic numbers for gestures, symbol geometry and layout so the
//! behavior of the canvas can be read off one file.

// ============================================================================
// Gestures
// ============================================================================

/// A drop whose total displacement stays below this in both axes is a click
pub const CLICK_THRESHOLD: f32 = 2.0;

// ============================================================================
// Symbol Geometry
// ============================================================================

/// Font size of text symbols created from the palettes and the text entry
pub const DEFAULT_FONT_SIZE: f32 = 48.0;

/// Text symbols never shrink below this font size
pub const MIN_FONT_SIZE: f32 = 5.0;

/// Font size grows by this many units per pixel of resize drag
pub const TEXT_RESIZE_GAIN: f32 = 4.0;

/// Lines never get shorter than this
pub const MIN_LINE_LENGTH: f32 = 5.0;

/// A resize cannot pull a line below this visual length
pub const MIN_LINE_VISUAL_LENGTH: f32 = 10.0;

/// Containers never get narrower or shorter than this
pub const MIN_CONTAINER_SIZE: f32 = 10.0;

/// Line thickness is its length divided by this
pub const LINE_THICKNESS_RATIO: f32 = 20.0;

/// Lines are hard to grab, so their hit area is at least this tall
pub const LINE_MIN_HIT_HEIGHT: f32 = 20.0;

/// Padding added around the measured ink of a glyph (left/top)
pub const INK_PADDING: f32 = 1.0;

/// Measured ink boxes kept by the measurement cache
pub const MEASURE_CACHE_CAPACITY: usize = 1024;

// ============================================================================
// Canvas Chrome
// ============================================================================

/// Padding between the selection bounds and the selection box frame
pub const SELECTION_PADDING: f32 = 5.0;

/// Edge length of the selection box handles
pub const HANDLE_SIZE: f32 = 20.0;

/// Edge length of the pan/lasso mode toggles
pub const MODE_TOGGLE_SIZE: f32 = 40.0;

/// Margin between the mode toggles and the canvas edge
pub const MODE_TOGGLE_MARGIN: f32 = 8.0;

/// Height of the typeset equation strip below the canvas
pub const EQUATION_PANEL_HEIGHT: f32 = 96.0;

// ============================================================================
// Palettes
// ============================================================================

/// Default edge length of a palette button
pub const DEFAULT_BUTTON_SIZE: f32 = 48.0;

// ============================================================================
// Recognition
// ============================================================================

/// Quiet period after the last geometry change before recognition runs
pub const RECOGNITION_DEBOUNCE_MS: u64 = 100;

/// Token sent for fraction lines
pub const LINE_TOKEN: &str = ":line";

/// Token sent for square roots
pub const SQRT_TOKEN: &str = ":sqrt";

/// Token sent for brackets
pub const BRACKETS_TOKEN: &str = ":brackets";

/// Type tag carried by every symbol in a recognition request
pub const SYMBOL_TYPE_TAG: &str = "type/symbol";

// ============================================================================
// Configuration
// ============================================================================

/// Directory name under the platform config dir
pub const CONFIG_DIR_NAME: &str = "equation-canvas";

/// Settings file name inside the config dir
pub const SETTINGS_FILE_NAME: &str = "settings.json";
