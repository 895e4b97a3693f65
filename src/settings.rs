//! Editor settings.
//!
//! Stored as JSON at `<config dir>/equation-canvas/settings.json`. Every field
//! is optional on disk; missing fields take their defaults, and a missing file
//! means all defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::constants::{
    CLICK_THRESHOLD, CONFIG_DIR_NAME, DEFAULT_BUTTON_SIZE, DEFAULT_FONT_SIZE,
    RECOGNITION_DEBOUNCE_MS, SETTINGS_FILE_NAME,
};
use crate::palette::{PaletteDefinition, default_palettes};
use crate::recognition::{DisabledRecognizer, ProcessRecognizer, Recognizer};

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No config directory on this platform")]
    NoConfigDir,
}

pub type SettingsResult<T> = Result<T, SettingsError>;

/// External command that answers recognition requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizerCommand {
    pub program: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorSettings {
    pub debounce_ms: u64,
    pub click_threshold: f32,
    pub default_font_size: f32,
    pub button_size: f32,
    pub palettes: Vec<PaletteDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recognizer: Option<RecognizerCommand>,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            debounce_ms: RECOGNITION_DEBOUNCE_MS,
            click_threshold: CLICK_THRESHOLD,
            default_font_size: DEFAULT_FONT_SIZE,
            button_size: DEFAULT_BUTTON_SIZE,
            palettes: default_palettes(),
            recognizer: None,
        }
    }
}

impl EditorSettings {
    /// Load from the default location, falling back to defaults on any error.
    pub fn load() -> Self {
        let Some(path) = default_settings_path() else {
            debug!("No config directory; using default settings");
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        Self::load_from(&path).unwrap_or_else(|e| {
            warn!(path = %path.display(), "Failed to load settings: {e}");
            Self::default()
        })
    }

    pub fn load_from(path: &Path) -> SettingsResult<Self> {
        let content = fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&content)?;
        Ok(settings.sanitized())
    }

    pub fn save_to(&self, path: &Path) -> SettingsResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn save(&self) -> SettingsResult<()> {
        let path = default_settings_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_to(&path)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn recognizer(&self) -> Box<dyn Recognizer> {
        match &self.recognizer {
            Some(cmd) => Box::new(ProcessRecognizer::new(cmd.program.clone(), cmd.args.clone())),
            None => Box::new(DisabledRecognizer),
        }
    }

    /// Replace non-positive sizes with their defaults.
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        self.click_threshold = positive_or(self.click_threshold, defaults.click_threshold);
        self.default_font_size = positive_or(self.default_font_size, defaults.default_font_size);
        self.button_size = positive_or(self.button_size, defaults.button_size);
        self
    }
}

fn positive_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 { value } else { fallback }
}

pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(SETTINGS_FILE_NAME))
}
