//! Unit tests for loading and saving editor settings.

use std::fs;
use std::time::Duration;

use equation_canvas::EditorSettings;
use equation_canvas::palette::{Dock, PaletteDefinition, PaletteEntry};
use equation_canvas::settings::{RecognizerCommand, SettingsError};
use equation_canvas::{EquationEditor, SymbolSpec};
use tempfile::TempDir;

use crate::helpers::{HEIGHT, WIDTH, measurer};

#[test]
fn test_save_then_load_preserves_settings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("settings.json");

    let settings = EditorSettings {
        debounce_ms: 250,
        button_size: 40.0,
        recognizer: Some(RecognizerCommand {
            program: "mathreco".into(),
            args: vec!["--json".to_string()],
        }),
        ..EditorSettings::default()
    };
    settings.save_to(&path).unwrap();

    let loaded = EditorSettings::load_from(&path).unwrap();
    assert_eq!(loaded, settings);
    assert_eq!(loaded.debounce(), Duration::from_millis(250));
}

#[test]
fn test_partial_file_takes_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, r#"{ "debounceMs": 30 }"#).unwrap();

    let loaded = EditorSettings::load_from(&path).unwrap();
    assert_eq!(loaded.debounce_ms, 30);
    assert_eq!(loaded.palettes, EditorSettings::default().palettes);
    assert!(loaded.recognizer.is_none());
}

#[test]
fn test_non_positive_sizes_fall_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, r#"{ "buttonSize": 0, "defaultFontSize": -4, "clickThreshold": 3 }"#).unwrap();

    let loaded = EditorSettings::load_from(&path).unwrap();
    let defaults = EditorSettings::default();
    assert_eq!(loaded.button_size, defaults.button_size);
    assert_eq!(loaded.default_font_size, defaults.default_font_size);
    assert_eq!(loaded.click_threshold, 3.0);
}

#[test]
fn test_invalid_json_is_a_json_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, "{ not json").unwrap();

    let err = EditorSettings::load_from(&path).unwrap_err();
    assert!(matches!(err, SettingsError::Json(_)));
}

#[test]
fn test_missing_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let err = EditorSettings::load_from(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, SettingsError::Io(_)));
}

#[test]
fn test_custom_palettes_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(
        &path,
        r#"{
            "palettes": [
                {
                    "name": "digits",
                    "dock": "top",
                    "entries": [
                        { "type": "text", "token": "0", "fontSize": 48 },
                        { "type": "text", "token": "1", "fontSize": 48,
                          "subMenu": [ { "type": "line", "length": 60 } ] }
                    ]
                }
            ],
            "recognizer": { "program": "/usr/bin/mathreco" }
        }"#,
    )
    .unwrap();

    let loaded = EditorSettings::load_from(&path).unwrap();
    assert_eq!(
        loaded.palettes,
        vec![PaletteDefinition {
            name: "digits".to_string(),
            dock: Dock::Top,
            entries: vec![
                PaletteEntry::new(SymbolSpec::text("0", 48.0)),
                PaletteEntry::new(SymbolSpec::text("1", 48.0))
                    .with_sub_menu(vec![PaletteEntry::new(SymbolSpec::line(60.0))]),
            ],
        }]
    );
    let command = loaded.recognizer.unwrap();
    assert_eq!(command.program.to_str(), Some("/usr/bin/mathreco"));
    assert!(command.args.is_empty());
}

#[test]
fn test_editor_follows_settings() {
    let settings = EditorSettings {
        button_size: 40.0,
        palettes: vec![PaletteDefinition {
            name: "digits".to_string(),
            dock: Dock::Left,
            entries: vec![PaletteEntry::new(SymbolSpec::text("7", 48.0))],
        }],
        ..EditorSettings::default()
    };
    let editor = EquationEditor::new(WIDTH, HEIGHT, &settings, measurer(), settings.recognizer());

    assert_eq!(editor.palettes().len(), 1);
    assert_eq!(editor.palettes()[0].palette.button_size(), 40.0);
    assert_eq!(editor.layout().canvas.left, 40.0);
    assert_eq!(editor.layout().canvas.top, 40.0);
    assert_eq!(editor.recognition_bridge().debounce(), settings.debounce());
}
