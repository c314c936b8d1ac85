//! Configuration management for pet
//!
//! Read from `pet.toml` in the working directory when present. Every field is
//! optional; anything missing falls back to the defaults below.

use crate::error::Result;
use crate::menu::Item;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "pet.toml";

/// Smallest font size accepted from the config file
pub const MIN_FONT_SIZE: f32 = 4.0;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub editor: EditorConfig,
    /// Item name -> accelerator, e.g. `save = "ctrl+s"`
    #[serde(default)]
    pub shortcuts: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WindowConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_width")]
    pub width: f32,
    #[serde(default = "default_height")]
    pub height: f32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EditorConfig {
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    /// Monospace TTF/OTF to use instead of probing system fonts
    #[serde(default)]
    pub font_path: Option<PathBuf>,
    #[serde(default = "default_background")]
    pub background: String,
    #[serde(default = "default_foreground")]
    pub foreground: String,
    #[serde(default = "default_caret")]
    pub caret: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_width(),
            height: default_height(),
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            font_size: default_font_size(),
            font_path: None,
            background: default_background(),
            foreground: default_foreground(),
            caret: default_caret(),
        }
    }
}

fn default_title() -> String { "Pet - Tiny Text Editor".to_string() }
fn default_width() -> f32 { 640.0 }
fn default_height() -> f32 { 480.0 }
fn default_font_size() -> f32 { 14.0 }
fn default_background() -> String { "#000000".to_string() }
fn default_foreground() -> String { "#c0c0c0".to_string() }
fn default_caret() -> String { "#ff0000".to_string() }

impl EditorConfig {
    fn sanitize(&mut self) {
        if !(self.font_size.is_finite() && self.font_size >= MIN_FONT_SIZE) {
            log::warn!(
                "font_size {} is unusable (minimum {}), using {}",
                self.font_size,
                MIN_FONT_SIZE,
                default_font_size()
            );
            self.font_size = default_font_size();
        }
    }
}

impl AppConfig {
    /// Load configuration from pet.toml in the working directory
    pub fn load() -> Self {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Load from an explicit path; a missing or malformed file yields the
    /// defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            log::info!("No {} found, using defaults", path.display());
            return Self::default();
        }

        let parsed = std::fs::read_to_string(path)
            .map_err(|e| crate::error::PetError::io(path, e))
            .and_then(|content| Self::from_toml(&content));

        match parsed {
            Ok(config) => {
                log::info!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content)?;
        config.editor.sanitize();
        Ok(config)
    }

    /// Shortcut overrides keyed by item; unknown item names are skipped
    pub fn shortcut_overrides(&self) -> HashMap<Item, String> {
        let mut overrides = HashMap::new();
        for (name, accel) in &self.shortcuts {
            match Item::from_config_name(name) {
                Some(item) => {
                    overrides.insert(item, accel.clone());
                }
                None => log::warn!("Unknown shortcut target {:?}", name),
            }
        }
        overrides
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.window.width, 640.0);
        assert_eq!(config.window.height, 480.0);
        assert_eq!(config.editor.font_size, 14.0);
        assert_eq!(config.editor.caret, "#ff0000");
        assert!(config.editor.font_path.is_none());
        assert!(config.shortcuts.is_empty());
    }

    #[test]
    fn test_partial_sections() {
        let config = AppConfig::from_toml(
            r#"
            [editor]
            font_size = 18.0
            font_path = "/fonts/mono.ttf"

            [shortcuts]
            save = "ctrl+alt+s"
            paste = "ctrl+v"
            "#,
        )
        .unwrap();

        assert_eq!(config.editor.font_size, 18.0);
        assert_eq!(config.editor.font_path, Some(PathBuf::from("/fonts/mono.ttf")));
        assert_eq!(config.editor.background, "#000000");
        assert_eq!(config.window.title, "Pet - Tiny Text Editor");

        let overrides = config.shortcut_overrides();
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides[&Item::Save], "ctrl+alt+s");
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[editor\nfont_size = ").unwrap();

        assert!(AppConfig::from_toml("[editor\n").is_err());
        let config = AppConfig::load_from(&path);
        assert_eq!(config.editor.font_size, 14.0);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join(CONFIG_FILE));
        assert_eq!(config.window.title, "Pet - Tiny Text Editor");
    }

    #[test]
    fn test_unusable_font_size_falls_back() {
        for size in ["0", "-3.5", "1.0", "nan", "inf"] {
            let config = AppConfig::from_toml(&format!("[editor]\nfont_size = {size}")).unwrap();
            assert_eq!(config.editor.font_size, 14.0, "font_size = {size}");
        }
        let config = AppConfig::from_toml("[editor]\nfont_size = 4.0").unwrap();
        assert_eq!(config.editor.font_size, MIN_FONT_SIZE);
    }
}
