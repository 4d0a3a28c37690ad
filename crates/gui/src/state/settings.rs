//! Application settings

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::font::TextStyle;
use crate::scene::SceneConfig;

/// Viewport settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportSettings {
    /// Background color RGB
    pub background_color: [u8; 3],
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Orbit damping factor (fraction of pending motion applied per frame)
    pub damping: f32,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            background_color: [0xF0, 0xF0, 0xF0],
            fov_degrees: 75.0,
            damping: 0.05,
        }
    }
}

/// Where the label font comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSettings {
    /// Setup endpoint called before loading the typeface; empty to skip
    pub setup_url: String,
    pub typeface_url: String,
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            setup_url: "http://localhost:3001/api/setup".to_string(),
            typeface_url: "http://localhost:3001/fonts/helvetiker_regular.typeface.json"
                .to_string(),
        }
    }
}

/// UI settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiSettings {
    /// Font size in points
    pub font_size: f32,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self { font_size: 14.0 }
    }
}

/// All application settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Viewport settings
    #[serde(default)]
    pub viewport: ViewportSettings,
    /// Label font source
    #[serde(default)]
    pub font: FontSettings,
    /// UI settings
    #[serde(default)]
    pub ui: UiSettings,
    /// Directory of the last opened or saved model
    #[serde(default)]
    pub last_directory: Option<PathBuf>,
}

impl AppSettings {
    /// Load settings from file, or return default if not found
    pub fn load() -> Self {
        if let Some(dirs) = directories::ProjectDirs::from("com", "stl-customizer", "stl-customizer") {
            let config_path = dirs.config_dir().join("settings.json");
            if let Ok(json) = std::fs::read_to_string(&config_path) {
                match serde_json::from_str(&json) {
                    Ok(settings) => return settings,
                    Err(e) => tracing::warn!("Ignoring invalid settings file {}: {e}", config_path.display()),
                }
            }
        }
        Self::default()
    }

    /// Save settings to file
    pub fn save(&self) {
        if let Some(dirs) = directories::ProjectDirs::from("com", "stl-customizer", "stl-customizer") {
            let config_dir = dirs.config_dir();
            if std::fs::create_dir_all(config_dir).is_ok() {
                let config_path = config_dir.join("settings.json");
                if let Ok(json) = serde_json::to_string_pretty(self) {
                    if let Err(e) = std::fs::write(&config_path, json) {
                        tracing::warn!("Failed to save settings to {}: {e}", config_path.display());
                    }
                }
            }
        }
    }

    /// Scene configuration derived from these settings
    pub fn scene_config(&self) -> SceneConfig {
        let [r, g, b] = self.viewport.background_color;
        let setup_url = self.font.setup_url.trim();
        SceneConfig {
            clear_color: egui::Color32::from_rgb(r, g, b),
            fov_degrees: self.viewport.fov_degrees.clamp(10.0, 150.0),
            damping: self.viewport.damping,
            text_style: TextStyle::default(),
            font_setup_url: (!setup_url.is_empty()).then(|| setup_url.to_string()),
            font_url: self.font.typeface_url.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_scene_defaults() {
        assert_eq!(AppSettings::default().scene_config(), SceneConfig::default());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: AppSettings =
            serde_json::from_str(r#"{"ui": {"font_size": 18.0}}"#).unwrap();
        assert_eq!(settings.ui.font_size, 18.0);
        assert_eq!(settings.viewport, ViewportSettings::default());
        assert!(settings.last_directory.is_none());
    }

    #[test]
    fn test_empty_setup_url_skips_setup() {
        let mut settings = AppSettings::default();
        settings.font.setup_url = "  ".to_string();
        assert_eq!(settings.scene_config().font_setup_url, None);
    }
}
