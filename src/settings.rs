//! User configuration, stored as YAML in the platform config directory.

use anyhow::{Context, Result};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CURRENT_VERSION: u32 = 1;
const SETTINGS_FILENAME: &str = "config.yaml";
const BOOKMARKS_FILENAME: &str = "bookmarks.json";
const APP_NAME: &str = "comicrat";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Start in panel-by-panel view rather than whole-page view.
    #[serde(default = "default_true")]
    pub panel_view: bool,

    /// Directory holding the page images, when not given on the command line.
    #[serde(default)]
    pub images_dir: Option<String>,

    /// Bookmark file override.
    #[serde(default)]
    pub bookmarks_file: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            panel_view: true,
            images_dir: None,
            bookmarks_file: None,
        }
    }
}

impl Settings {
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME))
    }

    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join(SETTINGS_FILENAME))
    }

    pub fn default_bookmarks_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join(BOOKMARKS_FILENAME))
    }

    /// Load the config file, writing one with defaults on first run. Any
    /// failure falls back to defaults; the reader must come up regardless.
    pub fn load_or_create() -> Self {
        let Some(path) = Self::settings_path() else {
            return Self::default();
        };
        if path.exists() {
            match Self::load_from(&path) {
                Ok(settings) => settings,
                Err(e) => {
                    error!("Failed to load settings from {}: {:#}", path.display(), e);
                    Self::default()
                }
            }
        } else {
            let settings = Self::default();
            match settings.save_to(&path) {
                Ok(()) => info!("Wrote default settings to {}", path.display()),
                Err(e) => error!("Failed to write default settings: {:#}", e),
            }
            settings
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_yaml::from_str(&content).context("settings file is not valid YAML")
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let settings: Settings = serde_yaml::from_str("version: 1\n").unwrap();
        assert!(settings.panel_view);
        assert_eq!(settings.images_dir, None);
        assert_eq!(settings.bookmarks_file, None);
    }

    #[test]
    fn round_trips_through_yaml() {
        let mut settings = Settings::default();
        settings.panel_view = false;
        settings.images_dir = Some("pages/".to_string());

        let yaml = serde_yaml::to_string(&settings).unwrap();
        let back: Settings = serde_yaml::from_str(&yaml).unwrap();
        assert!(!back.panel_view);
        assert_eq!(back.images_dir.as_deref(), Some("pages/"));
        assert_eq!(back.version, CURRENT_VERSION);
    }

    #[test]
    fn save_and_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let settings = Settings::default();
        settings.save_to(&path).unwrap();
        let back = Settings::load_from(&path).unwrap();
        assert!(back.panel_view);
    }
}
