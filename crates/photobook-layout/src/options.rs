use crate::book::validate_total_pages;
use crate::constants::{AUTOSAVE_DELAY, DEFAULT_TOTAL_PAGES, MAX_HISTORY, MAX_ZOOM, MIN_ZOOM};
use crate::types::*;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Editor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorOptions {
    // Book
    pub total_pages: usize,

    // Undo history depth
    pub history_capacity: usize,

    // Persistence timing
    pub autosave_delay_ms: u64,
    pub settle_delay_ms: u64,

    // Display
    pub thumbnail_strip_height: Option<f32>,
    pub theme: Theme,
    pub zoom: f32,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            total_pages: DEFAULT_TOTAL_PAGES,
            history_capacity: MAX_HISTORY,
            autosave_delay_ms: AUTOSAVE_DELAY.as_millis() as u64,
            settle_delay_ms: 0,
            thumbnail_strip_height: None,
            theme: Theme::Light,
            zoom: 1.0,
        }
    }
}

impl EditorOptions {
    /// Load options from JSON file
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| LayoutError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| LayoutError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        validate_total_pages(self.total_pages)?;

        if self.history_capacity == 0 {
            return Err(LayoutError::Config(
                "History capacity must be at least 1".to_string(),
            ));
        }

        if !(MIN_ZOOM..=MAX_ZOOM).contains(&self.zoom) {
            return Err(LayoutError::Config(format!(
                "Zoom must be within {MIN_ZOOM}..={MAX_ZOOM}, got {}",
                self.zoom
            )));
        }

        if let Some(height) = self.thumbnail_strip_height {
            if !height.is_finite() || height < 0.0 {
                return Err(LayoutError::Config(format!(
                    "Thumbnail strip height must be a non-negative number, got {height}"
                )));
            }
        }

        Ok(())
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Overlay persisted preferences
    pub fn apply_preferences(&mut self, preferences: &Preferences) {
        if validate_total_pages(preferences.total_pages).is_ok() {
            self.total_pages = preferences.total_pages;
        } else {
            log::warn!(
                "Ignoring stored page count {}; keeping {}",
                preferences.total_pages,
                self.total_pages
            );
        }
        self.zoom = crate::layout::clamp_zoom(preferences.zoom);
        self.theme = preferences.theme;
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            total_pages: self.total_pages,
            zoom: self.zoom,
            theme: self.theme,
        }
    }
}

/// User choices kept between sessions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    pub total_pages: usize,
    pub zoom: f32,
    pub theme: Theme,
}
