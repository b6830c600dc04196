//! Editor tuning knobs.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default number of undoable steps kept in history.
pub const DEFAULT_HISTORY_DEPTH: usize = 50;
/// Default snap distance in screen pixels.
pub const DEFAULT_SNAP_THRESHOLD_PX: f64 = 5.0;
/// Default minimum element width/height in document units.
pub const DEFAULT_MIN_ELEMENT_SIZE: f64 = 1.0;
/// Default slop around element bounds when picking, in screen pixels.
pub const DEFAULT_HIT_TOLERANCE_PX: f64 = 2.0;
/// Default resize handle pick radius in screen pixels.
pub const DEFAULT_HANDLE_TOLERANCE_PX: f64 = 8.0;
/// Lowest zoom factor (10%).
pub const DEFAULT_MIN_ZOOM: f64 = 0.1;
/// Highest zoom factor (300%).
pub const DEFAULT_MAX_ZOOM: f64 = 3.0;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Engine configuration. Every field has a default, so partial JSON is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of undoable steps. Oldest entries are evicted first.
    pub history_depth: usize,
    /// Snap distance in screen pixels (scaled by 1/zoom into document units).
    pub snap_threshold_px: f64,
    /// Smallest width/height a resize may produce.
    pub min_element_size: f64,
    /// Pick slop around element bounds, in screen pixels.
    pub hit_tolerance_px: f64,
    /// Resize handle pick radius, in screen pixels.
    pub handle_tolerance_px: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Whether drags snap to other elements.
    pub snapping_enabled: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_depth: DEFAULT_HISTORY_DEPTH,
            snap_threshold_px: DEFAULT_SNAP_THRESHOLD_PX,
            min_element_size: DEFAULT_MIN_ELEMENT_SIZE,
            hit_tolerance_px: DEFAULT_HIT_TOLERANCE_PX,
            handle_tolerance_px: DEFAULT_HANDLE_TOLERANCE_PX,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            snapping_enabled: true,
        }
    }
}

impl EditorConfig {
    /// Parse and validate a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&json)?;
        log::debug!("Loaded editor config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Check that the values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_depth == 0 {
            return Err(ConfigError::Invalid {
                field: "history_depth",
                reason: "must be at least 1".to_string(),
            });
        }
        for (field, value) in [
            ("snap_threshold_px", self.snap_threshold_px),
            ("min_element_size", self.min_element_size),
            ("hit_tolerance_px", self.hit_tolerance_px),
            ("handle_tolerance_px", self.handle_tolerance_px),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{value} is not a non-negative number"),
                });
            }
        }
        if !(self.min_zoom.is_finite() && self.min_zoom > 0.0) {
            return Err(ConfigError::Invalid {
                field: "min_zoom",
                reason: format!("{} must be greater than zero", self.min_zoom),
            });
        }
        if !self.max_zoom.is_finite() || self.max_zoom < self.min_zoom {
            return Err(ConfigError::Invalid {
                field: "max_zoom",
                reason: format!("{} is below min_zoom {}", self.max_zoom, self.min_zoom),
            });
        }
        Ok(())
    }
}
