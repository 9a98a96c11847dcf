//! Editor configuration loaded from JSON.

use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tunable limits and defaults of the editor.
///
/// Every field has a default, so a partial JSON document is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub min_border_width: f32,
    pub max_border_width: f32,
    pub default_line_width: f32,
    pub min_junction_radius: f32,
    pub max_junction_radius: f32,
    /// Distance to the first lasso point that closes the loop
    pub lasso_close_radius: f32,
    /// Distance to the first line vertex that closes the line on finish
    pub line_close_radius: f32,
    /// Hit radius of resize handles
    pub handle_radius: f32,
    /// Arrow-key nudge distance
    pub nudge_step: f32,
    /// Shift snapping increment for lines, in degrees
    pub angle_snap: f32,
    /// Paint bucket tolerance in percent
    pub default_tolerance: f32,
    /// Undo depth, 0 for unlimited
    pub max_history: usize,
    /// Smallest width/height of a floating selection
    pub min_selection_size: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_width: 800,
            canvas_height: 600,
            min_border_width: 1.0,
            max_border_width: 50.0,
            default_line_width: 5.0,
            min_junction_radius: 1.0,
            max_junction_radius: 50.0,
            lasso_close_radius: 20.0,
            line_close_radius: 20.0,
            handle_radius: 8.0,
            nudge_step: 3.0,
            angle_snap: 45.0,
            default_tolerance: 0.0,
            max_history: 0,
            min_selection_size: 1.0,
        }
    }
}

impl EditorConfig {
    /// Parses and validates a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let mut config: EditorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        info!("Loaded editor config from {}", path.display());
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rejects impossible values and clamps inconsistent ones in place.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(ConfigError::OutOfRange {
                field: "canvas_width/canvas_height",
                reason: format!("canvas must not be empty, got {}x{}", self.canvas_width, self.canvas_height),
            });
        }
        if !(self.min_border_width > 0.0) {
            return Err(ConfigError::OutOfRange {
                field: "min_border_width",
                reason: format!("must be positive, got {}", self.min_border_width),
            });
        }
        if self.max_border_width < self.min_border_width {
            warn!(
                "max_border_width {} below min_border_width {}, raising it",
                self.max_border_width, self.min_border_width
            );
            self.max_border_width = self.min_border_width;
        }
        if self.max_junction_radius < self.min_junction_radius {
            warn!(
                "max_junction_radius {} below min_junction_radius {}, raising it",
                self.max_junction_radius, self.min_junction_radius
            );
            self.max_junction_radius = self.min_junction_radius;
        }
        if !(self.angle_snap > 0.0 && self.angle_snap <= 360.0) {
            return Err(ConfigError::OutOfRange {
                field: "angle_snap",
                reason: format!("must be in (0, 360], got {}", self.angle_snap),
            });
        }

        self.default_line_width = self.default_line_width.clamp(self.min_border_width, self.max_border_width);
        self.default_tolerance = self.default_tolerance.clamp(0.0, 100.0);
        self.lasso_close_radius = self.lasso_close_radius.max(0.0);
        self.line_close_radius = self.line_close_radius.max(0.0);
        self.handle_radius = self.handle_radius.max(1.0);
        self.min_selection_size = self.min_selection_size.max(1.0);
        Ok(())
    }
}
