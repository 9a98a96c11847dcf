use serde::{Deserialize, Serialize};

use crate::color::{BLACK, Rgba, WHITE};
use crate::command::{FillMode, ShapeStyle};
use crate::config::EditorConfig;

/// Drawing settings shared by the shape, line and paint bucket tools.
///
/// Setters clamp silently to the configured bounds; out-of-range input is
/// never rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSettings {
    line_width: f32,
    fill_mode: FillMode,
    primary: Rgba,
    secondary: Rgba,
    junction_enabled: bool,
    junction_radius: f32,
    /// Paint bucket tolerance in percent
    tolerance: f32,
    #[serde(skip, default = "default_bounds")]
    bounds: SettingBounds,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SettingBounds {
    min_line_width: f32,
    max_line_width: f32,
    min_junction_radius: f32,
    max_junction_radius: f32,
}

fn default_bounds() -> SettingBounds {
    SettingBounds::from_config(&EditorConfig::default())
}

impl SettingBounds {
    fn from_config(config: &EditorConfig) -> Self {
        Self {
            min_line_width: config.min_border_width,
            max_line_width: config.max_border_width,
            min_junction_radius: config.min_junction_radius,
            max_junction_radius: config.max_junction_radius,
        }
    }
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

impl ToolSettings {
    pub fn from_config(config: &EditorConfig) -> Self {
        let bounds = SettingBounds::from_config(config);
        Self {
            line_width: config.default_line_width.clamp(bounds.min_line_width, bounds.max_line_width),
            fill_mode: FillMode::Outline,
            primary: BLACK,
            secondary: WHITE,
            junction_enabled: false,
            junction_radius: bounds.min_junction_radius,
            tolerance: config.default_tolerance.clamp(0.0, 100.0),
            bounds,
        }
    }

    /// Re-applies configured bounds (after deserializing, for instance).
    pub fn rebind(&mut self, config: &EditorConfig) {
        self.bounds = SettingBounds::from_config(config);
        self.set_line_width(self.line_width);
        self.set_junction_radius(self.junction_radius);
        self.set_tolerance(self.tolerance);
    }

    pub fn line_width(&self) -> f32 {
        self.line_width
    }

    pub fn set_line_width(&mut self, width: f32) {
        let width = if width.is_nan() { self.bounds.min_line_width } else { width };
        self.line_width = width.clamp(self.bounds.min_line_width, self.bounds.max_line_width);
    }

    pub fn fill_mode(&self) -> FillMode {
        self.fill_mode
    }

    pub fn set_fill_mode(&mut self, mode: FillMode) {
        self.fill_mode = mode;
    }

    pub fn primary_color(&self) -> Rgba {
        self.primary
    }

    pub fn set_primary_color(&mut self, color: Rgba) {
        self.primary = clamp_alpha(color);
    }

    pub fn secondary_color(&self) -> Rgba {
        self.secondary
    }

    pub fn set_secondary_color(&mut self, color: Rgba) {
        self.secondary = clamp_alpha(color);
    }

    pub fn junction_enabled(&self) -> bool {
        self.junction_enabled
    }

    pub fn set_junction_enabled(&mut self, enabled: bool) {
        self.junction_enabled = enabled;
    }

    pub fn junction_radius(&self) -> f32 {
        self.junction_radius
    }

    pub fn set_junction_radius(&mut self, radius: f32) {
        let radius = if radius.is_nan() { self.bounds.min_junction_radius } else { radius };
        self.junction_radius = radius.clamp(self.bounds.min_junction_radius, self.bounds.max_junction_radius);
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    pub fn set_tolerance(&mut self, percent: f32) {
        self.tolerance = if percent.is_nan() { 0.0 } else { percent.clamp(0.0, 100.0) };
    }

    /// Junction dot radius, when junctions are enabled.
    pub fn junction(&self) -> Option<f32> {
        self.junction_enabled.then_some(self.junction_radius)
    }

    /// Style captured into shape commands and previews.
    pub fn shape_style(&self) -> ShapeStyle {
        ShapeStyle {
            line_width: self.line_width,
            fill_mode: self.fill_mode,
            primary: self.primary,
            secondary: self.secondary,
        }
    }
}

fn clamp_alpha(color: Rgba) -> Rgba {
    let alpha = if color.alpha.is_nan() { 1.0 } else { color.alpha.clamp(0.0, 1.0) };
    Rgba { alpha, ..color }
}
