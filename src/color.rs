//! RGBA color type used by tool settings and raster commands.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest Euclidean distance between two colors in 8-bit RGBA space
/// (`sqrt(4 * 255²)`).
pub const MAX_COLOR_DISTANCE: f32 = 510.0;

/// An RGBA color with 8-bit color channels and a floating-point alpha.
///
/// The string form is the canvas one, `rgba(r,g,b,a)`, and round-trips
/// exactly through [`fmt::Display`] and [`FromStr`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    /// Opacity from 0.0 (transparent) to 1.0 (opaque).
    pub alpha: f32,
}

pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0.0);

/// Reasons a color string could not be parsed.
#[derive(Debug, Error, PartialEq)]
pub enum ColorParseError {
    #[error("expected `rgba(r,g,b,a)` or `#rrggbb`, got `{0}`")]
    Syntax(String),
    #[error("channel `{0}` is not an integer in 0-255")]
    Channel(String),
    #[error("alpha `{0}` is not a number in 0-1")]
    Alpha(String),
}

impl Rgba {
    pub const fn new(red: u8, green: u8, blue: u8, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Opaque color.
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::new(red, green, blue, 1.0)
    }

    /// Alpha scaled to an 8-bit channel.
    pub fn alpha_u8(&self) -> u8 {
        (self.alpha.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    /// Builds a color from straight (non-premultiplied) 8-bit channels.
    pub fn from_rgba8(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self::new(red, green, blue, alpha as f32 / 255.0)
    }

    /// Channels as straight 8-bit RGBA.
    pub fn to_rgba8(&self) -> [u8; 4] {
        [self.red, self.green, self.blue, self.alpha_u8()]
    }

    /// Parses a `#rrggbb` hex string (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::Syntax(hex.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| ColorParseError::Channel(hex.to_string()))
        };
        Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Lowercase `#rrggbb` form, ignoring alpha.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }

    /// Euclidean distance to `other` over the four 8-bit channels.
    pub fn distance(&self, other: &Rgba) -> f32 {
        rgba8_distance(self.to_rgba8(), other.to_rgba8())
    }

    pub fn to_skia(&self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.red, self.green, self.blue, self.alpha_u8())
    }

    pub fn to_color32(&self) -> egui::Color32 {
        egui::Color32::from_rgba_unmultiplied(self.red, self.green, self.blue, self.alpha_u8())
    }
}

/// Euclidean distance between two straight 8-bit RGBA pixels.
pub fn rgba8_distance(a: [u8; 4], b: [u8; 4]) -> f32 {
    let sum: u32 = a
        .iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = x.abs_diff(y) as u32;
            d * d
        })
        .sum();
    (sum as f32).sqrt()
}

impl Default for Rgba {
    fn default() -> Self {
        BLACK
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rgba({},{},{},{})",
            self.red, self.green, self.blue, self.alpha
        )
    }
}

impl FromStr for Rgba {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.starts_with('#') {
            return Self::from_hex(trimmed);
        }

        let inner = trimmed
            .strip_prefix("rgba(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| ColorParseError::Syntax(s.to_string()))?;

        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        let [red, green, blue, alpha] = parts.as_slice() else {
            return Err(ColorParseError::Syntax(s.to_string()));
        };

        let channel = |value: &str| {
            value
                .parse::<u8>()
                .map_err(|_| ColorParseError::Channel(value.to_string()))
        };
        let alpha_value = alpha
            .parse::<f32>()
            .ok()
            .filter(|a| (0.0..=1.0).contains(a))
            .ok_or_else(|| ColorParseError::Alpha(alpha.to_string()))?;

        Ok(Self::new(
            channel(*red)?,
            channel(*green)?,
            channel(*blue)?,
            alpha_value,
        ))
    }
}
