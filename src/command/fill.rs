use log::debug;
use serde::{Deserialize, Serialize};

use super::{CommandError, CommandResult};
use crate::color::{MAX_COLOR_DISTANCE, Rgba, rgba8_distance};
use crate::surface::{LayerKind, RasterSurface, demultiply, premultiply};

/// Paint bucket fill on the base layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillCommand {
    /// Pixel whose color defines the region
    pub seed: (u32, u32),
    pub color: Rgba,
    /// Largest RGBA distance to the seed color that still gets filled
    pub max_distance: f32,
    /// Contiguous (4-connected) flood fill, or every matching pixel
    pub contiguous: bool,
}

impl FillCommand {
    /// Maps a tolerance percentage onto a color distance threshold.
    pub fn distance_for_tolerance(percent: f32) -> f32 {
        percent.clamp(0.0, 100.0) / 100.0 * MAX_COLOR_DISTANCE
    }

    pub fn execute(&self, surface: &mut RasterSurface) -> CommandResult {
        let width = surface.width();
        let height = surface.height();
        let (sx, sy) = self.seed;
        if sx >= width || sy >= height {
            return Err(CommandError::InvalidParameters(format!(
                "fill seed ({sx}, {sy}) outside {width}x{height} canvas"
            )));
        }
        let layer = surface.layer_mut(LayerKind::Base);
        let Some(pixels) = layer.pixels_mut() else {
            return Ok(());
        };

        let colors: Vec<[u8; 4]> = pixels.iter().map(|p| demultiply(*p)).collect();
        let target = colors[(sy * width + sx) as usize];
        let matches = |color: [u8; 4]| rgba8_distance(color, target) <= self.max_distance;

        let region = if self.contiguous {
            flood_region(&colors, width as usize, height as usize, (sx as usize, sy as usize), matches)
        } else {
            colors.iter().map(|c| matches(*c)).collect()
        };

        let fill = premultiply(self.color.to_rgba8());
        let mut filled = 0usize;
        for (pixel, inside) in pixels.iter_mut().zip(region) {
            if inside {
                *pixel = fill;
                filled += 1;
            }
        }
        debug!("Paint bucket filled {} pixels from ({}, {})", filled, sx, sy);
        Ok(())
    }
}

/// 4-connected region around `seed` whose pixels satisfy `matches`.
fn flood_region(
    colors: &[[u8; 4]],
    width: usize,
    height: usize,
    seed: (usize, usize),
    matches: impl Fn([u8; 4]) -> bool,
) -> Vec<bool> {
    // doubles as the visited set
    let mut region = vec![false; width * height];
    let seed_index = seed.1 * width + seed.0;
    if !matches(colors[seed_index]) {
        return region;
    }

    let mut stack = vec![seed_index];
    region[seed_index] = true;
    while let Some(index) = stack.pop() {
        let (x, y) = (index % width, index / width);
        let mut visit = |next: usize| {
            if !region[next] && matches(colors[next]) {
                region[next] = true;
                stack.push(next);
            }
        };
        if x > 0 {
            visit(index - 1);
        }
        if x + 1 < width {
            visit(index + 1);
        }
        if y > 0 {
            visit(index - width);
        }
        if y + 1 < height {
            visit(index + width);
        }
    }
    region
}
