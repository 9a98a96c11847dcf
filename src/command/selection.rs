use egui::{Pos2, Rect};
use serde::{Deserialize, Serialize};

use super::{CommandError, CommandResult};
use crate::color::WHITE;
use crate::error::SurfaceError;
use crate::surface::{Layer, LayerKind, PathShape, RasterSurface, Snapshot, bounds_of};

/// Which selection tool produced a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionKind {
    Rectangle,
    Ellipse,
    Lasso,
}

/// A finalized selection region in canvas coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SelectionRegion {
    Rectangle(Rect),
    /// Ellipse inscribed in the rectangle
    Ellipse(Rect),
    /// Closed polygon (the closing edge back to the first point is implied)
    Lasso(Vec<Pos2>),
}

impl SelectionRegion {
    pub fn kind(&self) -> SelectionKind {
        match self {
            Self::Rectangle(_) => SelectionKind::Rectangle,
            Self::Ellipse(_) => SelectionKind::Ellipse,
            Self::Lasso(_) => SelectionKind::Lasso,
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Self::Rectangle(rect) | Self::Ellipse(rect) => *rect,
            Self::Lasso(points) => bounds_of(points),
        }
    }

    /// Whether the region has a usable, non-zero-area bounding box.
    pub fn is_valid(&self) -> bool {
        let bounds = self.bounds();
        let enough_points = match self {
            Self::Lasso(points) => points.len() >= 3,
            _ => true,
        };
        enough_points && bounds.width() >= 1.0 && bounds.height() >= 1.0
    }

    pub fn to_path_shape(&self) -> PathShape {
        match self {
            Self::Rectangle(rect) => PathShape::Rectangle(*rect),
            Self::Ellipse(rect) => PathShape::Ellipse(*rect),
            Self::Lasso(points) => PathShape::Polygon(points.clone()),
        }
    }

    /// The region's outline once its bounding box is moved/scaled to `dest`.
    pub fn shape_at(&self, dest: Rect) -> PathShape {
        self.to_path_shape().mapped(self.bounds(), dest)
    }

    /// The region with its bounding box moved/scaled to `dest`.
    pub fn mapped_to(&self, dest: Rect) -> SelectionRegion {
        match self.shape_at(dest) {
            PathShape::Rectangle(rect) => Self::Rectangle(rect),
            PathShape::Ellipse(rect) => Self::Ellipse(rect),
            PathShape::Polygon(points) | PathShape::Polyline(points) => Self::Lasso(points),
        }
    }
}

/// Erases `shape` on `layer` by filling it white under a temporary clip.
pub fn erase_shape(layer: &mut Layer, shape: &PathShape) -> Result<(), SurfaceError> {
    layer.save();
    let clipped = layer.clip(shape);
    if clipped.is_ok() {
        layer.fill(WHITE);
    }
    layer.restore();
    clipped
}

/// Draws `content` into `dest` on `layer`, clipped to `shape`.
pub fn stamp_shape(layer: &mut Layer, shape: &PathShape, content: &Snapshot, dest: Rect) -> Result<(), SurfaceError> {
    layer.save();
    let clipped = layer.clip(shape);
    if clipped.is_ok() {
        layer.draw_snapshot(content, dest);
    }
    layer.restore();
    clipped
}

/// Copies the pixels inside `region` from the base layer into a snapshot
/// sized to the region's bounding box. Pixels outside the region stay
/// transparent.
pub fn extract_region(surface: &RasterSurface, region: &SelectionRegion) -> Result<Snapshot, SurfaceError> {
    let bounds = region.bounds();
    let (width, height) = (bounds.width().round() as u32, bounds.height().round() as u32);
    let mut scratch = Layer::new(width, height)?;
    if scratch.is_empty() {
        return Ok(Snapshot::empty());
    }
    let local = Rect::from_min_size(Pos2::ZERO, bounds.size());
    scratch.clip(&region.shape_at(local))?;
    scratch.draw_layer(surface.layer(LayerKind::Base), bounds, local);
    Ok(scratch.snapshot())
}

/// Stamps a floating selection back onto the base layer.
///
/// Unless the content came from the clipboard, the original region is first
/// filled white; the content is then drawn at `destination`, clipped to the
/// region's shape at that position.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionCommand {
    /// Region where the content was lifted from
    pub region: SelectionRegion,
    /// Bounding box the content is stamped into
    pub destination: Rect,
    /// Lifted pixels, sized to the region's bounding box
    pub content: Snapshot,
    pub from_clipboard: bool,
}

impl SelectionCommand {
    pub fn execute(&self, surface: &mut RasterSurface) -> CommandResult {
        if !self.region.is_valid() || self.destination.width() < 1.0 || self.destination.height() < 1.0 {
            return Err(CommandError::DegenerateGeometry);
        }
        let base = surface.layer_mut(LayerKind::Base);
        if !self.from_clipboard {
            erase_shape(base, &self.region.to_path_shape())?;
        }
        stamp_shape(base, &self.region.shape_at(self.destination), &self.content, self.destination)?;
        Ok(())
    }
}
