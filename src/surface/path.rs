use egui::{Pos2, Rect, pos2};
use serde::{Deserialize, Serialize};
use tiny_skia::{Path, PathBuilder};

/// Geometry that can be filled, stroked, or used as a clipping region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PathShape {
    /// Axis-aligned rectangle
    Rectangle(Rect),
    /// Ellipse inscribed in the rectangle
    Ellipse(Rect),
    /// Closed polygon; the last vertex connects back to the first
    Polygon(Vec<Pos2>),
    /// Open polyline (only meaningful for strokes)
    Polyline(Vec<Pos2>),
}

impl PathShape {
    /// Axis-aligned bounding box of the geometry.
    pub fn bounds(&self) -> Rect {
        match self {
            Self::Rectangle(rect) | Self::Ellipse(rect) => *rect,
            Self::Polygon(points) | Self::Polyline(points) => bounds_of(points),
        }
    }

    /// Maps the shape from the `from` box onto the `to` box (translate + scale).
    pub fn mapped(&self, from: Rect, to: Rect) -> Self {
        let map = |p: Pos2| map_point(p, from, to);
        match self {
            Self::Rectangle(rect) => Self::Rectangle(Rect::from_two_pos(map(rect.min), map(rect.max))),
            Self::Ellipse(rect) => Self::Ellipse(Rect::from_two_pos(map(rect.min), map(rect.max))),
            Self::Polygon(points) => Self::Polygon(points.iter().copied().map(map).collect()),
            Self::Polyline(points) => Self::Polyline(points.iter().copied().map(map).collect()),
        }
    }

    /// Translates the shape by `(dx, dy)`.
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        let bounds = self.bounds();
        self.mapped(bounds, bounds.translate(egui::vec2(dx, dy)))
    }

    /// Builds the tiny-skia path, or `None` for degenerate geometry.
    pub fn to_path(&self) -> Option<Path> {
        match self {
            Self::Rectangle(rect) => {
                let rect = to_skia_rect(*rect)?;
                Some(PathBuilder::from_rect(rect))
            }
            Self::Ellipse(rect) => PathBuilder::from_oval(to_skia_rect(*rect)?),
            Self::Polygon(points) => {
                let mut builder = polyline_builder(points)?;
                builder.close();
                builder.finish()
            }
            Self::Polyline(points) => polyline_builder(points)?.finish(),
        }
    }
}

fn polyline_builder(points: &[Pos2]) -> Option<PathBuilder> {
    let (first, rest) = points.split_first()?;
    if rest.is_empty() {
        return None;
    }
    let mut builder = PathBuilder::new();
    builder.move_to(first.x, first.y);
    for point in rest {
        builder.line_to(point.x, point.y);
    }
    Some(builder)
}

/// `None` for rectangles without area, which tiny-skia would accept.
fn to_skia_rect(rect: Rect) -> Option<tiny_skia::Rect> {
    if !(rect.width() > 0.0 && rect.height() > 0.0) {
        return None;
    }
    tiny_skia::Rect::from_ltrb(rect.min.x, rect.min.y, rect.max.x, rect.max.y)
}

/// Bounding box of a point list (`Rect::NOTHING` when empty).
pub fn bounds_of(points: &[Pos2]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::NOTHING;
    };
    points
        .iter()
        .fold(Rect::from_min_max(*first, *first), |rect, p| {
            Rect::from_min_max(
                pos2(rect.min.x.min(p.x), rect.min.y.min(p.y)),
                pos2(rect.max.x.max(p.x), rect.max.y.max(p.y)),
            )
        })
}

/// Maps `point` from the `from` box onto the `to` box.
pub fn map_point(point: Pos2, from: Rect, to: Rect) -> Pos2 {
    let sx = if from.width() == 0.0 { 1.0 } else { to.width() / from.width() };
    let sy = if from.height() == 0.0 { 1.0 } else { to.height() / from.height() };
    pos2(
        to.min.x + (point.x - from.min.x) * sx,
        to.min.y + (point.y - from.min.y) * sy,
    )
}
