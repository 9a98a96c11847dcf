use egui::{Pos2, Rect, Vec2, pos2, vec2};
use serde::{Deserialize, Serialize};

use super::CommandResult;
use crate::color::Rgba;
use crate::surface::{Layer, LayerKind, PathShape, RasterSurface, StrokeStyle};

/// How a closed shape is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FillMode {
    /// Stroke only, in the primary color
    #[default]
    Outline,
    /// Fill and stroke, both in the primary color
    FillOnly,
    /// Fill in the primary color, then stroke in the secondary color
    OutlineFill,
}

/// Stroke and fill parameters captured when a shape command is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    pub line_width: f32,
    pub fill_mode: FillMode,
    pub primary: Rgba,
    pub secondary: Rgba,
}

impl ShapeStyle {
    /// Colors used for (fill, stroke); `None` means that part is skipped.
    pub fn paints(&self) -> (Option<Rgba>, Rgba) {
        match self.fill_mode {
            FillMode::Outline => (None, self.primary),
            FillMode::FillOnly => (Some(self.primary), self.primary),
            FillMode::OutlineFill => (Some(self.primary), self.secondary),
        }
    }
}

/// Geometry of a drawn shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShapeGeometry {
    /// Rectangle dragged between two corners (any order)
    Rectangle { start: Pos2, end: Pos2 },
    /// Ellipse with its stroke centerline radii
    Ellipse { center: Pos2, radii: Vec2 },
    /// Polyline; `junction_radius` draws a dot on every vertex
    Line {
        points: Vec<Pos2>,
        closed: bool,
        junction_radius: Option<f32>,
    },
}

/// Draws one shape onto a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeCommand {
    pub geometry: ShapeGeometry,
    pub style: ShapeStyle,
}

impl ShapeCommand {
    pub fn new(geometry: ShapeGeometry, style: ShapeStyle) -> Self {
        Self { geometry, style }
    }

    pub fn execute(&self, surface: &mut RasterSurface) -> CommandResult {
        self.draw(surface.layer_mut(LayerKind::Base));
        Ok(())
    }

    /// Renders the shape onto any layer (used for previews too).
    pub fn draw(&self, layer: &mut Layer) {
        render_shape(layer, &self.geometry, &self.style);
    }
}

/// Paints `geometry` with `style`. Fills are drawn before strokes so the
/// border is never overpainted.
pub fn render_shape(layer: &mut Layer, geometry: &ShapeGeometry, style: &ShapeStyle) {
    let (fill, stroke) = style.paints();
    match geometry {
        ShapeGeometry::Rectangle { start, end } => {
            let inset = inset_rect(*start, *end, style.line_width);
            let shape = if inset.width() > 0.0 && inset.height() > 0.0 {
                PathShape::Rectangle(inset)
            } else {
                // the stroke alone covers a box thinner than the line width
                PathShape::Polyline(vec![inset.min, inset.max])
            };
            if let Some(color) = fill {
                layer.fill_shape(&shape, color, true);
            }
            layer.stroke_shape(&shape, stroke, style.line_width, StrokeStyle::Solid);
        }
        ShapeGeometry::Ellipse { center, radii } => {
            let shape = PathShape::Ellipse(Rect::from_center_size(*center, *radii * 2.0));
            if let Some(color) = fill {
                layer.fill_shape(&shape, color, true);
            }
            layer.stroke_shape(&shape, stroke, style.line_width, StrokeStyle::Solid);
        }
        ShapeGeometry::Line {
            points,
            closed,
            junction_radius,
        } => {
            let shape = if *closed {
                PathShape::Polygon(points.clone())
            } else {
                PathShape::Polyline(points.clone())
            };
            layer.stroke_shape(&shape, style.primary, style.line_width, StrokeStyle::Rounded);
            if let Some(radius) = junction_radius {
                for point in points {
                    let dot = PathShape::Ellipse(Rect::from_center_size(*point, Vec2::splat(radius * 2.0)));
                    layer.fill_shape(&dot, style.primary, true);
                }
            }
        }
    }
}

/// Normalized rectangle shrunk by half the line width so the stroke stays
/// inside the dragged box. Collapses to the center line when too small.
pub fn inset_rect(start: Pos2, end: Pos2, line_width: f32) -> Rect {
    let rect = Rect::from_two_pos(start, end);
    let half = line_width / 2.0;
    let inset_x = half.min(rect.width() / 2.0);
    let inset_y = half.min(rect.height() / 2.0);
    Rect::from_min_max(
        pos2(rect.min.x + inset_x, rect.min.y + inset_y),
        pos2(rect.max.x - inset_x, rect.max.y - inset_y),
    )
}

/// Stroke centerline radii for an ellipse whose outer edge spans `radii`.
pub fn stroke_radii(radii: Vec2, line_width: f32) -> Vec2 {
    let half = line_width / 2.0;
    vec2((radii.x - half).max(0.0), (radii.y - half).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{BLACK, WHITE};

    fn style(fill_mode: FillMode) -> ShapeStyle {
        ShapeStyle {
            line_width: 2.0,
            fill_mode,
            primary: Rgba::rgb(200, 0, 0),
            secondary: Rgba::rgb(0, 0, 200),
        }
    }

    #[test]
    fn fill_modes_pick_colors() {
        assert_eq!(style(FillMode::Outline).paints(), (None, Rgba::rgb(200, 0, 0)));
        assert_eq!(
            style(FillMode::FillOnly).paints(),
            (Some(Rgba::rgb(200, 0, 0)), Rgba::rgb(200, 0, 0))
        );
        assert_eq!(
            style(FillMode::OutlineFill).paints(),
            (Some(Rgba::rgb(200, 0, 0)), Rgba::rgb(0, 0, 200))
        );
    }

    #[test]
    fn inset_rect_keeps_stroke_inside() {
        let rect = inset_rect(pos2(10.0, 10.0), pos2(0.0, 0.0), 4.0);
        assert_eq!(rect, Rect::from_min_max(pos2(2.0, 2.0), pos2(8.0, 8.0)));
        let thin = inset_rect(pos2(0.0, 0.0), pos2(2.0, 10.0), 6.0);
        assert_eq!(thin.width(), 0.0);
    }

    #[test]
    fn outline_fill_strokes_over_fill() {
        let mut surface = RasterSurface::new(20, 20).unwrap();
        let command = ShapeCommand::new(
            ShapeGeometry::Rectangle {
                start: pos2(2.0, 2.0),
                end: pos2(18.0, 18.0),
            },
            style(FillMode::OutlineFill),
        );
        command.execute(&mut surface).unwrap();
        // border pixel (stroke centered on x = 3) and interior pixel
        assert_eq!(surface.base_pixel(2, 10), Some([0, 0, 200, 255]));
        assert_eq!(surface.base_pixel(10, 10), Some([200, 0, 0, 255]));
        assert_eq!(surface.base_pixel(0, 0), Some(WHITE.to_rgba8()));
    }

    #[test]
    fn box_thinner_than_the_line_is_still_painted() {
        let mut surface = RasterSurface::new(20, 20).unwrap();
        let command = ShapeCommand::new(
            ShapeGeometry::Rectangle {
                start: pos2(0.0, 0.0),
                end: pos2(2.0, 10.0),
            },
            ShapeStyle {
                line_width: 6.0,
                ..style(FillMode::Outline)
            },
        );
        command.execute(&mut surface).unwrap();
        assert_eq!(surface.base_pixel(1, 5), Some([200, 0, 0, 255]));
        assert_eq!(surface.base_pixel(10, 5), Some(WHITE.to_rgba8()));
    }

    #[test]
    fn line_with_junctions_marks_vertices() {
        let mut surface = RasterSurface::new(30, 30).unwrap();
        let command = ShapeCommand::new(
            ShapeGeometry::Line {
                points: vec![pos2(5.0, 5.0), pos2(25.0, 5.0)],
                closed: false,
                junction_radius: Some(3.0),
            },
            ShapeStyle {
                line_width: 1.0,
                fill_mode: FillMode::Outline,
                primary: BLACK,
                secondary: WHITE,
            },
        );
        command.execute(&mut surface).unwrap();
        assert_eq!(surface.base_pixel(5, 6), Some([0, 0, 0, 255]));
        assert_eq!(surface.base_pixel(15, 15), Some([255, 255, 255, 255]));
    }
}
