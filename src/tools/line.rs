use egui::{CursorIcon, Key, PointerButton, Pos2};
use log::{debug, info};

use super::{Tool, ToolAction, ToolContext, ToolKind};
use crate::command::{Command, ShapeCommand, ShapeGeometry, render_shape};
use crate::event::EditorEvent;
use crate::geometry::{distance, snap_to_angle};
use crate::surface::LayerKind;

/// Click-by-click polyline tool.
///
/// Each click adds a vertex, double-click finishes. Finishing near the first
/// vertex (with at least three vertices) closes the shape. Backspace removes
/// the last vertex; Shift snaps the pending segment to `angle_snap` degrees.
#[derive(Debug, Clone, Default)]
pub struct LineTool {
    points: Vec<Pos2>,
    /// Raw pointer position, snapped when drawn
    cursor: Option<Pos2>,
}

impl LineTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    fn constrain(&self, pos: Pos2, ctx: &ToolContext<'_>) -> Pos2 {
        match self.points.last() {
            Some(&last) if ctx.shift() => snap_to_angle(last, pos, ctx.config.angle_snap),
            _ => pos,
        }
    }

    fn redraw(&self, ctx: &mut ToolContext<'_>) {
        ctx.surface.clear(LayerKind::Preview);
        if self.points.is_empty() {
            return;
        }
        let mut points = self.points.clone();
        if let Some(cursor) = self.cursor {
            let pending = self.constrain(cursor, ctx);
            if points.last() != Some(&pending) {
                points.push(pending);
            }
        }
        let geometry = ShapeGeometry::Line {
            points,
            closed: false,
            junction_radius: ctx.settings.junction(),
        };
        render_shape(
            ctx.surface.layer_mut(LayerKind::Preview),
            &geometry,
            &ctx.settings.shape_style(),
        );
    }

    fn cancel(&mut self, ctx: &mut ToolContext<'_>) {
        if !self.points.is_empty() {
            debug!("Line cancelled with {} points", self.points.len());
        }
        self.points.clear();
        self.cursor = None;
        ctx.surface.clear(LayerKind::Preview);
    }

    fn finish(&mut self, ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        let mut points = std::mem::take(&mut self.points);
        self.cursor = None;
        ctx.surface.clear(LayerKind::Preview);

        let closed = points.len() >= 3
            && distance(points[0], points[points.len() - 1]) <= ctx.config.line_close_radius;
        if closed {
            // the closing click lands near the first vertex, which stands in for it
            points.pop();
        }
        if points.len() < 2 {
            debug!("Line finished with fewer than two points, nothing drawn");
            return None;
        }

        info!("Line committed with {} points (closed: {})", points.len(), closed);
        let geometry = ShapeGeometry::Line {
            points,
            closed,
            junction_radius: ctx.settings.junction(),
        };
        Some(ToolAction::Execute(Command::Shape(ShapeCommand::new(
            geometry,
            ctx.settings.shape_style(),
        ))))
    }
}

impl Tool for LineTool {
    fn name(&self) -> &'static str {
        "Line"
    }

    fn kind(&self) -> ToolKind {
        ToolKind::Line
    }

    fn activate(&mut self, ctx: &mut ToolContext<'_>) {
        info!("Line tool activated");
        ctx.notify(EditorEvent::CursorChanged(CursorIcon::Crosshair));
    }

    fn deactivate(&mut self, ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        self.finish(ctx)
    }

    fn on_pointer_down(&mut self, pos: Pos2, button: PointerButton, ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        if button != PointerButton::Primary {
            return None;
        }
        let pos = self.constrain(pos, ctx);
        if self.points.last() != Some(&pos) {
            self.points.push(pos);
        }
        self.cursor = Some(pos);
        self.redraw(ctx);
        None
    }

    fn on_pointer_move(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        if self.points.is_empty() {
            return None;
        }
        self.cursor = Some(pos);
        self.redraw(ctx);
        None
    }

    fn on_pointer_up(&mut self, _pos: Pos2, _button: PointerButton, _ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        None
    }

    fn on_double_click(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        if self.points.is_empty() {
            return None;
        }
        let pos = self.constrain(pos, ctx);
        if self.points.last() != Some(&pos) {
            self.points.push(pos);
        }
        self.finish(ctx)
    }

    fn on_key_down(&mut self, key: Key, ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        match key {
            Key::Escape => self.cancel(ctx),
            Key::Backspace => {
                self.points.pop();
                if self.points.is_empty() {
                    self.cancel(ctx);
                } else {
                    self.redraw(ctx);
                }
            }
            _ => {}
        }
        None
    }

    fn on_modifiers_changed(&mut self, ctx: &mut ToolContext<'_>) {
        if !self.points.is_empty() {
            self.redraw(ctx);
        }
    }

    fn current_state_name(&self) -> &'static str {
        if self.points.is_empty() { "Idle" } else { "Drawing" }
    }
}
