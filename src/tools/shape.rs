use egui::{CursorIcon, Key, PointerButton, Pos2};
use log::{debug, info};

use super::{Tool, ToolAction, ToolContext, ToolKind};
use crate::command::{
    Command, SelectionRegion, ShapeCommand, ShapeGeometry, ShapeStyle, render_shape, stroke_radii,
};
use crate::event::EditorEvent;
use crate::geometry::{constrain_square, ellipse_center, ellipse_radii, normalize_corners};
use crate::surface::{Layer, LayerKind};

/// Short-lived drag state, rewritten on every pointer move.
///
/// Unlike commands, preview state is mutable; a command is only built from
/// it once, at commit.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewState {
    pub start: Pos2,
    pub end: Pos2,
    /// Force a square / circle
    pub constrained: bool,
    pub style: ShapeStyle,
}

impl PreviewState {
    pub fn has_area(&self) -> bool {
        self.start.x != self.end.x && self.start.y != self.end.y
    }
}

/// Per-shape geometry for drag-to-draw tools and drag selections.
pub trait ShapeDrawer {
    fn name(&self) -> &'static str;

    fn kind(&self) -> ToolKind;

    /// Geometry to stroke/fill, or `None` for a zero-area drag.
    fn geometry(&self, state: &PreviewState) -> Option<ShapeGeometry>;

    /// Region covered by a drag from `start` to `end`.
    fn region(&self, start: Pos2, end: Pos2, constrained: bool) -> Option<SelectionRegion>;

    /// Renders the live preview.
    fn preview(&self, layer: &mut Layer, state: &PreviewState) {
        if let Some(geometry) = self.geometry(state) {
            render_shape(layer, &geometry, &state.style);
        }
    }

    /// Builds the history command for the finished drag.
    fn commit(&self, state: &PreviewState) -> Option<Command> {
        self.geometry(state)
            .map(|geometry| Command::Shape(ShapeCommand::new(geometry, state.style)))
    }
}

/// Corners of the drag box, squared when constrained.
fn drag_corners(start: Pos2, end: Pos2, constrained: bool) -> [Pos2; 2] {
    if constrained {
        constrain_square(start, end)
    } else {
        [start, end]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RectangleDrawer;

impl ShapeDrawer for RectangleDrawer {
    fn name(&self) -> &'static str {
        "Rectangle"
    }

    fn kind(&self) -> ToolKind {
        ToolKind::Rectangle
    }

    fn geometry(&self, state: &PreviewState) -> Option<ShapeGeometry> {
        if !state.has_area() {
            return None;
        }
        let [start, end] = drag_corners(state.start, state.end, state.constrained);
        Some(ShapeGeometry::Rectangle { start, end })
    }

    fn region(&self, start: Pos2, end: Pos2, constrained: bool) -> Option<SelectionRegion> {
        let [start, end] = drag_corners(start, end, constrained);
        let [min, max] = normalize_corners(start, end);
        let region = SelectionRegion::Rectangle(egui::Rect::from_min_max(min, max));
        region.is_valid().then_some(region)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EllipseDrawer;

impl ShapeDrawer for EllipseDrawer {
    fn name(&self) -> &'static str {
        "Ellipse"
    }

    fn kind(&self) -> ToolKind {
        ToolKind::Ellipse
    }

    fn geometry(&self, state: &PreviewState) -> Option<ShapeGeometry> {
        if !state.has_area() {
            return None;
        }
        let center = ellipse_center(state.start, state.end, state.constrained);
        let radii = ellipse_radii(state.start, state.end, state.constrained);
        Some(ShapeGeometry::Ellipse {
            center,
            radii: stroke_radii(radii, state.style.line_width),
        })
    }

    fn region(&self, start: Pos2, end: Pos2, constrained: bool) -> Option<SelectionRegion> {
        let center = ellipse_center(start, end, constrained);
        let radii = ellipse_radii(start, end, constrained);
        let region = SelectionRegion::Ellipse(egui::Rect::from_center_size(center, radii * 2.0));
        region.is_valid().then_some(region)
    }
}

/// Drag-to-draw tool for any `ShapeDrawer`.
#[derive(Debug, Clone)]
pub struct ShapeTool<D: ShapeDrawer> {
    drawer: D,
    preview: Option<PreviewState>,
}

impl<D: ShapeDrawer> ShapeTool<D> {
    pub fn new(drawer: D) -> Self {
        Self { drawer, preview: None }
    }

    pub fn drawer(&self) -> &D {
        &self.drawer
    }

    pub fn preview_state(&self) -> Option<&PreviewState> {
        self.preview.as_ref()
    }

    fn redraw(&self, ctx: &mut ToolContext<'_>) {
        ctx.surface.clear(LayerKind::Preview);
        if let Some(state) = &self.preview {
            self.drawer.preview(ctx.surface.layer_mut(LayerKind::Preview), state);
        }
    }

    fn cancel(&mut self, ctx: &mut ToolContext<'_>) {
        if self.preview.take().is_some() {
            debug!("{} drawing cancelled", self.drawer.name());
        }
        ctx.surface.clear(LayerKind::Preview);
    }

    fn finish(&mut self, ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        let state = self.preview.take()?;
        ctx.surface.clear(LayerKind::Preview);
        match self.drawer.commit(&state) {
            Some(command) => Some(ToolAction::Execute(command)),
            None => {
                debug!("{} drag has no area, nothing drawn", self.drawer.name());
                None
            }
        }
    }
}

impl<D: ShapeDrawer> Tool for ShapeTool<D> {
    fn name(&self) -> &'static str {
        self.drawer.name()
    }

    fn kind(&self) -> ToolKind {
        self.drawer.kind()
    }

    fn activate(&mut self, ctx: &mut ToolContext<'_>) {
        info!("{} tool activated", self.drawer.name());
        ctx.notify(EditorEvent::CursorChanged(CursorIcon::Crosshair));
    }

    fn deactivate(&mut self, ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        self.cancel(ctx);
        None
    }

    fn on_pointer_down(&mut self, pos: Pos2, button: PointerButton, ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        if button != PointerButton::Primary {
            return None;
        }
        self.preview = Some(PreviewState {
            start: pos,
            end: pos,
            constrained: ctx.shift(),
            style: ctx.settings.shape_style(),
        });
        None
    }

    fn on_pointer_move(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        let state = self.preview.as_mut()?;
        state.end = pos;
        state.constrained = ctx.shift();
        self.redraw(ctx);
        None
    }

    fn on_pointer_up(&mut self, pos: Pos2, button: PointerButton, ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        if button != PointerButton::Primary {
            return None;
        }
        let state = self.preview.as_mut()?;
        state.end = pos;
        state.constrained = ctx.shift();
        self.finish(ctx)
    }

    fn on_key_down(&mut self, key: Key, ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        if key == Key::Escape {
            self.cancel(ctx);
        }
        None
    }

    fn on_modifiers_changed(&mut self, ctx: &mut ToolContext<'_>) {
        if let Some(state) = self.preview.as_mut() {
            state.constrained = ctx.shift();
            self.redraw(ctx);
        }
    }

    fn current_state_name(&self) -> &'static str {
        if self.preview.is_some() { "Drawing" } else { "Idle" }
    }
}
