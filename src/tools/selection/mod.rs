use egui::{CursorIcon, Key, PointerButton, Pos2, Rect, Vec2, pos2};
use log::{debug, info, warn};

use super::resizer::{Handle, ResizerHandler};
use super::{Tool, ToolAction, ToolContext, ToolKind};
use crate::color::BLACK;
use crate::command::{
    Command, FillMode, SelectionCommand, SelectionKind, SelectionRegion, ShapeStyle, erase_shape,
    extract_region, stamp_shape,
};
use crate::error::SurfaceError;
use crate::event::EditorEvent;
use crate::geometry::hit_testing::is_point_in_rect;
use crate::surface::{Layer, LayerKind, StrokeStyle, Snapshot};

mod gesture;
mod lasso;

pub use gesture::{DragGesture, EllipseGesture, GestureOutcome, RectangleGesture, SelectionGesture};
pub use lasso::LassoGesture;

/// Fixed outline style of selection previews (drawn dashed).
///
/// Selection tools never touch the shared `ToolSettings`, so the shape
/// tools' line width, fill mode and colors survive a selection untouched.
pub fn selection_style() -> ShapeStyle {
    ShapeStyle {
        line_width: 1.0,
        fill_mode: FillMode::Outline,
        primary: BLACK,
        secondary: BLACK,
    }
}

/// Pixels lifted out of the base layer (or pasted), waiting to be stamped back.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatingSelection {
    /// Region the content was lifted from
    region: SelectionRegion,
    /// Where the content currently sits, possibly moved and resized
    bounds: Rect,
    /// Lifted pixels, sized to the region's bounding box
    content: Snapshot,
    from_clipboard: bool,
    /// Base layer before the lift, restored on undo
    base_before: Snapshot,
}

impl FloatingSelection {
    /// A selection whose region was just erased from `base_before`.
    pub fn lifted(region: SelectionRegion, content: Snapshot, base_before: Snapshot) -> Self {
        Self {
            bounds: region.bounds(),
            region,
            content,
            from_clipboard: false,
            base_before,
        }
    }

    /// A pasted selection. Nothing was erased, so committing only stamps.
    pub fn from_clipboard(region: SelectionRegion, content: Snapshot, base_before: Snapshot) -> Self {
        Self {
            from_clipboard: true,
            ..Self::lifted(region, content, base_before)
        }
    }

    pub fn region(&self) -> &SelectionRegion {
        &self.region
    }

    /// Top-left corner the content was lifted from.
    pub fn origin(&self) -> Pos2 {
        self.region.bounds().min
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn content(&self) -> &Snapshot {
        &self.content
    }

    pub fn is_from_clipboard(&self) -> bool {
        self.from_clipboard
    }

    pub fn base_before(&self) -> &Snapshot {
        &self.base_before
    }

    /// The region at the current position and size.
    pub fn current_region(&self) -> SelectionRegion {
        self.region.mapped_to(self.bounds)
    }

    fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    /// The content scaled to the current bounds and clipped to the region.
    pub fn rendered(&self) -> Result<Snapshot, SurfaceError> {
        let size = self.bounds.size();
        let mut layer = Layer::new(size.x.round() as u32, size.y.round() as u32)?;
        if layer.is_empty() {
            return Ok(Snapshot::empty());
        }
        let local = Rect::from_min_size(Pos2::ZERO, size);
        stamp_shape(&mut layer, &self.region.shape_at(local), &self.content, local)?;
        Ok(layer.snapshot())
    }

    /// The history command that stamps this selection onto the base.
    pub fn to_command(&self) -> Command {
        Command::Selection(SelectionCommand {
            region: self.region.clone(),
            destination: self.bounds,
            content: self.content.clone(),
            from_clipboard: self.from_clipboard,
        })
    }
}

/// Operations shared by every selection tool, used by the clipboard and the
/// editor's shortcuts.
pub trait SelectionTool {
    fn selection_kind(&self) -> SelectionKind;

    fn floating(&self) -> Option<&FloatingSelection>;

    fn is_manipulating(&self) -> bool {
        self.floating().is_some()
    }

    /// Ends the manipulation, returning the command that stamps the floating
    /// selection back. `None` when nothing is floating.
    fn commit(&mut self, ctx: &mut ToolContext<'_>) -> Option<ToolAction>;

    /// Drops the floating selection without stamping it back.
    fn discard(&mut self, ctx: &mut ToolContext<'_>) -> Option<FloatingSelection>;

    /// Starts manipulating `floating` (a paste). Any active floating
    /// selection must have been committed first.
    fn load(&mut self, floating: FloatingSelection, ctx: &mut ToolContext<'_>);

    /// Moves the floating selection. Returns false when nothing is floating.
    fn translate(&mut self, dx: f32, dy: f32, ctx: &mut ToolContext<'_>) -> bool;

    /// Lifts `region` as if it had just been drawn. Returns whether a
    /// floating selection now exists.
    fn select_region(&mut self, region: SelectionRegion, ctx: &mut ToolContext<'_>) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Drag {
    Move { grab: Vec2 },
    Resize { handle: Handle, anchor: Rect },
}

#[derive(Debug, Clone, PartialEq)]
enum ControllerState {
    Idle,
    Selecting,
    Manipulating {
        floating: FloatingSelection,
        drag: Option<Drag>,
    },
}

/// Selection life cycle shared by the rectangle, ellipse and lasso tools.
///
/// `Idle -> Selecting` on a primary press, `Selecting -> Manipulating` once
/// the gesture yields a region (its pixels are lifted into the selection
/// layer), and back to `Idle` on commit. Escape cancels while selecting but
/// commits while manipulating.
#[derive(Debug, Clone)]
pub struct SelectionController<G: SelectionGesture> {
    gesture: G,
    state: ControllerState,
    resizer: ResizerHandler,
    cursor: CursorIcon,
    last_pointer: Pos2,
}

/// Pointer positions are snapped to whole pixels so lifted and stamped
/// regions line up exactly.
fn to_pixel(pos: Pos2) -> Pos2 {
    pos2(pos.x.round(), pos.y.round())
}

impl<G: SelectionGesture> SelectionController<G> {
    pub fn new(gesture: G) -> Self {
        Self {
            gesture,
            state: ControllerState::Idle,
            resizer: ResizerHandler::default(),
            cursor: CursorIcon::Default,
            last_pointer: Pos2::ZERO,
        }
    }

    pub fn gesture(&self) -> &G {
        &self.gesture
    }

    pub fn resizer(&self) -> &ResizerHandler {
        &self.resizer
    }

    pub fn cursor(&self) -> CursorIcon {
        self.cursor
    }

    fn set_cursor(&mut self, cursor: CursorIcon, ctx: &ToolContext<'_>) {
        if self.cursor != cursor {
            self.cursor = cursor;
            ctx.notify(EditorEvent::CursorChanged(cursor));
        }
    }

    fn tool_kind(&self) -> ToolKind {
        ToolKind::for_selection(self.gesture.kind())
    }

    fn draw_gesture_preview(&self, ctx: &mut ToolContext<'_>) {
        ctx.surface.clear(LayerKind::Preview);
        if let Some(outline) = self.gesture.outline() {
            let style = selection_style();
            ctx.surface
                .layer_mut(LayerKind::Preview)
                .stroke_shape(&outline, style.primary, style.line_width, StrokeStyle::Dashed);
        }
    }

    fn cancel_gesture(&mut self, ctx: &mut ToolContext<'_>) {
        self.gesture.reset();
        ctx.surface.clear(LayerKind::Preview);
        if matches!(self.state, ControllerState::Selecting) {
            debug!("{} cancelled", self.gesture.name());
            self.state = ControllerState::Idle;
        }
    }

    fn handle_outcome(&mut self, outcome: GestureOutcome, ctx: &mut ToolContext<'_>) {
        match outcome {
            GestureOutcome::Continue => {
                self.set_cursor(CursorIcon::Crosshair, ctx);
                self.draw_gesture_preview(ctx);
            }
            GestureOutcome::Rejected => {
                self.set_cursor(CursorIcon::NotAllowed, ctx);
                self.draw_gesture_preview(ctx);
            }
            GestureOutcome::Complete(region) => {
                ctx.surface.clear(LayerKind::Preview);
                self.state = ControllerState::Idle;
                self.lift(region, ctx);
            }
            GestureOutcome::Abort => {
                debug!("{} aborted without a region", self.gesture.name());
                ctx.surface.clear(LayerKind::Preview);
                self.state = ControllerState::Idle;
            }
        }
    }

    /// Copies `region` out of the base into a floating selection and erases
    /// it from the base.
    fn lift(&mut self, region: SelectionRegion, ctx: &mut ToolContext<'_>) -> bool {
        let bounds = region.bounds();
        let min_size = ctx.config.min_selection_size;
        if !region.is_valid() || bounds.width() < min_size || bounds.height() < min_size {
            warn!(
                "Ignoring degenerate {:?} selection ({}x{})",
                region.kind(),
                bounds.width(),
                bounds.height()
            );
            return false;
        }

        let base_before = ctx.surface.snapshot(LayerKind::Base);
        let content = match extract_region(ctx.surface, &region) {
            Ok(content) => content,
            Err(err) => {
                warn!("Failed to lift selection: {err}");
                return false;
            }
        };
        if let Err(err) = erase_shape(ctx.surface.layer_mut(LayerKind::Base), &region.to_path_shape()) {
            warn!("Failed to erase lifted region: {err}");
            ctx.surface.restore(LayerKind::Base, &base_before);
            return false;
        }

        info!(
            "Lifted {:?} selection at ({}, {}) size {}x{}",
            region.kind(),
            bounds.min.x,
            bounds.min.y,
            bounds.width(),
            bounds.height()
        );
        self.float(FloatingSelection::lifted(region, content, base_before), ctx);
        true
    }

    fn float(&mut self, floating: FloatingSelection, ctx: &mut ToolContext<'_>) {
        self.state = ControllerState::Manipulating { floating, drag: None };
        self.refresh_floating(ctx);
    }

    /// Redraws both floating layers and the handles for the current bounds.
    fn refresh_floating(&mut self, ctx: &mut ToolContext<'_>) {
        let ControllerState::Manipulating { floating, .. } = &self.state else {
            return;
        };
        let bounds = floating.bounds();
        let (width, height) = (bounds.width().round() as u32, bounds.height().round() as u32);
        let local = Rect::from_min_size(Pos2::ZERO, bounds.size());

        let rendered = match floating.rendered() {
            Ok(rendered) => rendered,
            Err(err) => {
                warn!("Failed to render floating selection: {err}");
                return;
            }
        };
        let outline = floating.region().shape_at(local);

        for kind in [LayerKind::Selection, LayerKind::PreviewSelection] {
            if let Err(err) = ctx.surface.allocate_floating(kind, bounds.min, width, height) {
                warn!("Failed to allocate {kind:?} layer: {err}");
                return;
            }
        }
        ctx.surface.layer_mut(LayerKind::Selection).draw_snapshot(&rendered, local);
        let style = selection_style();
        ctx.surface.layer_mut(LayerKind::PreviewSelection).stroke_shape(
            &outline,
            style.primary,
            style.line_width,
            StrokeStyle::Dashed,
        );

        self.resizer.position(bounds);
        ctx.notify(EditorEvent::selection_changed(bounds));
    }

    fn clear_floating(&mut self, ctx: &mut ToolContext<'_>) {
        if let Err(err) = ctx.surface.reset_floating() {
            warn!("Failed to reset floating layers: {err}");
        }
        self.resizer.reset();
        ctx.notify(EditorEvent::SelectionCleared);
    }

    fn take_floating(&mut self) -> Option<FloatingSelection> {
        match std::mem::replace(&mut self.state, ControllerState::Idle) {
            ControllerState::Manipulating { floating, .. } => Some(floating),
            other => {
                self.state = other;
                None
            }
        }
    }

    fn hover_cursor(&self, pos: Pos2) -> CursorIcon {
        let ControllerState::Manipulating { floating, .. } = &self.state else {
            return CursorIcon::Crosshair;
        };
        if let Some(handle) = self.resizer.hit(pos) {
            handle.cursor_icon()
        } else if is_point_in_rect(pos, floating.bounds()) {
            CursorIcon::Move
        } else {
            CursorIcon::Crosshair
        }
    }

    /// Applies the active drag for a pointer at `pos`.
    fn drag_to(&mut self, pos: Pos2, keep_square: bool, ctx: &mut ToolContext<'_>) {
        let ControllerState::Manipulating { floating, drag: Some(drag) } = &mut self.state else {
            return;
        };
        let bounds = match *drag {
            Drag::Move { grab } => Rect::from_min_size(pos - grab, floating.bounds().size()),
            Drag::Resize { handle, anchor } => handle.resize(anchor, pos, keep_square),
        };
        if bounds.width() < 1.0 || bounds.height() < 1.0 || bounds == floating.bounds() {
            return;
        }
        floating.set_bounds(bounds);
        self.refresh_floating(ctx);
    }
}

impl<G: SelectionGesture> SelectionTool for SelectionController<G> {
    fn selection_kind(&self) -> SelectionKind {
        self.gesture.kind()
    }

    fn floating(&self) -> Option<&FloatingSelection> {
        match &self.state {
            ControllerState::Manipulating { floating, .. } => Some(floating),
            _ => None,
        }
    }

    fn commit(&mut self, ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        let floating = self.take_floating()?;
        self.clear_floating(ctx);
        let bounds = floating.bounds();
        info!(
            "Committing {:?} selection at ({}, {}) size {}x{}",
            floating.region().kind(),
            bounds.min.x,
            bounds.min.y,
            bounds.width(),
            bounds.height()
        );
        Some(ToolAction::Commit {
            command: floating.to_command(),
            before: floating.base_before,
        })
    }

    fn discard(&mut self, ctx: &mut ToolContext<'_>) -> Option<FloatingSelection> {
        let floating = self.take_floating()?;
        debug!("Discarding floating {:?} selection", floating.region().kind());
        self.clear_floating(ctx);
        Some(floating)
    }

    fn load(&mut self, floating: FloatingSelection, ctx: &mut ToolContext<'_>) {
        if self.is_manipulating() {
            warn!("Loading a selection over an uncommitted one; the previous selection is dropped");
        }
        self.cancel_gesture(ctx);
        self.float(floating, ctx);
    }

    fn translate(&mut self, dx: f32, dy: f32, ctx: &mut ToolContext<'_>) -> bool {
        let ControllerState::Manipulating { floating, .. } = &mut self.state else {
            return false;
        };
        floating.set_bounds(floating.bounds().translate(Vec2::new(dx, dy)));
        self.refresh_floating(ctx);
        true
    }

    fn select_region(&mut self, region: SelectionRegion, ctx: &mut ToolContext<'_>) -> bool {
        if self.is_manipulating() {
            warn!("Cannot select a region while another selection is floating");
            return false;
        }
        self.cancel_gesture(ctx);
        self.lift(region, ctx)
    }
}

impl<G: SelectionGesture> Tool for SelectionController<G> {
    fn name(&self) -> &'static str {
        self.gesture.name()
    }

    fn kind(&self) -> ToolKind {
        self.tool_kind()
    }

    fn activate(&mut self, ctx: &mut ToolContext<'_>) {
        info!("{} tool activated", self.gesture.name());
        self.resizer.set_radius(ctx.config.handle_radius);
        self.set_cursor(CursorIcon::Crosshair, ctx);
    }

    fn deactivate(&mut self, ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        self.cancel_gesture(ctx);
        self.commit(ctx)
    }

    fn on_pointer_down(&mut self, pos: Pos2, button: PointerButton, ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        if button != PointerButton::Primary {
            return None;
        }
        let pos = to_pixel(pos);
        self.last_pointer = pos;

        let mut action = None;
        if let ControllerState::Manipulating { floating, drag } = &mut self.state {
            let bounds = floating.bounds();
            if let Some(handle) = self.resizer.hit(pos) {
                debug!("Resizing selection from {}", handle.as_str());
                *drag = Some(Drag::Resize { handle, anchor: bounds });
                return None;
            }
            if is_point_in_rect(pos, bounds) {
                *drag = Some(Drag::Move { grab: pos - bounds.min });
                return None;
            }
            // pressing outside the floating selection finishes it
            action = self.commit(ctx);
        }

        if !self.gesture.is_active() {
            self.state = ControllerState::Selecting;
        }
        let outcome = self.gesture.on_press(pos, ctx.shift());
        self.handle_outcome(outcome, ctx);
        action
    }

    fn on_pointer_move(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        let pos = to_pixel(pos);
        self.last_pointer = pos;
        match &self.state {
            ControllerState::Idle => self.set_cursor(CursorIcon::Crosshair, ctx),
            ControllerState::Selecting => {
                let outcome = self.gesture.on_move(pos, ctx.shift());
                self.handle_outcome(outcome, ctx);
            }
            ControllerState::Manipulating { drag: Some(_), .. } => self.drag_to(pos, ctx.shift(), ctx),
            ControllerState::Manipulating { drag: None, .. } => {
                let cursor = self.hover_cursor(pos);
                self.set_cursor(cursor, ctx);
            }
        }
        None
    }

    fn on_pointer_up(&mut self, pos: Pos2, button: PointerButton, ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        if button != PointerButton::Primary {
            return None;
        }
        let pos = to_pixel(pos);
        self.last_pointer = pos;
        match &mut self.state {
            ControllerState::Selecting => {
                let outcome = self.gesture.on_release(pos, ctx.shift());
                self.handle_outcome(outcome, ctx);
            }
            ControllerState::Manipulating { drag, .. } => {
                if drag.is_some() {
                    self.drag_to(pos, ctx.shift(), ctx);
                    if let ControllerState::Manipulating { drag, .. } = &mut self.state {
                        *drag = None;
                    }
                }
            }
            ControllerState::Idle => {}
        }
        None
    }

    fn on_key_down(&mut self, key: Key, ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        if key != Key::Escape {
            return None;
        }
        match self.state {
            ControllerState::Selecting => {
                self.cancel_gesture(ctx);
                None
            }
            ControllerState::Manipulating { .. } => self.commit(ctx),
            ControllerState::Idle => None,
        }
    }

    fn on_modifiers_changed(&mut self, ctx: &mut ToolContext<'_>) {
        match &self.state {
            ControllerState::Selecting => {
                self.gesture.set_constrained(ctx.shift());
                self.draw_gesture_preview(ctx);
            }
            ControllerState::Manipulating {
                drag: Some(Drag::Resize { .. }),
                ..
            } => self.drag_to(self.last_pointer, ctx.shift(), ctx),
            _ => {}
        }
    }

    fn current_state_name(&self) -> &'static str {
        match self.state {
            ControllerState::Idle => "Idle",
            ControllerState::Selecting => "Selecting",
            ControllerState::Manipulating { .. } => "Manipulating",
        }
    }
}
