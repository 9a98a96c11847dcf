use egui::{Key, Modifiers, PointerButton, Pos2};
use serde::{Deserialize, Serialize};

use crate::command::{Command, SelectionKind};
use crate::config::EditorConfig;
use crate::event::{EditorEvent, EventBus};
use crate::surface::{RasterSurface, Snapshot};

/// Everything a tool may touch while handling one input event.
pub struct ToolContext<'a> {
    pub surface: &'a mut RasterSurface,
    pub settings: &'a ToolSettings,
    pub config: &'a EditorConfig,
    pub events: &'a EventBus,
    pub modifiers: Modifiers,
}

impl ToolContext<'_> {
    pub fn shift(&self) -> bool {
        self.modifiers.shift
    }

    /// Emit a notification to UI collaborators
    pub fn notify(&self, event: EditorEvent) {
        self.events.emit(event);
    }
}

/// What a tool asks the editor to record in history.
#[derive(Debug, Clone)]
pub enum ToolAction {
    /// Run the command; undo restores the base as it is right now
    Execute(Command),
    /// Run the command; undo restores `before`, captured when the gesture
    /// first modified the base
    Commit { command: Command, before: Snapshot },
}

impl ToolAction {
    pub fn command(&self) -> &Command {
        match self {
            ToolAction::Execute(command) | ToolAction::Commit { command, .. } => command,
        }
    }
}

/// Tool trait defines the interface for all drawing and selection tools
pub trait Tool {
    /// Return the name of the tool
    fn name(&self) -> &'static str;

    fn kind(&self) -> ToolKind;

    /// Called when the tool is selected (activated).
    fn activate(&mut self, _ctx: &mut ToolContext<'_>) {}

    /// Called when the tool is deselected. Pending work is finalized and
    /// returned so the editor can record it.
    fn deactivate(&mut self, ctx: &mut ToolContext<'_>) -> Option<ToolAction>;

    /// Handle pointer press on the canvas.
    fn on_pointer_down(&mut self, pos: Pos2, button: PointerButton, ctx: &mut ToolContext<'_>) -> Option<ToolAction>;

    /// Handle pointer movement (pressed or not).
    fn on_pointer_move(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> Option<ToolAction>;

    /// Handle pointer release.
    fn on_pointer_up(&mut self, pos: Pos2, button: PointerButton, ctx: &mut ToolContext<'_>) -> Option<ToolAction>;

    fn on_pointer_leave(&mut self, _ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        None
    }

    fn on_pointer_enter(&mut self, _ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        None
    }

    fn on_double_click(&mut self, _pos: Pos2, _ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        None
    }

    fn on_key_down(&mut self, _key: Key, _ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        None
    }

    fn on_key_up(&mut self, _key: Key, _ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        None
    }

    /// Called after the modifier state in `ctx` changed (Shift constraint).
    fn on_modifiers_changed(&mut self, _ctx: &mut ToolContext<'_>) {}

    /// Name of the current state, for logs and tests
    fn current_state_name(&self) -> &'static str;
}

mod clipboard;
mod line;
mod paint_bucket;
mod resizer;
mod selection;
mod settings;
mod shape;

pub use clipboard::{ClipboardEntry, ClipboardService};
pub use line::LineTool;
pub use paint_bucket::PaintBucketTool;
pub use resizer::{Handle, ResizerHandler};
pub use selection::{
    DragGesture, EllipseGesture, FloatingSelection, GestureOutcome, LassoGesture,
    RectangleGesture, SelectionController, SelectionGesture, SelectionTool, selection_style,
};
pub use settings::ToolSettings;
pub use shape::{EllipseDrawer, PreviewState, RectangleDrawer, ShapeDrawer, ShapeTool};

/// Identifies a tool without its state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    Rectangle,
    Ellipse,
    Line,
    PaintBucket,
    RectangleSelection,
    EllipseSelection,
    LassoSelection,
}

impl ToolKind {
    pub const ALL: [ToolKind; 7] = [
        ToolKind::Rectangle,
        ToolKind::Ellipse,
        ToolKind::Line,
        ToolKind::PaintBucket,
        ToolKind::RectangleSelection,
        ToolKind::EllipseSelection,
        ToolKind::LassoSelection,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Rectangle => "Rectangle",
            ToolKind::Ellipse => "Ellipse",
            ToolKind::Line => "Line",
            ToolKind::PaintBucket => "PaintBucket",
            ToolKind::RectangleSelection => "RectangleSelection",
            ToolKind::EllipseSelection => "EllipseSelection",
            ToolKind::LassoSelection => "LassoSelection",
        }
    }

    pub fn is_selection(&self) -> bool {
        self.selection_kind().is_some()
    }

    pub fn selection_kind(&self) -> Option<SelectionKind> {
        match self {
            ToolKind::RectangleSelection => Some(SelectionKind::Rectangle),
            ToolKind::EllipseSelection => Some(SelectionKind::Ellipse),
            ToolKind::LassoSelection => Some(SelectionKind::Lasso),
            _ => None,
        }
    }

    /// The selection tool that produces regions of `kind`
    pub fn for_selection(kind: SelectionKind) -> ToolKind {
        match kind {
            SelectionKind::Rectangle => ToolKind::RectangleSelection,
            SelectionKind::Ellipse => ToolKind::EllipseSelection,
            SelectionKind::Lasso => ToolKind::LassoSelection,
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Enum representing all available tools
/// This allows us to avoid using Box<dyn Tool> and simplifies memory management
pub enum ToolType {
    Rectangle(ShapeTool<RectangleDrawer>),
    Ellipse(ShapeTool<EllipseDrawer>),
    Line(LineTool),
    PaintBucket(PaintBucketTool),
    RectangleSelection(SelectionController<RectangleGesture>),
    EllipseSelection(SelectionController<EllipseGesture>),
    LassoSelection(SelectionController<LassoGesture>),
}

macro_rules! dispatch {
    ($self:expr, $tool:ident => $body:expr) => {
        match $self {
            ToolType::Rectangle($tool) => $body,
            ToolType::Ellipse($tool) => $body,
            ToolType::Line($tool) => $body,
            ToolType::PaintBucket($tool) => $body,
            ToolType::RectangleSelection($tool) => $body,
            ToolType::EllipseSelection($tool) => $body,
            ToolType::LassoSelection($tool) => $body,
        }
    };
}

impl ToolType {
    /// Factory for a fresh tool of the given kind
    pub fn new(kind: ToolKind, config: &EditorConfig) -> Self {
        match kind {
            ToolKind::Rectangle => Self::Rectangle(ShapeTool::new(RectangleDrawer)),
            ToolKind::Ellipse => Self::Ellipse(ShapeTool::new(EllipseDrawer)),
            ToolKind::Line => Self::Line(LineTool::new()),
            ToolKind::PaintBucket => Self::PaintBucket(PaintBucketTool::new()),
            ToolKind::RectangleSelection => {
                Self::RectangleSelection(SelectionController::new(RectangleGesture::default()))
            }
            ToolKind::EllipseSelection => {
                Self::EllipseSelection(SelectionController::new(EllipseGesture::default()))
            }
            ToolKind::LassoSelection => Self::LassoSelection(SelectionController::new(
                LassoGesture::with_close_radius(config.lasso_close_radius),
            )),
        }
    }

    /// The tool as a selection tool, for clipboard operations
    pub fn as_selection(&self) -> Option<&dyn SelectionTool> {
        match self {
            Self::RectangleSelection(tool) => Some(tool),
            Self::EllipseSelection(tool) => Some(tool),
            Self::LassoSelection(tool) => Some(tool),
            _ => None,
        }
    }

    pub fn as_selection_mut(&mut self) -> Option<&mut dyn SelectionTool> {
        match self {
            Self::RectangleSelection(tool) => Some(tool),
            Self::EllipseSelection(tool) => Some(tool),
            Self::LassoSelection(tool) => Some(tool),
            _ => None,
        }
    }
}

impl std::fmt::Debug for ToolType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolType")
            .field("kind", &self.kind())
            .field("state", &self.current_state_name())
            .finish()
    }
}

impl Tool for ToolType {
    fn name(&self) -> &'static str {
        dispatch!(self, tool => tool.name())
    }

    fn kind(&self) -> ToolKind {
        dispatch!(self, tool => tool.kind())
    }

    fn activate(&mut self, ctx: &mut ToolContext<'_>) {
        dispatch!(self, tool => tool.activate(ctx))
    }

    fn deactivate(&mut self, ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        dispatch!(self, tool => tool.deactivate(ctx))
    }

    fn on_pointer_down(&mut self, pos: Pos2, button: PointerButton, ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        dispatch!(self, tool => tool.on_pointer_down(pos, button, ctx))
    }

    fn on_pointer_move(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        dispatch!(self, tool => tool.on_pointer_move(pos, ctx))
    }

    fn on_pointer_up(&mut self, pos: Pos2, button: PointerButton, ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        dispatch!(self, tool => tool.on_pointer_up(pos, button, ctx))
    }

    fn on_pointer_leave(&mut self, ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        dispatch!(self, tool => tool.on_pointer_leave(ctx))
    }

    fn on_pointer_enter(&mut self, ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        dispatch!(self, tool => tool.on_pointer_enter(ctx))
    }

    fn on_double_click(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        dispatch!(self, tool => tool.on_double_click(pos, ctx))
    }

    fn on_key_down(&mut self, key: Key, ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        dispatch!(self, tool => tool.on_key_down(key, ctx))
    }

    fn on_key_up(&mut self, key: Key, ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        dispatch!(self, tool => tool.on_key_up(key, ctx))
    }

    fn on_modifiers_changed(&mut self, ctx: &mut ToolContext<'_>) {
        dispatch!(self, tool => tool.on_modifiers_changed(ctx))
    }

    fn current_state_name(&self) -> &'static str {
        dispatch!(self, tool => tool.current_state_name())
    }
}
