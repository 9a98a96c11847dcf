use egui::{CursorIcon, PointerButton, Pos2};
use log::{debug, info};

use super::{Tool, ToolAction, ToolContext, ToolKind};
use crate::command::{Command, FillCommand};
use crate::event::EditorEvent;

/// Paint bucket: primary click flood-fills the contiguous region under the
/// pointer, secondary click recolors every matching pixel of the canvas.
#[derive(Debug, Clone, Default)]
pub struct PaintBucketTool;

impl PaintBucketTool {
    pub fn new() -> Self {
        Self
    }
}

impl Tool for PaintBucketTool {
    fn name(&self) -> &'static str {
        "PaintBucket"
    }

    fn kind(&self) -> ToolKind {
        ToolKind::PaintBucket
    }

    fn activate(&mut self, ctx: &mut ToolContext<'_>) {
        info!("Paint bucket tool activated");
        ctx.notify(EditorEvent::CursorChanged(CursorIcon::Crosshair));
    }

    fn deactivate(&mut self, _ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        None
    }

    fn on_pointer_down(&mut self, pos: Pos2, button: PointerButton, ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        let contiguous = match button {
            PointerButton::Primary => true,
            PointerButton::Secondary => false,
            _ => return None,
        };
        if pos.x < 0.0 || pos.y < 0.0 {
            return None;
        }
        let seed = (pos.x.floor() as u32, pos.y.floor() as u32);
        if seed.0 >= ctx.surface.width() || seed.1 >= ctx.surface.height() {
            debug!("Paint bucket click outside the canvas ignored");
            return None;
        }

        Some(ToolAction::Execute(Command::Fill(FillCommand {
            seed,
            color: ctx.settings.primary_color(),
            max_distance: FillCommand::distance_for_tolerance(ctx.settings.tolerance()),
            contiguous,
        })))
    }

    fn on_pointer_move(&mut self, _pos: Pos2, _ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        None
    }

    fn on_pointer_up(&mut self, _pos: Pos2, _button: PointerButton, _ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        None
    }

    fn current_state_name(&self) -> &'static str {
        "Idle"
    }
}
