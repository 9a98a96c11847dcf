use egui::{Pos2, Rect};
use log::{debug, info, warn};

use super::selection::{FloatingSelection, SelectionTool};
use super::{ToolAction, ToolContext};
use crate::command::{ClipboardCommand, Command, SelectionKind, SelectionRegion};
use crate::surface::{LayerKind, Snapshot};

/// Copied selection: its shape anchored at the canvas origin and the pixels
/// as they looked when copied (moved and resized).
#[derive(Debug, Clone, PartialEq)]
pub struct ClipboardEntry {
    pub region: SelectionRegion,
    pub content: Snapshot,
}

impl ClipboardEntry {
    pub fn kind(&self) -> SelectionKind {
        self.region.kind()
    }
}

/// Copy, cut, delete and paste against the active selection tool.
///
/// The service holds no reference to any tool; callers pass the current
/// selection tool for each operation.
#[derive(Debug, Clone, Default)]
pub struct ClipboardService {
    entry: Option<ClipboardEntry>,
}

impl ClipboardService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self) -> Option<&ClipboardEntry> {
        self.entry.as_ref()
    }

    pub fn has_content(&self) -> bool {
        self.entry.is_some()
    }

    /// Stores the floating selection of `tool`. Returns false when nothing
    /// is selected.
    pub fn copy(&mut self, tool: &dyn SelectionTool) -> bool {
        let Some(floating) = tool.floating() else {
            debug!("Copy ignored: no active selection");
            return false;
        };
        let content = match floating.rendered() {
            Ok(content) => content,
            Err(err) => {
                warn!("Failed to copy selection: {err}");
                return false;
            }
        };
        let at_origin = Rect::from_min_size(Pos2::ZERO, floating.bounds().size());
        let region = floating.region().mapped_to(at_origin);
        info!(
            "Copied {:?} selection ({}x{})",
            region.kind(),
            content.width(),
            content.height()
        );
        self.entry = Some(ClipboardEntry { region, content });
        true
    }

    /// Copies, then deletes the selection.
    pub fn cut(&mut self, tool: &mut dyn SelectionTool, ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        if !self.copy(&*tool) {
            return None;
        }
        self.delete(tool, ctx)
    }

    /// Erases the selected region from the base and drops the floating
    /// layers. A pasted selection left no hole, so it is simply dropped.
    pub fn delete(&self, tool: &mut dyn SelectionTool, ctx: &mut ToolContext<'_>) -> Option<ToolAction> {
        let floating = tool.discard(ctx)?;
        if floating.is_from_clipboard() {
            debug!("Deleted a pasted selection before it was committed");
            return None;
        }
        info!("Deleting {:?} selection", floating.region().kind());
        Some(ToolAction::Commit {
            command: Command::Clipboard(ClipboardCommand::Delete {
                region: floating.region().clone(),
            }),
            before: floating.base_before().clone(),
        })
    }

    /// A floating selection holding the clipboard content at the canvas
    /// origin, ready to be loaded into the matching selection tool.
    pub fn paste(&self, ctx: &ToolContext<'_>) -> Option<FloatingSelection> {
        let Some(entry) = &self.entry else {
            debug!("Paste ignored: clipboard is empty");
            return None;
        };
        Some(FloatingSelection::from_clipboard(
            entry.region.clone(),
            entry.content.clone(),
            ctx.surface.snapshot(LayerKind::Base),
        ))
    }
}
