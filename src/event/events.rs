use egui::{CursorIcon, Rect};

use crate::tools::ToolKind;

/// Notifications for UI collaborators (handle placement, toolbars, cursors)
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// The floating selection moved or changed size
    SelectionChanged {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    /// The floating selection was committed, deleted or cancelled
    SelectionCleared,
    ToolChanged {
        old: ToolKind,
        new: ToolKind,
    },
    HistoryChanged {
        can_undo: bool,
        can_redo: bool,
    },
    CursorChanged(CursorIcon),
}

impl EditorEvent {
    pub fn selection_changed(bounds: Rect) -> Self {
        Self::SelectionChanged {
            x: bounds.min.x,
            y: bounds.min.y,
            width: bounds.width(),
            height: bounds.height(),
        }
    }
}
