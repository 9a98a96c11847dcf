use log::{debug, warn};
use uuid::Uuid;

use super::{Command, CommandResult};
use crate::surface::{LayerKind, RasterSurface, Snapshot};

/// A command recorded in history together with the base layer as it was
/// before the command (or the gesture leading to it) touched it.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub command: Command,
    before: Snapshot,
}

impl HistoryEntry {
    fn new(command: Command, before: Snapshot) -> Self {
        Self {
            id: Uuid::new_v4(),
            command,
            before,
        }
    }
}

/// Manages the history of executed commands for undo/redo functionality.
///
/// Commands only mutate forward. Undo restores the base snapshot captured
/// before the command ran; redo re-executes the command.
pub struct CommandHistory {
    /// Stack of commands that can be undone
    undo_stack: Vec<HistoryEntry>,
    /// Stack of commands that can be redone
    redo_stack: Vec<HistoryEntry>,
    /// Maximum undo depth, 0 for unlimited
    limit: usize,
}

impl CommandHistory {
    /// Creates a new empty command history
    pub fn new() -> Self {
        Self::with_limit(0)
    }

    /// Creates a history that keeps at most `limit` undo entries (0 = unlimited)
    pub fn with_limit(limit: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            limit,
        }
    }

    /// Execute a command and add it to the history if successful
    pub fn execute(&mut self, command: Command, surface: &mut RasterSurface) -> CommandResult {
        let before = surface.snapshot(LayerKind::Base);
        self.execute_with_restore(command, before, surface)
    }

    /// Execute a command whose undo state was captured earlier.
    ///
    /// Selection tools lift pixels off the base layer before their command
    /// exists; `before` is the base as it was prior to that lift.
    pub fn execute_with_restore(
        &mut self,
        command: Command,
        before: Snapshot,
        surface: &mut RasterSurface,
    ) -> CommandResult {
        if let Err(err) = command.execute(surface) {
            warn!("{} failed: {}", command.label(), err);
            surface.restore(LayerKind::Base, &before);
            return Err(err);
        }
        debug!("Executed {}", command.label());
        self.undo_stack.push(HistoryEntry::new(command, before));
        self.redo_stack.clear(); // Clear redo stack when new command is executed
        if self.limit > 0 && self.undo_stack.len() > self.limit {
            let overflow = self.undo_stack.len() - self.limit;
            self.undo_stack.drain(..overflow);
        }
        Ok(())
    }

    /// Undo the last executed command. Returns `Ok(false)` when there is
    /// nothing to undo.
    pub fn undo(&mut self, surface: &mut RasterSurface) -> Result<bool, super::CommandError> {
        let Some(entry) = self.undo_stack.pop() else {
            return Ok(false);
        };
        surface.restore(LayerKind::Base, &entry.before);
        debug!("Undid {}", entry.command.label());
        self.redo_stack.push(entry);
        Ok(true)
    }

    /// Redo the last undone command. Returns `Ok(false)` when there is
    /// nothing to redo.
    pub fn redo(&mut self, surface: &mut RasterSurface) -> Result<bool, super::CommandError> {
        let Some(entry) = self.redo_stack.pop() else {
            return Ok(false);
        };
        // The base may have been touched since undo; re-anchor the entry.
        let before = surface.snapshot(LayerKind::Base);
        if let Err(err) = entry.command.execute(surface) {
            warn!("Redo of {} failed: {}", entry.command.label(), err);
            surface.restore(LayerKind::Base, &before);
            self.redo_stack.push(entry);
            return Err(err);
        }
        debug!("Redid {}", entry.command.label());
        self.undo_stack.push(HistoryEntry { before, ..entry });
        Ok(true)
    }

    /// Returns true if there are commands that can be undone
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns true if there are commands that can be redone
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Most recent undoable entry
    pub fn last(&self) -> Option<&HistoryEntry> {
        self.undo_stack.last()
    }

    /// Clear the command history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new()
    }
}
