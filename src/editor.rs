use egui::{Key, Modifiers};
use log::{debug, info, warn};

use crate::command::{CommandHistory, SelectionRegion};
use crate::config::EditorConfig;
use crate::error::{EditorError, SurfaceError};
use crate::event::{EditorEvent, EventBus, EventHandler};
use crate::input::InputEvent;
use crate::session::SessionSnapshot;
use crate::surface::RasterSurface;
use crate::tools::{
    ClipboardService, Tool, ToolAction, ToolContext, ToolKind, ToolSettings, ToolType,
};

/// Owns the raster surface, the history and the active tool, and routes
/// input to them.
///
/// Everything runs synchronously on the caller's thread: a tool finishes
/// building its command before the history executes it, and the history
/// finishes before the next input is handled.
pub struct Editor {
    surface: RasterSurface,
    history: CommandHistory,
    settings: ToolSettings,
    config: EditorConfig,
    clipboard: ClipboardService,
    events: EventBus,
    tool: ToolType,
    modifiers: Modifiers,
}

fn is_command(modifiers: Modifiers) -> bool {
    modifiers.ctrl || modifiers.command
}

impl Editor {
    /// Validates `config` and builds an editor with a white canvas and the
    /// rectangle tool active.
    pub fn new(mut config: EditorConfig) -> Result<Self, EditorError> {
        config.validate()?;
        let surface = RasterSurface::new(config.canvas_width, config.canvas_height)?;
        info!(
            "Editor created with a {}x{} canvas",
            config.canvas_width, config.canvas_height
        );
        let mut editor = Self {
            surface,
            history: CommandHistory::with_limit(config.max_history),
            settings: ToolSettings::from_config(&config),
            tool: ToolType::new(ToolKind::Rectangle, &config),
            config,
            clipboard: ClipboardService::new(),
            events: EventBus::new(),
            modifiers: Modifiers::NONE,
        };
        let (tool, _, mut ctx) = editor.split();
        tool.activate(&mut ctx);
        Ok(editor)
    }

    fn split(&mut self) -> (&mut ToolType, &mut ClipboardService, ToolContext<'_>) {
        let ctx = ToolContext {
            surface: &mut self.surface,
            settings: &self.settings,
            config: &self.config,
            events: &self.events,
            modifiers: self.modifiers,
        };
        (&mut self.tool, &mut self.clipboard, ctx)
    }

    pub fn surface(&self) -> &RasterSurface {
        &self.surface
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    /// Tool settings contract; every setter clamps to the configured bounds.
    pub fn settings_mut(&mut self) -> &mut ToolSettings {
        &mut self.settings
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn clipboard(&self) -> &ClipboardService {
        &self.clipboard
    }

    pub fn active_tool(&self) -> &ToolType {
        &self.tool
    }

    pub fn tool_kind(&self) -> ToolKind {
        self.tool.kind()
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Registers a notification handler
    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        self.events.subscribe(handler);
    }

    fn notify_history(&self) {
        self.events.emit(EditorEvent::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        });
    }

    /// Runs a tool's command through the history. Returns whether it was
    /// recorded.
    fn apply(&mut self, action: Option<ToolAction>) -> bool {
        let Some(action) = action else {
            return false;
        };
        let label = action.command().label();
        let result = match action {
            ToolAction::Execute(command) => self.history.execute(command, &mut self.surface),
            ToolAction::Commit { command, before } => {
                self.history.execute_with_restore(command, before, &mut self.surface)
            }
        };
        match result {
            Ok(()) => {
                debug!("Recorded {label}");
                self.notify_history();
                true
            }
            Err(err) => {
                warn!("Failed to apply {label}: {err}");
                false
            }
        }
    }

    /// Routes one input event to the shortcuts or the active tool.
    pub fn handle_input(&mut self, event: InputEvent) {
        if let InputEvent::KeyDown { key, modifiers } = event {
            if self.handle_shortcut(key, modifiers) {
                return;
            }
        }
        if let InputEvent::ModifiersChanged(modifiers) = event {
            self.modifiers = modifiers;
        }

        let action = {
            let (tool, _, mut ctx) = self.split();
            match event {
                InputEvent::PointerDown { pos, button } => tool.on_pointer_down(pos, button, &mut ctx),
                InputEvent::PointerMove { pos } => tool.on_pointer_move(pos, &mut ctx),
                InputEvent::PointerUp { pos, button } => tool.on_pointer_up(pos, button, &mut ctx),
                InputEvent::PointerLeave => tool.on_pointer_leave(&mut ctx),
                InputEvent::PointerEnter { .. } => tool.on_pointer_enter(&mut ctx),
                InputEvent::DoubleClick { pos } => tool.on_double_click(pos, &mut ctx),
                InputEvent::KeyDown { key, .. } => tool.on_key_down(key, &mut ctx),
                InputEvent::KeyUp { key, .. } => tool.on_key_up(key, &mut ctx),
                InputEvent::ModifiersChanged(_) => {
                    tool.on_modifiers_changed(&mut ctx);
                    None
                }
            }
        };
        self.apply(action);
    }

    /// Global shortcuts. Returns true when `key` was consumed.
    fn handle_shortcut(&mut self, key: Key, modifiers: Modifiers) -> bool {
        if is_command(modifiers) {
            match key {
                Key::Z if modifiers.shift => {
                    self.redo();
                }
                Key::Z => {
                    self.undo();
                }
                Key::Y => {
                    self.redo();
                }
                Key::C => {
                    self.copy();
                }
                Key::X => {
                    self.cut();
                }
                Key::V => {
                    self.paste();
                }
                Key::A => {
                    self.select_all();
                }
                _ => return false,
            }
            return true;
        }

        let step = self.config.nudge_step;
        match key {
            Key::Delete => self.delete_selection(),
            Key::ArrowLeft => self.translate_selection(-step, 0.0),
            Key::ArrowRight => self.translate_selection(step, 0.0),
            Key::ArrowUp => self.translate_selection(0.0, -step),
            Key::ArrowDown => self.translate_selection(0.0, step),
            _ => false,
        }
    }

    /// Stamps the floating selection back onto the base, if any.
    pub fn commit_selection(&mut self) -> bool {
        let action = {
            let (tool, _, mut ctx) = self.split();
            tool.as_selection_mut().and_then(|selection| selection.commit(&mut ctx))
        };
        self.apply(action)
    }

    /// Commits any active manipulation, then restores the base to its state
    /// before the last command.
    pub fn undo(&mut self) -> bool {
        self.commit_selection();
        match self.history.undo(&mut self.surface) {
            Ok(true) => {
                self.notify_history();
                true
            }
            Ok(false) => {
                debug!("Nothing to undo");
                false
            }
            Err(err) => {
                warn!("Undo failed: {err}");
                false
            }
        }
    }

    pub fn redo(&mut self) -> bool {
        self.commit_selection();
        match self.history.redo(&mut self.surface) {
            Ok(true) => {
                self.notify_history();
                true
            }
            Ok(false) => {
                debug!("Nothing to redo");
                false
            }
            Err(err) => {
                warn!("Redo failed: {err}");
                false
            }
        }
    }

    /// Switches tools. The outgoing tool's pending work is committed first.
    pub fn set_tool(&mut self, kind: ToolKind) {
        let old = self.tool.kind();
        if old == kind {
            return;
        }
        let action = {
            let (tool, _, mut ctx) = self.split();
            tool.deactivate(&mut ctx)
        };
        self.apply(action);

        self.tool = ToolType::new(kind, &self.config);
        let (tool, _, mut ctx) = self.split();
        tool.activate(&mut ctx);
        info!("Switched tool from {old} to {kind}");
        self.events.emit(EditorEvent::ToolChanged { old, new: kind });
    }

    /// Moves the floating selection, e.g. from arrow keys.
    pub fn translate_selection(&mut self, dx: f32, dy: f32) -> bool {
        let (tool, _, mut ctx) = self.split();
        tool.as_selection_mut()
            .is_some_and(|selection| selection.translate(dx, dy, &mut ctx))
    }

    pub fn copy(&mut self) -> bool {
        match self.tool.as_selection() {
            Some(selection) => self.clipboard.copy(selection),
            None => false,
        }
    }

    pub fn cut(&mut self) -> bool {
        let action = {
            let (tool, clipboard, mut ctx) = self.split();
            tool.as_selection_mut()
                .and_then(|selection| clipboard.cut(selection, &mut ctx))
        };
        self.apply(action)
    }

    /// Erases the selected region. Returns whether a selection was active.
    pub fn delete_selection(&mut self) -> bool {
        let (deleted, action) = {
            let (tool, clipboard, mut ctx) = self.split();
            match tool.as_selection_mut() {
                Some(selection) if selection.is_manipulating() => (true, clipboard.delete(selection, &mut ctx)),
                _ => (false, None),
            }
        };
        self.apply(action);
        deleted
    }

    /// Commits the current selection, activates the tool matching the
    /// clipboard's shape and floats the clipboard content at the canvas
    /// origin.
    pub fn paste(&mut self) -> bool {
        let Some(kind) = self.clipboard.entry().map(|entry| entry.kind()) else {
            debug!("Paste ignored: clipboard is empty");
            return false;
        };
        self.commit_selection();
        self.set_tool(ToolKind::for_selection(kind));

        let (tool, clipboard, mut ctx) = self.split();
        let Some(floating) = clipboard.paste(&ctx) else {
            return false;
        };
        let Some(selection) = tool.as_selection_mut() else {
            return false;
        };
        info!("Pasting {kind:?} selection");
        selection.load(floating, &mut ctx);
        true
    }

    /// Lifts the whole canvas into a rectangle selection.
    pub fn select_all(&mut self) -> bool {
        self.commit_selection();
        self.set_tool(ToolKind::RectangleSelection);
        let region = SelectionRegion::Rectangle(self.surface.bounds());
        let (tool, _, mut ctx) = self.split();
        tool.as_selection_mut()
            .is_some_and(|selection| selection.select_region(region, &mut ctx))
    }

    /// Resizes the canvas, keeping the top-left content. History is cleared
    /// since earlier snapshots no longer match the canvas size.
    pub fn resize_canvas(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        self.commit_selection();
        self.surface.resize(width, height)?;
        self.config.canvas_width = width;
        self.config.canvas_height = height;
        self.history.clear();
        self.notify_history();
        info!("Canvas resized to {width}x{height}");
        Ok(())
    }

    /// Settings and active tool, for a `SessionStore`.
    pub fn session_snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::new(self.settings.clone(), self.tool.kind())
    }

    pub fn restore_session(&mut self, snapshot: SessionSnapshot) {
        let mut settings = snapshot.settings;
        settings.rebind(&self.config);
        self.settings = settings;
        self.set_tool(snapshot.active_tool);
        info!("Restored session from {}", snapshot.version);
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("width", &self.surface.width())
            .field("height", &self.surface.height())
            .field("tool", &self.tool)
            .field("undo", &self.history.undo_len())
            .field("redo", &self.history.redo_len())
            .finish()
    }
}
