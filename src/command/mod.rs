mod clipboard;
mod fill;
mod history;
mod selection;
mod shape;

use thiserror::Error;

use crate::error::SurfaceError;
use crate::surface::RasterSurface;

pub use clipboard::ClipboardCommand;
pub use fill::FillCommand;
pub use history::{CommandHistory, HistoryEntry};
pub use selection::{
    SelectionCommand, SelectionKind, SelectionRegion, erase_shape, extract_region, stamp_shape,
};
pub use shape::{
    FillMode, ShapeCommand, ShapeGeometry, ShapeStyle, inset_rect, render_shape, stroke_radii,
};

/// Result type for command operations
pub type CommandResult = Result<(), CommandError>;

/// Errors that can occur during command execution
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CommandError {
    /// The command parameters are invalid
    #[error("invalid command parameters: {0}")]
    InvalidParameters(String),
    /// The command geometry has no area
    #[error("degenerate geometry")]
    DegenerateGeometry,
    /// The raster surface rejected the operation
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// One deterministic raster mutation of the base layer.
///
/// Commands are immutable values: everything `execute` needs is captured at
/// construction, so replaying the same command on identical pixels always
/// gives identical pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Stamp a rectangle, ellipse or polyline
    Shape(ShapeCommand),
    /// Commit a floating selection
    Selection(SelectionCommand),
    /// Clipboard erase
    Clipboard(ClipboardCommand),
    /// Paint bucket
    Fill(FillCommand),
}

impl Command {
    /// Execute the command against the surface
    pub fn execute(&self, surface: &mut RasterSurface) -> CommandResult {
        match self {
            Command::Shape(command) => command.execute(surface),
            Command::Selection(command) => command.execute(surface),
            Command::Clipboard(command) => command.execute(surface),
            Command::Fill(command) => command.execute(surface),
        }
    }

    /// Short name used in logs
    pub fn label(&self) -> &'static str {
        match self {
            Command::Shape(command) => match command.geometry {
                ShapeGeometry::Rectangle { .. } => "rectangle",
                ShapeGeometry::Ellipse { .. } => "ellipse",
                ShapeGeometry::Line { .. } => "line",
            },
            Command::Selection(command) => match command.region.kind() {
                SelectionKind::Rectangle => "rectangle selection",
                SelectionKind::Ellipse => "ellipse selection",
                SelectionKind::Lasso => "lasso selection",
            },
            Command::Clipboard(_) => "delete selection",
            Command::Fill(command) if command.contiguous => "flood fill",
            Command::Fill(_) => "global fill",
        }
    }
}

impl From<ShapeCommand> for Command {
    fn from(command: ShapeCommand) -> Self {
        Command::Shape(command)
    }
}

impl From<SelectionCommand> for Command {
    fn from(command: SelectionCommand) -> Self {
        Command::Selection(command)
    }
}

impl From<ClipboardCommand> for Command {
    fn from(command: ClipboardCommand) -> Self {
        Command::Clipboard(command)
    }
}

impl From<FillCommand> for Command {
    fn from(command: FillCommand) -> Self {
        Command::Fill(command)
    }
}
