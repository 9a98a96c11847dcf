#![warn(clippy::all, rust_2018_idioms)]

pub mod color;
pub mod command;
pub mod config;
pub mod editor;
pub mod error;
pub mod event;
pub mod geometry;
pub mod input;
pub mod session;
pub mod surface;
pub mod tools;
pub mod util;

pub use color::Rgba;
pub use command::{Command, CommandError, CommandHistory};
pub use config::EditorConfig;
pub use editor::Editor;
pub use error::{ConfigError, EditorError, SurfaceError};
pub use event::{EditorEvent, EventBus};
pub use input::{InputEvent, InputHandler};
pub use session::{FileSessionStore, SessionSnapshot, SessionStore};
pub use surface::{LayerKind, RasterSurface};
pub use tools::{Tool, ToolKind, ToolSettings, ToolType};
