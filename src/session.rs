use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tools::{ToolKind, ToolSettings};
use crate::util::time;

/// Errors that can occur while saving or loading a session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to serialize session: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to access session file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session version {found} is not compatible with {expected}")]
    VersionMismatch { found: String, expected: String },
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// The editor state worth keeping between runs: drawing settings and the
/// active tool. Pixels are not part of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub settings: ToolSettings,
    pub active_tool: ToolKind,
    /// Version of the crate that wrote the snapshot
    pub version: String,
    /// Seconds since the UNIX epoch
    pub timestamp: u64,
}

impl SessionSnapshot {
    pub fn new(settings: ToolSettings, active_tool: ToolKind) -> Self {
        Self {
            settings,
            active_tool,
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: time::timestamp_secs(),
        }
    }

    /// Rejects snapshots written by an incompatible major version.
    pub fn check_version(&self) -> SessionResult<()> {
        let expected = env!("CARGO_PKG_VERSION");
        let major = |version: &str| version.split('.').next().map(str::to_owned);
        if major(&self.version) != major(expected) {
            return Err(SessionError::VersionMismatch {
                found: self.version.clone(),
                expected: expected.to_string(),
            });
        }
        if self.version != expected {
            warn!("Session version {} differs from current version {}", self.version, expected);
        }
        Ok(())
    }
}

/// Persisted-session collaborator.
pub trait SessionStore {
    fn save(&self, snapshot: &SessionSnapshot) -> SessionResult<()>;

    /// Loads the stored session, `None` if nothing was saved yet.
    fn load(&self) -> SessionResult<Option<SessionSnapshot>>;
}

/// Stores the session as pretty-printed JSON in a single file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn save(&self, snapshot: &SessionSnapshot) -> SessionResult<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(&self.path, json)?;
        info!("Saved session to {}", self.path.display());
        Ok(())
    }

    fn load(&self) -> SessionResult<Option<SessionSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&self.path)?;
        let snapshot: SessionSnapshot = serde_json::from_str(&json)?;
        snapshot.check_version()?;
        info!("Loaded session from {}", self.path.display());
        Ok(Some(snapshot))
    }
}
