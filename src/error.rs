use thiserror::Error;

/// Errors raised by the raster surface.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SurfaceError {
    /// A layer could not be allocated with the requested size
    #[error("cannot allocate a {width}x{height} layer")]
    Allocation { width: u32, height: u32 },
    /// Pixel data does not fit inside the target layer
    #[error("image data at ({x}, {y}) sized {width}x{height} is outside the layer")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
    /// The layer has zero width or height
    #[error("layer is empty")]
    EmptyLayer,
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("config value `{field}` out of range: {reason}")]
    OutOfRange { field: &'static str, reason: String },
}

/// Errors raised while building an editor.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}
