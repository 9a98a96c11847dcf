use super::{CommandError, CommandResult};
use super::selection::{SelectionRegion, erase_shape};
use crate::surface::{LayerKind, RasterSurface};

/// Raster mutations issued by the clipboard service.
///
/// Pasted content is committed like any other floating selection, through a
/// `SelectionCommand` flagged as coming from the clipboard.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipboardCommand {
    /// Fills the region white (delete and cut)
    Delete { region: SelectionRegion },
}

impl ClipboardCommand {
    pub fn execute(&self, surface: &mut RasterSurface) -> CommandResult {
        let region = self.region();
        if !region.is_valid() {
            return Err(CommandError::DegenerateGeometry);
        }
        let base = surface.layer_mut(LayerKind::Base);
        match self {
            Self::Delete { region } => erase_shape(base, &region.to_path_shape())?,
        }
        Ok(())
    }

    pub fn region(&self) -> &SelectionRegion {
        match self {
            Self::Delete { region } => region,
        }
    }
}
