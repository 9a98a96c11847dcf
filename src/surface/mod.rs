//! Layered raster surface: base, preview and the two floating selection layers.

mod layer;
mod path;

pub use layer::{Layer, SELECTION_DASH, Snapshot, StrokeStyle};
pub use path::{PathShape, bounds_of, map_point};

pub(crate) use layer::{demultiply, premultiply};

use egui::{Pos2, Rect};
use image::RgbaImage;
use log::debug;

use crate::color::WHITE;
use crate::error::SurfaceError;

/// Role of a layer in the surface stack (bottom to top).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// The persistent drawing; only committed commands mutate it
    Base,
    /// Transient tool feedback, redrawn every pointer move
    Preview,
    /// Pixels lifted out of the base during a manipulation
    Selection,
    /// Live resize feedback for the floating selection
    PreviewSelection,
}

/// The four layers of the drawing canvas.
pub struct RasterSurface {
    width: u32,
    height: u32,
    base: Layer,
    preview: Layer,
    selection: Layer,
    preview_selection: Layer,
}

impl RasterSurface {
    /// Creates a surface with a white base, a transparent preview and empty
    /// floating layers.
    pub fn new(width: u32, height: u32) -> Result<Self, SurfaceError> {
        let mut base = Layer::new(width, height)?;
        base.fill(WHITE);
        Ok(Self {
            width,
            height,
            base,
            preview: Layer::new(width, height)?,
            selection: Layer::new(0, 0)?,
            preview_selection: Layer::new(0, 0)?,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Canvas rectangle in surface coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::from_min_size(Pos2::ZERO, egui::vec2(self.width as f32, self.height as f32))
    }

    pub fn layer(&self, kind: LayerKind) -> &Layer {
        match kind {
            LayerKind::Base => &self.base,
            LayerKind::Preview => &self.preview,
            LayerKind::Selection => &self.selection,
            LayerKind::PreviewSelection => &self.preview_selection,
        }
    }

    pub fn layer_mut(&mut self, kind: LayerKind) -> &mut Layer {
        match kind {
            LayerKind::Base => &mut self.base,
            LayerKind::Preview => &mut self.preview,
            LayerKind::Selection => &mut self.selection,
            LayerKind::PreviewSelection => &mut self.preview_selection,
        }
    }

    /// Resizes the canvas. Base content is kept anchored at the top-left and
    /// new area is white; the other layers are reallocated empty.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        let previous = self.base.snapshot();
        let mut base = Layer::new(width, height)?;
        base.fill(WHITE);
        match previous.to_image() {
            Some(image) if !base.is_empty() => base.put_image_data(&image, 0, 0)?,
            _ => {}
        }
        self.base = base;
        self.preview = Layer::new(width, height)?;
        self.width = width;
        self.height = height;
        self.reset_floating()?;
        debug!("Surface resized to {}x{}", width, height);
        Ok(())
    }

    /// Resets a layer to fully transparent.
    pub fn clear(&mut self, kind: LayerKind) {
        self.layer_mut(kind).clear();
    }

    /// Reads a region of a layer; `None` for zero-sized layers or regions.
    pub fn get_image_data(&self, kind: LayerKind, x: i32, y: i32, width: u32, height: u32) -> Option<RgbaImage> {
        self.layer(kind).get_image_data(x, y, width, height)
    }

    pub fn put_image_data(&mut self, kind: LayerKind, image: &RgbaImage, x: i32, y: i32) -> Result<(), SurfaceError> {
        self.layer_mut(kind).put_image_data(image, x, y)
    }

    /// Composites `source_rect` of one layer into `dest` on another, scaling
    /// to fit (`drawImage`).
    pub fn draw_image(&mut self, source: LayerKind, source_rect: Rect, target: LayerKind, dest: Rect) {
        if source == target {
            let snapshot = self.layer(source).snapshot();
            if let Some(pixmap) = snapshot.pixmap() {
                self.layer_mut(target).draw_pixmap(pixmap, source_rect, dest);
            }
            return;
        }
        let Some(pixmap) = self.layer_mut(source).take_pixmap() else {
            return;
        };
        self.layer_mut(target).draw_pixmap(&pixmap, source_rect, dest);
        self.layer_mut(source).put_pixmap(Some(pixmap));
    }

    /// Sizes a floating layer to `width x height` at `position`, clearing it.
    pub fn allocate_floating(&mut self, kind: LayerKind, position: Pos2, width: u32, height: u32) -> Result<(), SurfaceError> {
        let layer = self.layer_mut(kind);
        layer.resize(width, height)?;
        layer.set_position(position);
        Ok(())
    }

    /// Canvas-space placement of a floating layer.
    pub fn floating_position(&self, kind: LayerKind) -> Pos2 {
        self.layer(kind).position()
    }

    pub fn set_floating_position(&mut self, kind: LayerKind, position: Pos2) {
        self.layer_mut(kind).set_position(position);
    }

    /// Zero-sizes both floating layers.
    pub fn reset_floating(&mut self) -> Result<(), SurfaceError> {
        for kind in [LayerKind::Selection, LayerKind::PreviewSelection] {
            self.allocate_floating(kind, Pos2::ZERO, 0, 0)?;
        }
        Ok(())
    }

    pub fn snapshot(&self, kind: LayerKind) -> Snapshot {
        self.layer(kind).snapshot()
    }

    pub fn restore(&mut self, kind: LayerKind, snapshot: &Snapshot) {
        self.layer_mut(kind).restore_snapshot(snapshot);
    }

    /// Straight-alpha RGBA of one base pixel.
    pub fn base_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.base.pixel(x, y)
    }
}
