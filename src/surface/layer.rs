use egui::{Pos2, Rect};
use image::RgbaImage;
use log::debug;
use tiny_skia::{
    FillRule, FilterQuality, LineCap, LineJoin, Mask, Paint, Pixmap, PixmapPaint,
    PremultipliedColorU8, Stroke, StrokeDash, Transform,
};

use super::path::PathShape;
use crate::color::Rgba;
use crate::error::SurfaceError;

/// Dash pattern used for selection outlines.
pub const SELECTION_DASH: [f32; 2] = [5.0, 5.0];

/// How a path outline is stroked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrokeStyle {
    Solid,
    /// Dashed outline, used for in-progress selection geometry
    Dashed,
    /// Round caps and joins, used for polylines
    Rounded,
}

/// A deep copy of a layer's pixel buffer.
///
/// Snapshots are owned byte buffers; cloning one never aliases the layer it
/// came from.
#[derive(Clone, PartialEq)]
pub struct Snapshot {
    pixmap: Option<Pixmap>,
}

impl Snapshot {
    /// An empty (zero-sized) snapshot.
    pub fn empty() -> Self {
        Self { pixmap: None }
    }

    pub fn width(&self) -> u32 {
        self.pixmap.as_ref().map_or(0, Pixmap::width)
    }

    pub fn height(&self) -> u32 {
        self.pixmap.as_ref().map_or(0, Pixmap::height)
    }

    pub fn is_empty(&self) -> bool {
        self.pixmap.is_none()
    }

    /// Raw premultiplied RGBA bytes.
    pub fn data(&self) -> &[u8] {
        self.pixmap.as_ref().map_or(&[] as &[u8], |p| p.data())
    }

    /// Straight-alpha RGBA of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        read_pixel(self.pixmap.as_ref()?, x, y)
    }

    /// Converts to straight-alpha image data.
    pub fn to_image(&self) -> Option<RgbaImage> {
        let pixmap = self.pixmap.as_ref()?;
        let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
        for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
            dst.0 = demultiply(*src);
        }
        Some(image)
    }

    pub(crate) fn pixmap(&self) -> Option<&Pixmap> {
        self.pixmap.as_ref()
    }
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshot")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

/// One raster layer of the surface.
///
/// A layer owns its pixel buffer, its active clip mask and a stack of saved
/// clip states. Zero-sized layers hold no buffer at all; every read on them
/// returns `None` and every draw is a no-op.
pub struct Layer {
    pixmap: Option<Pixmap>,
    clip: Option<Mask>,
    saved_clips: Vec<Option<Mask>>,
    /// Where the layer sits in canvas space (floating layers only)
    position: Pos2,
}

impl Layer {
    /// Allocates a transparent layer. Zero width or height yields an empty layer.
    pub fn new(width: u32, height: u32) -> Result<Self, SurfaceError> {
        Ok(Self {
            pixmap: allocate(width, height)?,
            clip: None,
            saved_clips: Vec::new(),
            position: Pos2::ZERO,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.as_ref().map_or(0, Pixmap::width)
    }

    pub fn height(&self) -> u32 {
        self.pixmap.as_ref().map_or(0, Pixmap::height)
    }

    pub fn is_empty(&self) -> bool {
        self.pixmap.is_none()
    }

    pub fn position(&self) -> Pos2 {
        self.position
    }

    pub fn set_position(&mut self, position: Pos2) {
        self.position = position;
    }

    /// Canvas-space rectangle covered by the layer.
    pub fn bounds(&self) -> Rect {
        Rect::from_min_size(
            self.position,
            egui::vec2(self.width() as f32, self.height() as f32),
        )
    }

    /// Reallocates the buffer, discarding content and clip state.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        self.pixmap = allocate(width, height)?;
        self.clip = None;
        self.saved_clips.clear();
        Ok(())
    }

    /// Resets every pixel to fully transparent, ignoring the clip.
    pub fn clear(&mut self) {
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill(tiny_skia::Color::TRANSPARENT);
        }
    }

    /// Fills the whole layer (respecting the clip).
    pub fn fill(&mut self, color: Rgba) {
        let (width, height) = (self.width() as f32, self.height() as f32);
        let whole = Rect::from_min_size(Pos2::ZERO, egui::vec2(width, height));
        self.fill_shape(&PathShape::Rectangle(whole), color, false);
    }

    /// Pushes the current clip state.
    pub fn save(&mut self) {
        self.saved_clips.push(self.clip.clone());
    }

    /// Pops the last saved clip state. Unbalanced restores are ignored.
    pub fn restore(&mut self) {
        if let Some(clip) = self.saved_clips.pop() {
            self.clip = clip;
        }
    }

    pub fn has_clip(&self) -> bool {
        self.clip.is_some()
    }

    /// Intersects the active clip with the interior of `shape`.
    ///
    /// Masks are not anti-aliased so that extracting and stamping the same
    /// region touch exactly the same pixels. A degenerate shape clips
    /// everything away.
    pub fn clip(&mut self, shape: &PathShape) -> Result<(), SurfaceError> {
        let Some(pixmap) = self.pixmap.as_ref() else {
            return Err(SurfaceError::EmptyLayer);
        };
        let (width, height) = (pixmap.width(), pixmap.height());
        let Some(path) = shape.to_path() else {
            debug!("Degenerate clip shape {:?}, clipping everything", shape);
            self.clip = Some(Mask::new(width, height).ok_or(SurfaceError::Allocation { width, height })?);
            return Ok(());
        };

        match self.clip.as_mut() {
            Some(mask) => mask.intersect_path(&path, FillRule::Winding, false, Transform::identity()),
            None => {
                let mut mask = Mask::new(width, height).ok_or(SurfaceError::Allocation { width, height })?;
                mask.fill_path(&path, FillRule::Winding, false, Transform::identity());
                self.clip = Some(mask);
            }
        }
        Ok(())
    }

    /// Fills the interior of `shape`.
    pub fn fill_shape(&mut self, shape: &PathShape, color: Rgba, anti_alias: bool) {
        let Some(pixmap) = self.pixmap.as_mut() else {
            return;
        };
        let Some(path) = shape.to_path() else {
            return;
        };
        let paint = paint_for(color, anti_alias);
        pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), self.clip.as_ref());
    }

    /// Strokes the outline of `shape`.
    pub fn stroke_shape(&mut self, shape: &PathShape, color: Rgba, width: f32, style: StrokeStyle) {
        let Some(pixmap) = self.pixmap.as_mut() else {
            return;
        };
        let Some(path) = shape.to_path() else {
            return;
        };
        let mut stroke = Stroke {
            width: width.max(0.0),
            ..Stroke::default()
        };
        match style {
            StrokeStyle::Solid => {}
            StrokeStyle::Dashed => {
                stroke.dash = StrokeDash::new(SELECTION_DASH.to_vec(), 0.0);
            }
            StrokeStyle::Rounded => {
                stroke.line_cap = LineCap::Round;
                stroke.line_join = LineJoin::Round;
            }
        }
        let paint = paint_for(color, true);
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), self.clip.as_ref());
    }

    /// Reads a region as straight-alpha image data.
    ///
    /// Pixels outside the layer read as transparent. Returns `None` for an
    /// empty layer or an empty region.
    pub fn get_image_data(&self, x: i32, y: i32, width: u32, height: u32) -> Option<RgbaImage> {
        let pixmap = self.pixmap.as_ref()?;
        if width == 0 || height == 0 {
            return None;
        }
        let mut image = RgbaImage::new(width, height);
        for (dx, dy, pixel) in image.enumerate_pixels_mut() {
            let (sx, sy) = (x + dx as i32, y + dy as i32);
            if sx >= 0 && sy >= 0 {
                if let Some(value) = read_pixel(pixmap, sx as u32, sy as u32) {
                    pixel.0 = value;
                }
            }
        }
        Some(image)
    }

    /// Writes image data at `(x, y)`, replacing pixels without blending or
    /// clipping. Parts that fall outside the layer are dropped; an image that
    /// misses the layer entirely is an error.
    pub fn put_image_data(&mut self, image: &RgbaImage, x: i32, y: i32) -> Result<(), SurfaceError> {
        let pixmap = self.pixmap.as_mut().ok_or(SurfaceError::EmptyLayer)?;
        let (width, height) = (pixmap.width() as i32, pixmap.height() as i32);
        let (image_width, image_height) = image.dimensions();
        if x >= width || y >= height || x + image_width as i32 <= 0 || y + image_height as i32 <= 0 {
            return Err(SurfaceError::OutOfBounds {
                x,
                y,
                width: image_width,
                height: image_height,
            });
        }
        let pixels = pixmap.pixels_mut();
        for (sx, sy, pixel) in image.enumerate_pixels() {
            let (dx, dy) = (x + sx as i32, y + sy as i32);
            if dx < 0 || dy < 0 || dx >= width || dy >= height {
                continue;
            }
            pixels[(dy * width + dx) as usize] = premultiply(pixel.0);
        }
        Ok(())
    }

    /// Straight-alpha RGBA of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        read_pixel(self.pixmap.as_ref()?, x, y)
    }

    /// Deep copy of the pixel buffer.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            pixmap: self.pixmap.clone(),
        }
    }

    /// Replaces the pixel buffer with `snapshot`, resizing the layer to match.
    pub fn restore_snapshot(&mut self, snapshot: &Snapshot) {
        self.pixmap = snapshot.pixmap.clone();
        self.clip = None;
        self.saved_clips.clear();
    }

    /// Draws `snapshot` scaled into `dest` (respecting the clip).
    pub fn draw_snapshot(&mut self, snapshot: &Snapshot, dest: Rect) {
        if let Some(source) = snapshot.pixmap() {
            let source_rect = Rect::from_min_size(
                Pos2::ZERO,
                egui::vec2(source.width() as f32, source.height() as f32),
            );
            self.draw_pixmap(source, source_rect, dest);
        }
    }

    /// Draws `source_rect` of another layer into `dest`.
    pub fn draw_layer(&mut self, source: &Layer, source_rect: Rect, dest: Rect) {
        if let Some(pixmap) = source.pixmap.as_ref() {
            self.draw_pixmap(pixmap, source_rect, dest);
        }
    }

    /// `drawImage` semantics: copies `source_rect` of `source` into `dest`,
    /// scaling as needed. Composites with source-over and respects the clip.
    pub(crate) fn draw_pixmap(&mut self, source: &Pixmap, source_rect: Rect, dest: Rect) {
        let Some(pixmap) = self.pixmap.as_mut() else {
            return;
        };
        if source_rect.width() <= 0.0 || source_rect.height() <= 0.0 || dest.width() <= 0.0 || dest.height() <= 0.0 {
            return;
        }
        let sx = dest.width() / source_rect.width();
        let sy = dest.height() / source_rect.height();
        let quality = if sx == 1.0 && sy == 1.0 {
            FilterQuality::Nearest
        } else {
            FilterQuality::Bilinear
        };
        let paint = PixmapPaint {
            quality,
            ..PixmapPaint::default()
        };
        let transform = Transform::from_row(
            sx,
            0.0,
            0.0,
            sy,
            dest.min.x - source_rect.min.x * sx,
            dest.min.y - source_rect.min.y * sy,
        );

        // Restrict the copy to the source rectangle on top of the layer clip.
        let Some(window) = tiny_skia::Rect::from_ltrb(dest.min.x, dest.min.y, dest.max.x, dest.max.y) else {
            return;
        };
        let window_path = tiny_skia::PathBuilder::from_rect(window);
        let mask = match self.clip.clone() {
            Some(mut mask) => {
                mask.intersect_path(&window_path, FillRule::Winding, false, Transform::identity());
                mask
            }
            None => {
                let Some(mut mask) = Mask::new(pixmap.width(), pixmap.height()) else {
                    return;
                };
                mask.fill_path(&window_path, FillRule::Winding, false, Transform::identity());
                mask
            }
        };
        pixmap.draw_pixmap(0, 0, source.as_ref(), &paint, transform, Some(&mask));
    }

    pub(crate) fn take_pixmap(&mut self) -> Option<Pixmap> {
        self.pixmap.take()
    }

    pub(crate) fn put_pixmap(&mut self, pixmap: Option<Pixmap>) {
        self.pixmap = pixmap;
    }

    pub(crate) fn pixels_mut(&mut self) -> Option<&mut [PremultipliedColorU8]> {
        self.pixmap.as_mut().map(Pixmap::pixels_mut)
    }
}

fn allocate(width: u32, height: u32) -> Result<Option<Pixmap>, SurfaceError> {
    if width == 0 || height == 0 {
        return Ok(None);
    }
    Pixmap::new(width, height)
        .map(Some)
        .ok_or(SurfaceError::Allocation { width, height })
}

fn paint_for(color: Rgba, anti_alias: bool) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color.to_skia());
    paint.anti_alias = anti_alias;
    paint
}

fn read_pixel(pixmap: &Pixmap, x: u32, y: u32) -> Option<[u8; 4]> {
    pixmap.pixel(x, y).map(demultiply)
}

pub(crate) fn demultiply(pixel: PremultipliedColorU8) -> [u8; 4] {
    let color = pixel.demultiply();
    [color.red(), color.green(), color.blue(), color.alpha()]
}

pub(crate) fn premultiply(rgba: [u8; 4]) -> PremultipliedColorU8 {
    tiny_skia::ColorU8::from_rgba(rgba[0], rgba[1], rgba[2], rgba[3]).premultiply()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{BLACK, WHITE};
    use egui::pos2;

    fn rect(x: f32, y: f32, w: f32, h: f32) -> Rect {
        Rect::from_min_size(pos2(x, y), egui::vec2(w, h))
    }

    #[test]
    fn zero_sized_layer_reads_nothing() {
        let layer = Layer::new(0, 10).unwrap();
        assert!(layer.is_empty());
        assert!(layer.get_image_data(0, 0, 5, 5).is_none());
        assert!(layer.pixel(0, 0).is_none());
    }

    #[test]
    fn clip_limits_fill_and_restore_drops_it() {
        let mut layer = Layer::new(20, 20).unwrap();
        layer.save();
        layer.clip(&PathShape::Rectangle(rect(0.0, 0.0, 10.0, 10.0))).unwrap();
        layer.fill(BLACK);
        layer.restore();
        assert!(!layer.has_clip());

        assert_eq!(layer.pixel(5, 5), Some([0, 0, 0, 255]));
        assert_eq!(layer.pixel(15, 15), Some([0, 0, 0, 0]));
    }

    #[test]
    fn nested_clips_intersect() {
        let mut layer = Layer::new(20, 20).unwrap();
        layer.clip(&PathShape::Rectangle(rect(0.0, 0.0, 10.0, 20.0))).unwrap();
        layer.clip(&PathShape::Rectangle(rect(0.0, 0.0, 20.0, 10.0))).unwrap();
        layer.fill(WHITE);
        assert_eq!(layer.pixel(5, 5), Some([255, 255, 255, 255]));
        assert_eq!(layer.pixel(5, 15), Some([0, 0, 0, 0]));
        assert_eq!(layer.pixel(15, 5), Some([0, 0, 0, 0]));
    }

    #[test]
    fn image_data_outside_bounds_is_transparent() {
        let mut layer = Layer::new(4, 4).unwrap();
        layer.fill(WHITE);
        let image = layer.get_image_data(2, 2, 4, 4).unwrap();
        assert_eq!(image.get_pixel(0, 0).0, [255, 255, 255, 255]);
        assert_eq!(image.get_pixel(3, 3).0, [0, 0, 0, 0]);
    }

    #[test]
    fn put_then_get_preserves_opaque_pixels() {
        let mut layer = Layer::new(8, 8).unwrap();
        let mut image = RgbaImage::new(2, 2);
        image.put_pixel(1, 0, image::Rgba([10, 20, 30, 255]));
        layer.put_image_data(&image, 3, 3).unwrap();
        assert_eq!(layer.pixel(4, 3), Some([10, 20, 30, 255]));
        assert_eq!(layer.get_image_data(3, 3, 2, 2).unwrap(), image);
    }

    #[test]
    fn put_image_data_missing_the_layer_fails() {
        let mut layer = Layer::new(8, 8).unwrap();
        let image = RgbaImage::new(2, 2);
        assert!(matches!(
            layer.put_image_data(&image, 8, 0),
            Err(SurfaceError::OutOfBounds { x: 8, .. })
        ));
        assert!(layer.put_image_data(&image, -1, -1).is_ok());
        assert!(layer.put_image_data(&image, -2, 0).is_err());
    }

    #[test]
    fn snapshot_draws_at_unit_scale_exactly() {
        let mut source = Layer::new(3, 3).unwrap();
        source.fill(Rgba::rgb(200, 10, 10));
        let snapshot = source.snapshot();

        let mut target = Layer::new(10, 10).unwrap();
        target.fill(WHITE);
        target.draw_snapshot(&snapshot, rect(4.0, 4.0, 3.0, 3.0));
        assert_eq!(target.pixel(4, 4), Some([200, 10, 10, 255]));
        assert_eq!(target.pixel(6, 6), Some([200, 10, 10, 255]));
        assert_eq!(target.pixel(7, 7), Some([255, 255, 255, 255]));
        assert_eq!(target.pixel(3, 3), Some([255, 255, 255, 255]));
    }

    #[test]
    fn snapshot_is_a_deep_copy() {
        let mut layer = Layer::new(2, 2).unwrap();
        let snapshot = layer.snapshot();
        layer.fill(BLACK);
        assert_eq!(snapshot.pixel(0, 0), Some([0, 0, 0, 0]));
        layer.restore_snapshot(&snapshot);
        assert_eq!(layer.pixel(0, 0), Some([0, 0, 0, 0]));
    }
}
