use egui::{CursorIcon, Pos2, Rect, pos2};

use crate::geometry::constrain_square;
use crate::geometry::hit_testing::{RESIZE_HANDLE_RADIUS, is_point_in_rect, is_point_near_handle};

/// One of the eight resize handles around a floating selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    TopLeft,
    TopMiddle,
    TopRight,
    MiddleLeft,
    MiddleRight,
    BottomLeft,
    BottomMiddle,
    BottomRight,
}

impl Handle {
    pub const ALL: [Handle; 8] = [
        Handle::TopLeft,
        Handle::TopMiddle,
        Handle::TopRight,
        Handle::MiddleLeft,
        Handle::MiddleRight,
        Handle::BottomLeft,
        Handle::BottomMiddle,
        Handle::BottomRight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Handle::TopLeft => "top_left",
            Handle::TopMiddle => "top_middle",
            Handle::TopRight => "top_right",
            Handle::MiddleLeft => "middle_left",
            Handle::MiddleRight => "middle_right",
            Handle::BottomLeft => "bottom_left",
            Handle::BottomMiddle => "bottom_middle",
            Handle::BottomRight => "bottom_right",
        }
    }

    pub fn cursor_icon(&self) -> CursorIcon {
        match self {
            Handle::TopLeft | Handle::BottomRight => CursorIcon::ResizeNwSe,
            Handle::TopRight | Handle::BottomLeft => CursorIcon::ResizeNeSw,
            Handle::TopMiddle | Handle::BottomMiddle => CursorIcon::ResizeVertical,
            Handle::MiddleLeft | Handle::MiddleRight => CursorIcon::ResizeHorizontal,
        }
    }

    /// Where this handle sits on `rect`.
    pub fn position_on(&self, rect: Rect) -> Pos2 {
        let center = rect.center();
        match self {
            Handle::TopLeft => rect.left_top(),
            Handle::TopMiddle => pos2(center.x, rect.min.y),
            Handle::TopRight => rect.right_top(),
            Handle::MiddleLeft => pos2(rect.min.x, center.y),
            Handle::MiddleRight => pos2(rect.max.x, center.y),
            Handle::BottomLeft => rect.left_bottom(),
            Handle::BottomMiddle => pos2(center.x, rect.max.y),
            Handle::BottomRight => rect.right_bottom(),
        }
    }

    fn is_corner(&self) -> bool {
        matches!(
            self,
            Handle::TopLeft | Handle::TopRight | Handle::BottomLeft | Handle::BottomRight
        )
    }

    /// The corner that stays fixed while a corner handle is dragged.
    fn opposite_corner(&self, rect: Rect) -> Pos2 {
        match self {
            Handle::TopLeft => rect.right_bottom(),
            Handle::TopRight => rect.left_bottom(),
            Handle::BottomLeft => rect.right_top(),
            _ => rect.left_top(),
        }
    }

    /// New bounds after dragging this handle of `anchor` to `pos`.
    ///
    /// Dragging past the opposite edge flips the box instead of inverting it.
    /// With `keep_square` the result is a square: corner handles shrink to
    /// the shorter side, edge handles copy the dragged dimension.
    pub fn resize(&self, anchor: Rect, pos: Pos2, keep_square: bool) -> Rect {
        if keep_square && self.is_corner() {
            let fixed = self.opposite_corner(anchor);
            let [start, end] = constrain_square(fixed, pos);
            return Rect::from_two_pos(start, end);
        }

        let (mut min, mut max) = (anchor.min, anchor.max);
        match self {
            Handle::TopLeft => min = pos,
            Handle::TopMiddle => min.y = pos.y,
            Handle::TopRight => {
                max.x = pos.x;
                min.y = pos.y;
            }
            Handle::MiddleLeft => min.x = pos.x,
            Handle::MiddleRight => max.x = pos.x,
            Handle::BottomLeft => {
                min.x = pos.x;
                max.y = pos.y;
            }
            Handle::BottomMiddle => max.y = pos.y,
            Handle::BottomRight => max = pos,
        }
        let rect = Rect::from_two_pos(min, max);
        if !keep_square {
            return rect;
        }
        match self {
            Handle::TopMiddle | Handle::BottomMiddle => {
                Rect::from_min_size(rect.min, egui::vec2(rect.height(), rect.height()))
            }
            _ => Rect::from_min_size(rect.min, egui::vec2(rect.width(), rect.width())),
        }
    }
}

/// Tracks the eight handles around the active floating selection.
#[derive(Debug, Clone)]
pub struct ResizerHandler {
    bounds: Option<Rect>,
    radius: f32,
}

impl Default for ResizerHandler {
    fn default() -> Self {
        Self::new(RESIZE_HANDLE_RADIUS)
    }
}

impl ResizerHandler {
    pub fn new(radius: f32) -> Self {
        Self { bounds: None, radius }
    }

    /// Places the handles around `bounds`.
    pub fn position(&mut self, bounds: Rect) {
        self.bounds = Some(bounds);
    }

    /// Hides the handles.
    pub fn reset(&mut self) {
        self.bounds = None;
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius;
    }

    /// Handle positions, empty when no selection is active.
    pub fn handles(&self) -> Vec<(Handle, Pos2)> {
        match self.bounds {
            Some(bounds) => Handle::ALL
                .iter()
                .map(|handle| (*handle, handle.position_on(bounds)))
                .collect(),
            None => Vec::new(),
        }
    }

    /// The handle under `pos`, if any. Points in the move area never hit
    /// one.
    pub fn hit(&self, pos: Pos2) -> Option<Handle> {
        if self.move_area().is_some_and(|area| is_point_in_rect(pos, area)) {
            return None;
        }
        self.handles()
            .into_iter()
            .find(|(_, center)| is_point_near_handle(pos, *center, self.radius))
            .map(|(handle, _)| handle)
    }

    /// Interior of the selection reserved for moving it.
    fn move_area(&self) -> Option<Rect> {
        let bounds = self.bounds?;
        let inset = self
            .radius
            .min(bounds.width() / 4.0)
            .min(bounds.height() / 4.0);
        Some(bounds.shrink(inset))
    }
}
