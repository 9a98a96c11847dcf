use egui::{Pos2, Rect};

use super::distance;

/// Default radius around a resize handle that still counts as a hit.
pub const RESIZE_HANDLE_RADIUS: f32 = 8.0;

/// Whether `pos` lies within `radius` of the handle centered at `handle`.
pub fn is_point_near_handle(pos: Pos2, handle: Pos2, radius: f32) -> bool {
    distance(pos, handle) <= radius
}

/// Whether `pos` lies inside `rect`, edges included.
///
/// Pointer coordinates land on pixel edges, so the far edges count as inside
/// (unlike a half-open pixel range).
pub fn is_point_in_rect(pos: Pos2, rect: Rect) -> bool {
    pos.x >= rect.min.x && pos.x <= rect.max.x && pos.y >= rect.min.y && pos.y <= rect.max.y
}
