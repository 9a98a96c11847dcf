//! Point and vector math shared by the drawing and selection tools.
//!
//! Every function here is pure and total: degenerate input (coincident points,
//! zero-length drags) produces a well-defined result instead of `NaN`.

pub mod hit_testing;

use egui::{Pos2, Vec2, pos2, vec2};

/// Euclidean distance between two points.
pub fn distance(a: Pos2, b: Pos2) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

/// Angle of the vector `b - a` in degrees, in `[0, 360)`.
///
/// 0° points right and angles grow with the canvas y axis (clockwise on
/// screen). Coincident points map to 0.
pub fn angle_degrees(a: Pos2, b: Pos2) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    if dx == 0.0 && dy == 0.0 {
        return 0.0;
    }
    let angle = dy.atan2(dx).to_degrees();
    let normalized = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative angles
    if normalized >= 360.0 { 0.0 } else { normalized }
}

/// Rounds `value` to the nearest multiple of `multiple`, halves rounding up.
///
/// `22.5` rounds to `45` and `22.4` to `0` when `multiple` is 45. A
/// non-positive `multiple` returns `value` unchanged.
pub fn round_to_multiple(value: f32, multiple: f32) -> f32 {
    if multiple <= 0.0 {
        return value;
    }
    (value / multiple + 0.5).floor() * multiple
}

/// Snaps an angle in degrees to the nearest multiple, wrapping a full turn to 0.
pub fn snap_angle(angle: f32, multiple: f32) -> f32 {
    let snapped = round_to_multiple(angle, multiple);
    if snapped >= 360.0 { snapped - 360.0 } else { snapped }
}

/// Projects `end` onto the ray from `start` whose direction is snapped to
/// `multiple` degrees, keeping the original length.
pub fn snap_to_angle(start: Pos2, end: Pos2, multiple: f32) -> Pos2 {
    let length = distance(start, end);
    let angle = snap_angle(angle_degrees(start, end), multiple).to_radians();
    pos2(
        start.x + length * angle.cos(),
        start.y + length * angle.sin(),
    )
}

/// Half-extents of the box spanned by `start` and `end`.
///
/// With `force_circle` both radii shrink to the shorter half-side so the
/// circle still fits in the dragged box.
pub fn ellipse_radii(start: Pos2, end: Pos2, force_circle: bool) -> Vec2 {
    let rx = (end.x - start.x).abs() / 2.0;
    let ry = (end.y - start.y).abs() / 2.0;
    if force_circle {
        let r = rx.min(ry);
        vec2(r, r)
    } else {
        vec2(rx, ry)
    }
}

/// Center of the ellipse dragged from `start` to `end`.
///
/// The center sits one radius away from `start` in the drag direction on
/// each axis, so a forced circle stays anchored at the starting corner.
pub fn ellipse_center(start: Pos2, end: Pos2, force_circle: bool) -> Pos2 {
    let radii = ellipse_radii(start, end, force_circle);
    pos2(
        start.x + direction(end.x - start.x) * radii.x,
        start.y + direction(end.y - start.y) * radii.y,
    )
}

/// `-1.0` for negative deltas, `1.0` otherwise (zero counts as positive).
fn direction(delta: f32) -> f32 {
    if delta < 0.0 { -1.0 } else { 1.0 }
}

/// Orientation of the ordered triplet: 0 collinear, 1 clockwise, 2 counter-clockwise.
fn orientation(p: Pos2, q: Pos2, r: Pos2) -> u8 {
    let value = (q.y - p.y) * (r.x - q.x) - (q.x - p.x) * (r.y - q.y);
    if value == 0.0 {
        0
    } else if value > 0.0 {
        1
    } else {
        2
    }
}

/// Whether `q` lies on segment `pr`, given that the three points are collinear.
fn on_segment(p: Pos2, q: Pos2, r: Pos2) -> bool {
    q.x <= p.x.max(r.x) && q.x >= p.x.min(r.x) && q.y <= p.y.max(r.y) && q.y >= p.y.min(r.y)
}

/// Whether `point` lies on the segment `a`-`b` (collinear and inside its box).
pub fn point_on_segment(point: Pos2, a: Pos2, b: Pos2) -> bool {
    orientation(a, point, b) == 0 && on_segment(a, point, b)
}

/// Tests whether segment `p1p2` intersects segment `p3p4`.
///
/// Segments that meet only at a shared endpoint (consecutive lasso edges, or
/// the closing edge meeting the first one) do not count as intersecting.
/// Collinear segments that share an endpoint and overlap beyond it do.
pub fn segments_intersect(p1: Pos2, p2: Pos2, p3: Pos2, p4: Pos2) -> bool {
    if let Some(joint) = [p1, p2].into_iter().find(|p| *p == p3 || *p == p4) {
        let free = if p1 == joint { p2 } else { p1 };
        let other_free = if p3 == joint { p4 } else { p3 };
        return point_on_segment(free, p3, p4) || point_on_segment(other_free, p1, p2);
    }

    let o1 = orientation(p1, p2, p3);
    let o2 = orientation(p1, p2, p4);
    let o3 = orientation(p3, p4, p1);
    let o4 = orientation(p3, p4, p2);

    if o1 != o2 && o3 != o4 {
        return true;
    }

    (o1 == 0 && on_segment(p1, p3, p2))
        || (o2 == 0 && on_segment(p1, p4, p2))
        || (o3 == 0 && on_segment(p3, p1, p4))
        || (o4 == 0 && on_segment(p3, p2, p4))
}

/// Reorders two arbitrary corners into `[top_left, bottom_right]`.
pub fn normalize_corners(start: Pos2, end: Pos2) -> [Pos2; 2] {
    [
        pos2(start.x.min(end.x), start.y.min(end.y)),
        pos2(start.x.max(end.x), start.y.max(end.y)),
    ]
}

/// Recomputes the end corner so the box is a square of `side_length`,
/// keeping the drag direction on both axes.
pub fn square_from_corners(start: Pos2, end: Pos2, side_length: f32) -> [Pos2; 2] {
    let side = side_length.abs();
    let new_end = pos2(
        start.x + direction(end.x - start.x) * side,
        start.y + direction(end.y - start.y) * side,
    );
    [start, new_end]
}

/// Side of the largest square that fits in the box spanned by two corners.
pub fn shorter_side(start: Pos2, end: Pos2) -> f32 {
    (end.x - start.x).abs().min((end.y - start.y).abs())
}

/// Constrains `end` so the dragged box becomes a square (Shift behavior).
pub fn constrain_square(start: Pos2, end: Pos2) -> [Pos2; 2] {
    square_from_corners(start, end, shorter_side(start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_symmetric() {
        let a = pos2(3.0, 4.0);
        let b = pos2(0.0, 0.0);
        assert_eq!(distance(a, b), 5.0);
        assert_eq!(distance(b, a), 5.0);
        assert_eq!(distance(a, a), 0.0);
    }

    #[test]
    fn angle_of_coincident_points_is_zero() {
        let p = pos2(10.0, 10.0);
        assert_eq!(angle_degrees(p, p), 0.0);
    }

    #[test]
    fn angles_cover_all_octants() {
        let origin = pos2(0.0, 0.0);
        let cases = [
            (pos2(10.0, 0.0), 0.0),
            (pos2(10.0, 10.0), 45.0),
            (pos2(0.0, 10.0), 90.0),
            (pos2(-10.0, 10.0), 135.0),
            (pos2(-10.0, 0.0), 180.0),
            (pos2(-10.0, -10.0), 225.0),
            (pos2(0.0, -10.0), 270.0),
            (pos2(10.0, -10.0), 315.0),
        ];
        for (target, expected) in cases {
            let angle = angle_degrees(origin, target);
            assert!((angle - expected).abs() < 1e-3, "{target:?}: {angle}");
            assert_eq!(snap_angle(angle, 45.0), expected);
        }
    }

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(round_to_multiple(22.5, 45.0), 45.0);
        assert_eq!(round_to_multiple(22.4, 45.0), 0.0);
        assert_eq!(round_to_multiple(67.5, 45.0), 90.0);
    }

    #[test]
    fn full_turn_wraps_to_zero() {
        assert_eq!(round_to_multiple(359.0, 45.0), 360.0);
        assert_eq!(snap_angle(359.0, 45.0), 0.0);
        assert_eq!(snap_angle(337.5, 45.0), 0.0);
    }

    #[test]
    fn snapped_point_keeps_length() {
        let start = pos2(0.0, 0.0);
        let snapped = snap_to_angle(start, pos2(10.0, 1.0), 45.0);
        assert!((snapped.y).abs() < 1e-4);
        assert!((distance(start, snapped) - distance(start, pos2(10.0, 1.0))).abs() < 1e-4);
    }

    #[test]
    fn circle_radii_shrink_to_shorter_side() {
        let radii = ellipse_radii(pos2(0.0, 0.0), pos2(10.0, 20.0), true);
        assert_eq!(radii, vec2(5.0, 5.0));
        let radii = ellipse_radii(pos2(0.0, 0.0), pos2(10.0, 20.0), false);
        assert_eq!(radii, vec2(5.0, 10.0));
    }

    #[test]
    fn ellipse_center_follows_drag_direction() {
        assert_eq!(
            ellipse_center(pos2(10.0, 10.0), pos2(0.0, 30.0), false),
            pos2(5.0, 20.0)
        );
        assert_eq!(
            ellipse_center(pos2(10.0, 10.0), pos2(0.0, 30.0), true),
            pos2(5.0, 15.0)
        );
    }

    #[test]
    fn crossing_segments_intersect() {
        assert!(segments_intersect(
            pos2(0.0, 0.0),
            pos2(10.0, 10.0),
            pos2(0.0, 10.0),
            pos2(10.0, 0.0)
        ));
        assert!(!segments_intersect(
            pos2(0.0, 0.0),
            pos2(10.0, 0.0),
            pos2(0.0, 5.0),
            pos2(10.0, 5.0)
        ));
    }

    #[test]
    fn shared_endpoint_is_not_an_intersection() {
        assert!(!segments_intersect(
            pos2(0.0, 0.0),
            pos2(10.0, 0.0),
            pos2(10.0, 0.0),
            pos2(10.0, 10.0)
        ));
    }

    #[test]
    fn collinear_overlap_from_a_shared_endpoint_intersects() {
        assert!(segments_intersect(
            pos2(0.0, 0.0),
            pos2(20.0, 0.0),
            pos2(10.0, 0.0),
            pos2(20.0, 0.0)
        ));
        assert!(segments_intersect(
            pos2(10.0, 0.0),
            pos2(20.0, 0.0),
            pos2(20.0, 0.0),
            pos2(0.0, 0.0)
        ));
        // continuing straight on does not overlap
        assert!(!segments_intersect(
            pos2(0.0, 0.0),
            pos2(10.0, 0.0),
            pos2(10.0, 0.0),
            pos2(20.0, 0.0)
        ));
    }

    #[test]
    fn touching_interior_counts_as_intersection() {
        assert!(segments_intersect(
            pos2(0.0, 0.0),
            pos2(10.0, 0.0),
            pos2(5.0, 0.0),
            pos2(5.0, 10.0)
        ));
    }

    #[test]
    fn normalize_handles_every_drag_direction() {
        let expected = [pos2(0.0, 0.0), pos2(10.0, 20.0)];
        assert_eq!(normalize_corners(pos2(0.0, 0.0), pos2(10.0, 20.0)), expected);
        assert_eq!(normalize_corners(pos2(10.0, 0.0), pos2(0.0, 20.0)), expected);
        assert_eq!(normalize_corners(pos2(0.0, 20.0), pos2(10.0, 0.0)), expected);
        assert_eq!(normalize_corners(pos2(10.0, 20.0), pos2(0.0, 0.0)), expected);
    }

    #[test]
    fn square_keeps_drag_signs() {
        let [start, end] = constrain_square(pos2(50.0, 50.0), pos2(20.0, 90.0));
        assert_eq!(start, pos2(50.0, 50.0));
        assert_eq!(end, pos2(20.0, 80.0));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn coord() -> impl Strategy<Value = f32> {
        (-2000i32..2000).prop_map(|v| v as f32)
    }

    proptest! {
        #[test]
        fn normalized_corners_are_ordered(x0 in coord(), y0 in coord(), x1 in coord(), y1 in coord()) {
            let [top_left, bottom_right] = normalize_corners(pos2(x0, y0), pos2(x1, y1));
            prop_assert!(top_left.x <= bottom_right.x);
            prop_assert!(top_left.y <= bottom_right.y);
            prop_assert_eq!(bottom_right.x - top_left.x, (x1 - x0).abs());
            prop_assert_eq!(bottom_right.y - top_left.y, (y1 - y0).abs());
        }

        #[test]
        fn square_forcing_is_idempotent(x0 in coord(), y0 in coord(), x1 in coord(), y1 in coord()) {
            let start = pos2(x0, y0);
            let once = constrain_square(start, pos2(x1, y1));
            let twice = constrain_square(once[0], once[1]);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn overlapping_collinear_segments_intersect(
            x in coord(),
            y in coord(),
            length in 2i32..500,
            split in 1i32..500,
            vertical in any::<bool>()
        ) {
            let split = (split % (length - 1) + 1) as f32;
            let at = |offset: f32| if vertical { pos2(x, y + offset) } else { pos2(x + offset, y) };
            let (start, middle, end) = (at(0.0), at(split), at(length as f32));
            prop_assert!(segments_intersect(start, end, middle, end));
            prop_assert!(segments_intersect(middle, end, end, start));
            prop_assert!(!segments_intersect(start, middle, middle, end));
        }

        #[test]
        fn intersection_is_symmetric(
            a in (coord(), coord()),
            b in (coord(), coord()),
            c in (coord(), coord()),
            d in (coord(), coord())
        ) {
            let (a, b, c, d) = (pos2(a.0, a.1), pos2(b.0, b.1), pos2(c.0, c.1), pos2(d.0, d.1));
            prop_assert_eq!(segments_intersect(a, b, c, d), segments_intersect(c, d, a, b));
        }

        #[test]
        fn circle_forcing_is_idempotent(x0 in coord(), y0 in coord(), x1 in coord(), y1 in coord()) {
            let start = pos2(x0, y0);
            let end = pos2(x1, y1);
            let radii = ellipse_radii(start, end, true);
            let center = ellipse_center(start, end, true);
            let forced_end = pos2(
                start.x + 2.0 * (center.x - start.x),
                start.y + 2.0 * (center.y - start.y),
            );
            prop_assert_eq!(ellipse_radii(start, forced_end, true), radii);
            prop_assert_eq!(ellipse_center(start, forced_end, true), center);
        }
    }
}
