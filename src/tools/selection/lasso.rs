use egui::Pos2;
use log::{debug, warn};

use super::gesture::{GestureOutcome, SelectionGesture};
use crate::command::{SelectionKind, SelectionRegion};
use crate::geometry::{distance, point_on_segment, segments_intersect};
use crate::surface::PathShape;

/// Default distance to the first point that closes the loop.
pub const DEFAULT_CLOSE_RADIUS: f32 = 20.0;

/// Click-by-click polygon selection.
///
/// Each press adds a vertex. A press within the close radius of the first
/// vertex closes the loop. Segments that would cross the existing path are
/// refused at input time.
#[derive(Debug, Clone)]
pub struct LassoGesture {
    points: Vec<Pos2>,
    cursor: Option<Pos2>,
    close_radius: f32,
}

impl Default for LassoGesture {
    fn default() -> Self {
        Self::with_close_radius(DEFAULT_CLOSE_RADIUS)
    }
}

impl LassoGesture {
    pub fn with_close_radius(close_radius: f32) -> Self {
        Self {
            points: Vec::new(),
            cursor: None,
            close_radius,
        }
    }

    /// Accepted vertices, in order.
    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    /// Whether a segment from the last vertex to `pos` keeps the path simple.
    pub fn accepts(&self, pos: Pos2) -> bool {
        let Some(&last) = self.points.last() else {
            return true;
        };
        if pos == last {
            return false;
        }
        let segments: Vec<(Pos2, Pos2)> = self.points.windows(2).map(|w| (w[0], w[1])).collect();
        if let Some(&(previous, _)) = segments.last() {
            // doubling back along the previous segment
            if point_on_segment(pos, previous, last) || point_on_segment(previous, last, pos) {
                return false;
            }
        }
        !segments
            .iter()
            .any(|&(a, b)| segments_intersect(last, pos, a, b))
    }

    /// Whether the closing edge back to the first vertex keeps the path simple.
    fn closes_cleanly(&self) -> bool {
        let (Some(&first), Some(&last)) = (self.points.first(), self.points.last()) else {
            return false;
        };
        !self
            .points
            .windows(2)
            .any(|w| segments_intersect(last, first, w[0], w[1]))
    }

    fn near_start(&self, pos: Pos2) -> bool {
        self.points
            .first()
            .is_some_and(|first| distance(*first, pos) <= self.close_radius)
    }
}

impl SelectionGesture for LassoGesture {
    fn name(&self) -> &'static str {
        "LassoSelection"
    }

    fn kind(&self) -> SelectionKind {
        SelectionKind::Lasso
    }

    fn on_press(&mut self, pos: Pos2, _constrained: bool) -> GestureOutcome {
        if self.points.is_empty() {
            self.points.push(pos);
            self.cursor = Some(pos);
            return GestureOutcome::Continue;
        }

        if self.near_start(pos) && self.points.len() > 1 {
            if self.points.len() < 3 {
                debug!("Lasso closed with {} points, aborting", self.points.len());
                self.reset();
                return GestureOutcome::Abort;
            }
            if !self.closes_cleanly() {
                warn!("Closing the lasso would cross its own path");
                return GestureOutcome::Rejected;
            }
            let region = SelectionRegion::Lasso(std::mem::take(&mut self.points));
            self.reset();
            return GestureOutcome::Complete(region);
        }

        if pos == self.points[self.points.len() - 1] {
            return GestureOutcome::Continue;
        }
        if !self.accepts(pos) {
            warn!("Rejected lasso point ({}, {}): segment crosses the path", pos.x, pos.y);
            return GestureOutcome::Rejected;
        }
        self.points.push(pos);
        GestureOutcome::Continue
    }

    fn on_move(&mut self, pos: Pos2, _constrained: bool) -> GestureOutcome {
        if self.points.is_empty() {
            return GestureOutcome::Continue;
        }
        self.cursor = Some(pos);
        if self.near_start(pos) || self.accepts(pos) || self.points.last() == Some(&pos) {
            GestureOutcome::Continue
        } else {
            GestureOutcome::Rejected
        }
    }

    fn on_release(&mut self, _pos: Pos2, _constrained: bool) -> GestureOutcome {
        GestureOutcome::Continue
    }

    fn outline(&self) -> Option<PathShape> {
        let mut points = self.points.clone();
        if let Some(cursor) = self.cursor {
            if points.last() != Some(&cursor) {
                points.push(cursor);
            }
        }
        (points.len() >= 2).then_some(PathShape::Polyline(points))
    }

    fn is_active(&self) -> bool {
        !self.points.is_empty()
    }

    fn reset(&mut self) {
        self.points.clear();
        self.cursor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn lasso(points: &[(f32, f32)]) -> LassoGesture {
        let mut gesture = LassoGesture::default();
        for &(x, y) in points {
            gesture.on_press(pos2(x, y), false);
        }
        gesture
    }

    #[test]
    fn closing_near_start_completes() {
        let mut gesture = lasso(&[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0)]);
        let outcome = gesture.on_press(pos2(5.0, 5.0), false);
        assert_eq!(
            outcome,
            GestureOutcome::Complete(SelectionRegion::Lasso(vec![
                pos2(0.0, 0.0),
                pos2(100.0, 0.0),
                pos2(100.0, 100.0)
            ]))
        );
        assert!(!gesture.is_active());
    }

    #[test]
    fn crossing_segment_is_rejected_and_gesture_continues() {
        let mut gesture = lasso(&[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (50.0, 100.0)]);
        // would cross the first edge
        assert_eq!(gesture.on_press(pos2(50.0, -50.0), false), GestureOutcome::Rejected);
        assert_eq!(gesture.points().len(), 4);
        assert_eq!(gesture.on_press(pos2(0.0, 100.0), false), GestureOutcome::Continue);
        assert_eq!(gesture.points().len(), 5);
    }

    #[test]
    fn backtracking_over_previous_segment_is_rejected() {
        let mut gesture = lasso(&[(0.0, 0.0), (100.0, 0.0)]);
        assert_eq!(gesture.on_press(pos2(50.0, 0.0), false), GestureOutcome::Rejected);
        assert_eq!(gesture.on_press(pos2(150.0, 0.0), false), GestureOutcome::Continue);
    }

    #[test]
    fn segment_along_an_earlier_edge_is_rejected() {
        let mut gesture = LassoGesture::with_close_radius(0.0);
        for (x, y) in [(10.0, 0.0), (20.0, 0.0), (15.0, 10.0), (0.0, 0.0)] {
            assert_eq!(gesture.on_press(pos2(x, y), false), GestureOutcome::Continue);
        }
        // (0,0) -> (20,0) would run over the first edge
        assert_eq!(gesture.on_press(pos2(20.0, 0.0), false), GestureOutcome::Rejected);
        assert_eq!(gesture.points().len(), 4);
        assert!(!gesture.accepts(pos2(20.0, 0.0)));
    }

    #[test]
    fn closing_with_two_points_aborts() {
        let mut gesture = lasso(&[(0.0, 0.0), (100.0, 0.0)]);
        assert_eq!(gesture.on_press(pos2(3.0, 3.0), false), GestureOutcome::Abort);
        assert!(!gesture.is_active());
    }

    #[test]
    fn hovering_a_crossing_position_is_reported() {
        let mut gesture = lasso(&[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (50.0, 100.0)]);
        assert_eq!(gesture.on_move(pos2(50.0, -50.0), false), GestureOutcome::Rejected);
        assert_eq!(gesture.on_move(pos2(0.0, 100.0), false), GestureOutcome::Continue);
        assert!(matches!(gesture.outline(), Some(PathShape::Polyline(points)) if points.len() == 5));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use egui::pos2;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn accepted_points_never_self_intersect(
            raw in prop::collection::vec((0i32..60, 0i32..60), 2..40)
        ) {
            let mut gesture = LassoGesture::with_close_radius(0.0);
            for (x, y) in raw {
                gesture.on_press(pos2(x as f32, y as f32), false);
            }
            let points = gesture.points();
            let segments: Vec<(Pos2, Pos2)> = points.windows(2).map(|w| (w[0], w[1])).collect();
            for i in 0..segments.len() {
                for j in (i + 2)..segments.len() {
                    let (a, b) = segments[i];
                    let (c, d) = segments[j];
                    prop_assert!(!segments_intersect(a, b, c, d));
                }
            }
        }
    }
}
