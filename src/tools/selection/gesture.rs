use egui::Pos2;

use crate::command::{SelectionKind, SelectionRegion};
use crate::surface::PathShape;
use crate::tools::ToolKind;
use crate::tools::shape::{EllipseDrawer, RectangleDrawer, ShapeDrawer};

/// Result of feeding one input to a selection gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// Still tracking
    Continue,
    /// The input was refused (e.g. a self-crossing lasso segment); the
    /// gesture keeps its last valid state
    Rejected,
    /// The region is finalized
    Complete(SelectionRegion),
    /// The gesture ended without a usable region
    Abort,
}

/// Pointer-driven construction of a selection region.
pub trait SelectionGesture {
    fn name(&self) -> &'static str;

    fn kind(&self) -> SelectionKind;

    fn on_press(&mut self, pos: Pos2, constrained: bool) -> GestureOutcome;

    fn on_move(&mut self, pos: Pos2, constrained: bool) -> GestureOutcome;

    fn on_release(&mut self, pos: Pos2, constrained: bool) -> GestureOutcome;

    /// Shift was pressed or released mid-gesture.
    fn set_constrained(&mut self, _constrained: bool) {}

    /// Outline of the in-progress geometry, for the dashed preview.
    fn outline(&self) -> Option<PathShape>;

    fn is_active(&self) -> bool;

    fn reset(&mut self);
}

/// Two-corner drag selection reusing a shape drawer's region math.
#[derive(Debug, Clone, Default)]
pub struct DragGesture<D: ShapeDrawer> {
    drawer: D,
    start: Option<Pos2>,
    end: Pos2,
    constrained: bool,
}

pub type RectangleGesture = DragGesture<RectangleDrawer>;
pub type EllipseGesture = DragGesture<EllipseDrawer>;

impl<D: ShapeDrawer> DragGesture<D> {
    pub fn new(drawer: D) -> Self {
        Self {
            drawer,
            start: None,
            end: Pos2::ZERO,
            constrained: false,
        }
    }

    /// Current `[start, end]` corners, as dragged (not normalized)
    pub fn corners(&self) -> Option<[Pos2; 2]> {
        self.start.map(|start| [start, self.end])
    }

    fn region(&self) -> Option<SelectionRegion> {
        let start = self.start?;
        self.drawer.region(start, self.end, self.constrained)
    }
}

impl<D: ShapeDrawer> SelectionGesture for DragGesture<D> {
    fn name(&self) -> &'static str {
        match self.drawer.kind() {
            ToolKind::Ellipse => "EllipseSelection",
            _ => "RectangleSelection",
        }
    }

    fn kind(&self) -> SelectionKind {
        match self.drawer.kind() {
            ToolKind::Ellipse => SelectionKind::Ellipse,
            _ => SelectionKind::Rectangle,
        }
    }

    fn on_press(&mut self, pos: Pos2, constrained: bool) -> GestureOutcome {
        self.start = Some(pos);
        self.end = pos;
        self.constrained = constrained;
        GestureOutcome::Continue
    }

    fn on_move(&mut self, pos: Pos2, constrained: bool) -> GestureOutcome {
        if self.start.is_some() {
            self.end = pos;
            self.constrained = constrained;
        }
        GestureOutcome::Continue
    }

    fn on_release(&mut self, pos: Pos2, constrained: bool) -> GestureOutcome {
        if self.start.is_none() {
            return GestureOutcome::Abort;
        }
        self.end = pos;
        self.constrained = constrained;
        let region = self.region();
        self.reset();
        match region {
            Some(region) => GestureOutcome::Complete(region),
            None => GestureOutcome::Abort,
        }
    }

    fn set_constrained(&mut self, constrained: bool) {
        self.constrained = constrained;
    }

    fn outline(&self) -> Option<PathShape> {
        self.region().map(|region| region.to_path_shape())
    }

    fn is_active(&self) -> bool {
        self.start.is_some()
    }

    fn reset(&mut self) {
        self.start = None;
        self.end = Pos2::ZERO;
        self.constrained = false;
    }
}
