mod common;

use common::{drag, editor};
use egui::{Pos2, pos2, vec2};
use paint_engine::color::{BLACK, Rgba};
use paint_engine::command::{FillMode, ShapeCommand, ShapeGeometry, ShapeStyle};
use paint_engine::tools::{EllipseDrawer, PreviewState, ShapeDrawer};
use paint_engine::{Command, LayerKind, RasterSurface, ToolKind};

const TEAL: [u8; 4] = [110, 225, 202, 255];

fn teal_style(fill_mode: FillMode) -> ShapeStyle {
    ShapeStyle {
        line_width: 5.0,
        fill_mode,
        primary: Rgba::rgb(110, 225, 202),
        secondary: BLACK,
    }
}

fn ellipse_command(start: Pos2, end: Pos2, fill_mode: FillMode) -> Command {
    let state = PreviewState {
        start,
        end,
        constrained: false,
        style: teal_style(fill_mode),
    };
    EllipseDrawer.commit(&state).unwrap()
}

#[test]
fn test_fill_only_ellipse_uses_primary_for_fill_and_stroke() {
    let command = ellipse_command(pos2(0.0, 0.0), pos2(10.0, 20.0), FillMode::FillOnly);
    let Command::Shape(ShapeCommand { geometry, .. }) = &command else {
        panic!("shape command expected");
    };
    assert_eq!(
        geometry,
        &ShapeGeometry::Ellipse {
            center: pos2(5.0, 10.0),
            radii: vec2(2.5, 7.5),
        }
    );

    let mut surface = RasterSurface::new(20, 30).unwrap();
    command.execute(&mut surface).unwrap();
    assert_eq!(surface.base_pixel(4, 9), Some(TEAL));
    assert_eq!(surface.base_pixel(4, 4), Some(TEAL));
    assert_eq!(surface.base_pixel(15, 25), Some([255, 255, 255, 255]));
    // nothing is painted black in fill-only mode
    let black_pixels = (0..20)
        .flat_map(|x| (0..30).map(move |y| (x, y)))
        .filter(|&(x, y)| surface.base_pixel(x, y) == Some([0, 0, 0, 255]))
        .count();
    assert_eq!(black_pixels, 0);
}

#[test]
fn test_outline_fill_strokes_secondary_over_primary_fill() {
    let mut surface = RasterSurface::new(60, 60).unwrap();
    let command = Command::Shape(ShapeCommand::new(
        ShapeGeometry::Rectangle {
            start: pos2(10.0, 10.0),
            end: pos2(50.0, 50.0),
        },
        ShapeStyle {
            line_width: 4.0,
            ..teal_style(FillMode::OutlineFill)
        },
    ));
    command.execute(&mut surface).unwrap();
    // stroke spans [10, 14) inside the dragged box
    assert_eq!(surface.base_pixel(11, 30), Some([0, 0, 0, 255]));
    assert_eq!(surface.base_pixel(30, 30), Some(TEAL));
    assert_eq!(surface.base_pixel(5, 5), Some([255, 255, 255, 255]));
}

#[test]
fn test_outline_leaves_interior_untouched() {
    let mut surface = RasterSurface::new(60, 60).unwrap();
    let command = Command::Shape(ShapeCommand::new(
        ShapeGeometry::Rectangle {
            start: pos2(50.0, 50.0),
            end: pos2(10.0, 10.0),
        },
        teal_style(FillMode::Outline),
    ));
    command.execute(&mut surface).unwrap();
    assert_eq!(surface.base_pixel(11, 30), Some(TEAL));
    assert_eq!(surface.base_pixel(30, 30), Some([255, 255, 255, 255]));
}

#[test]
fn test_command_execution_is_deterministic() {
    let commands = [
        ellipse_command(pos2(3.0, 7.0), pos2(41.0, 29.0), FillMode::OutlineFill),
        Command::Shape(ShapeCommand::new(
            ShapeGeometry::Line {
                points: vec![pos2(2.0, 2.0), pos2(40.0, 10.0), pos2(20.0, 45.0)],
                closed: true,
                junction_radius: Some(3.0),
            },
            teal_style(FillMode::Outline),
        )),
    ];
    let mut first = RasterSurface::new(50, 50).unwrap();
    let mut second = RasterSurface::new(50, 50).unwrap();
    for command in &commands {
        command.execute(&mut first).unwrap();
        command.execute(&mut second).unwrap();
    }
    assert_eq!(
        first.snapshot(LayerKind::Base).data(),
        second.snapshot(LayerKind::Base).data()
    );
}

#[test]
fn test_preview_layer_is_not_history() {
    let mut editor = editor(80, 80);
    editor.set_tool(ToolKind::Ellipse);
    editor.handle_input(paint_engine::InputEvent::PointerDown {
        pos: pos2(10.0, 10.0),
        button: egui::PointerButton::Primary,
    });
    editor.handle_input(paint_engine::InputEvent::PointerMove { pos: pos2(60.0, 40.0) });

    assert!(!editor.surface().layer(LayerKind::Preview).snapshot().data().iter().all(|&b| b == 0));
    assert_eq!(editor.surface().base_pixel(10, 25), Some([255, 255, 255, 255]));
    assert_eq!(editor.history().undo_len(), 0);

    editor.handle_input(paint_engine::InputEvent::PointerUp {
        pos: pos2(60.0, 40.0),
        button: egui::PointerButton::Primary,
    });
    assert_eq!(editor.history().undo_len(), 1);
    assert!(editor.surface().layer(LayerKind::Preview).snapshot().data().iter().all(|&b| b == 0));
}

#[test]
fn test_zero_area_drag_draws_nothing() {
    let mut editor = editor(40, 40);
    drag(&mut editor, pos2(10.0, 10.0), pos2(10.0, 30.0));
    assert_eq!(editor.history().undo_len(), 0);
}
