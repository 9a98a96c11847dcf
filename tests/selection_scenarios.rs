mod common;

use common::{click, drag, editor, press_key, shortcut};
use egui::{Key, Modifiers, pos2};
use paint_engine::command::FillMode;
use paint_engine::event::EventRecorder;
use paint_engine::tools::{Handle, Tool};
use paint_engine::{EditorEvent, InputEvent, LayerKind, Rgba, ToolKind, ToolType};

const WHITE: [u8; 4] = [255, 255, 255, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

fn blue_canvas(width: u32, height: u32) -> paint_engine::Editor {
    let mut editor = editor(width, height);
    editor.settings_mut().set_primary_color(Rgba::rgb(0, 0, 255));
    editor.set_tool(ToolKind::PaintBucket);
    click(&mut editor, pos2(0.0, 0.0));
    editor
}

#[test]
fn test_rectangle_selection_round_trip() {
    let mut editor = editor(300, 300);
    editor.settings_mut().set_fill_mode(FillMode::FillOnly);
    editor.settings_mut().set_primary_color(Rgba::rgb(200, 40, 40));
    editor.set_tool(ToolKind::Ellipse);
    drag(&mut editor, pos2(80.0, 80.0), pos2(160.0, 160.0));

    editor.set_tool(ToolKind::RectangleSelection);
    let before = editor.surface().snapshot(LayerKind::Base);
    drag(&mut editor, pos2(100.0, 100.0), pos2(200.0, 180.0));

    // Selection layer holds the lifted pixels, base has a white hole
    let selection = editor.surface().layer(LayerKind::Selection);
    assert_eq!((selection.width(), selection.height()), (100, 80));
    assert_eq!(selection.pixel(20, 20), Some([200, 40, 40, 255]));
    for (x, y) in [(100, 100), (120, 120), (150, 140), (199, 179)] {
        assert_eq!(editor.surface().base_pixel(x, y), Some(WHITE), "pixel ({x}, {y})");
    }
    assert_eq!(editor.surface().base_pixel(88, 120), Some([200, 40, 40, 255]));

    let ToolType::RectangleSelection(tool) = editor.active_tool() else {
        panic!("rectangle selection tool expected");
    };
    let handles = tool.resizer().handles();
    assert_eq!(handles.len(), 8);
    for (handle, pos) in [
        (Handle::TopLeft, pos2(100.0, 100.0)),
        (Handle::TopMiddle, pos2(150.0, 100.0)),
        (Handle::TopRight, pos2(200.0, 100.0)),
        (Handle::MiddleLeft, pos2(100.0, 140.0)),
        (Handle::MiddleRight, pos2(200.0, 140.0)),
        (Handle::BottomLeft, pos2(100.0, 180.0)),
        (Handle::BottomMiddle, pos2(150.0, 180.0)),
        (Handle::BottomRight, pos2(200.0, 180.0)),
    ] {
        assert!(handles.contains(&(handle, pos)), "{handle:?} not at {pos:?}");
    }

    // Committing without moving restores the base exactly
    click(&mut editor, pos2(260.0, 20.0));
    assert_eq!(editor.surface().snapshot(LayerKind::Base), before);
    assert!(editor.surface().layer(LayerKind::Selection).is_empty());
    assert_eq!(editor.active_tool().current_state_name(), "Idle");
}

#[test]
fn test_moved_selection_leaves_hole_and_undoes() {
    let mut editor = blue_canvas(120, 120);
    editor.set_tool(ToolKind::RectangleSelection);
    let before = editor.surface().snapshot(LayerKind::Base);

    drag(&mut editor, pos2(10.0, 10.0), pos2(30.0, 30.0));
    drag(&mut editor, pos2(20.0, 20.0), pos2(80.0, 80.0));
    press_key(&mut editor, Key::Escape);

    assert_eq!(editor.surface().base_pixel(20, 20), Some(WHITE));
    assert_eq!(editor.surface().base_pixel(75, 75), Some(BLUE));
    assert_eq!(editor.history().undo_len(), 2);

    let moved = editor.surface().snapshot(LayerKind::Base);
    assert!(editor.undo());
    assert_eq!(editor.surface().snapshot(LayerKind::Base), before);
    assert!(editor.redo());
    assert_eq!(editor.surface().snapshot(LayerKind::Base), moved);
}

#[test]
fn test_ellipse_selection_only_lifts_the_ellipse() {
    let mut editor = blue_canvas(300, 300);
    editor.set_tool(ToolKind::EllipseSelection);
    drag(&mut editor, pos2(100.0, 100.0), pos2(200.0, 200.0));

    assert_eq!(editor.surface().base_pixel(150, 150), Some(WHITE));
    assert_eq!(editor.surface().base_pixel(102, 102), Some(BLUE));

    let selection = editor.surface().layer(LayerKind::Selection);
    assert_eq!(selection.pixel(1, 1), Some([0, 0, 0, 0]));
    assert_eq!(selection.pixel(50, 50), Some(BLUE));
}

#[test]
fn test_lasso_rejects_crossing_point_then_closes() {
    let mut editor = blue_canvas(200, 200);
    let recorder = EventRecorder::new();
    editor.subscribe(Box::new(recorder.clone()));
    editor.set_tool(ToolKind::LassoSelection);

    for (x, y) in [(50.0, 50.0), (150.0, 50.0), (150.0, 150.0)] {
        click(&mut editor, pos2(x, y));
    }
    // crosses the first edge
    click(&mut editor, pos2(100.0, 20.0));
    assert!(recorder.events().contains(&EditorEvent::CursorChanged(egui::CursorIcon::NotAllowed)));
    assert_eq!(editor.active_tool().current_state_name(), "Selecting");

    click(&mut editor, pos2(52.0, 52.0));
    assert_eq!(editor.active_tool().current_state_name(), "Manipulating");
    assert_eq!(editor.surface().base_pixel(140, 60), Some(WHITE));
    assert_eq!(editor.surface().base_pixel(60, 140), Some(BLUE));
}

#[test]
fn test_shift_forces_square_selection() {
    let mut editor = editor(100, 100);
    editor.set_tool(ToolKind::RectangleSelection);
    editor.handle_input(InputEvent::ModifiersChanged(Modifiers::SHIFT));
    drag(&mut editor, pos2(10.0, 10.0), pos2(60.0, 40.0));

    let selection = editor.surface().layer(LayerKind::Selection);
    assert_eq!((selection.width(), selection.height()), (30, 30));
}

#[test]
fn test_handle_drag_resizes_floating_layer() {
    let mut editor = blue_canvas(300, 300);
    editor.set_tool(ToolKind::RectangleSelection);
    drag(&mut editor, pos2(100.0, 100.0), pos2(200.0, 180.0));
    drag(&mut editor, pos2(200.0, 180.0), pos2(250.0, 230.0));

    let selection = editor.surface().layer(LayerKind::Selection);
    assert_eq!((selection.width(), selection.height()), (150, 130));
    assert_eq!(editor.surface().floating_position(LayerKind::Selection), pos2(100.0, 100.0));

    assert_eq!(editor.surface().base_pixel(150, 150), Some(WHITE));
    press_key(&mut editor, Key::Escape);
    // scaled content covers the hole
    let [r, g, b, a] = editor.surface().base_pixel(150, 150).unwrap();
    assert!(r < 5 && g < 5 && b > 250 && a == 255, "got {:?}", [r, g, b, a]);
}

#[test]
fn test_escape_while_selecting_changes_nothing() {
    let mut editor = blue_canvas(100, 100);
    editor.set_tool(ToolKind::RectangleSelection);
    let before = editor.surface().snapshot(LayerKind::Base);
    let undo_len = editor.history().undo_len();

    editor.handle_input(InputEvent::PointerDown {
        pos: pos2(10.0, 10.0),
        button: egui::PointerButton::Primary,
    });
    editor.handle_input(InputEvent::PointerMove { pos: pos2(50.0, 50.0) });
    press_key(&mut editor, Key::Escape);

    assert_eq!(editor.active_tool().current_state_name(), "Idle");
    assert_eq!(editor.surface().snapshot(LayerKind::Base), before);
    assert_eq!(editor.history().undo_len(), undo_len);
}

#[test]
fn test_tool_switch_commits_selection() {
    let mut editor = blue_canvas(100, 100);
    let recorder = EventRecorder::new();
    editor.subscribe(Box::new(recorder.clone()));
    editor.set_tool(ToolKind::RectangleSelection);
    drag(&mut editor, pos2(10.0, 10.0), pos2(40.0, 40.0));
    let undo_len = editor.history().undo_len();

    editor.set_tool(ToolKind::Line);
    assert_eq!(editor.history().undo_len(), undo_len + 1);
    assert!(editor.surface().layer(LayerKind::Selection).is_empty());
    assert!(recorder.events().contains(&EditorEvent::SelectionCleared));
    assert_eq!(editor.surface().base_pixel(20, 20), Some(BLUE));
}

#[test]
fn test_undo_while_manipulating_reverts_the_lift() {
    let mut editor = blue_canvas(100, 100);
    editor.set_tool(ToolKind::RectangleSelection);
    let before = editor.surface().snapshot(LayerKind::Base);
    let undo_len = editor.history().undo_len();

    drag(&mut editor, pos2(10.0, 10.0), pos2(40.0, 40.0));
    drag(&mut editor, pos2(20.0, 20.0), pos2(60.0, 60.0));
    shortcut(&mut editor, Key::Z);

    assert_eq!(editor.surface().snapshot(LayerKind::Base), before);
    assert_eq!(editor.history().undo_len(), undo_len);
    assert_eq!(editor.history().redo_len(), 1);
    assert!(editor.active_tool().as_selection().is_some_and(|tool| !tool.is_manipulating()));
}

#[test]
fn test_select_all_and_nudge() {
    let mut editor = blue_canvas(60, 60);
    shortcut(&mut editor, Key::A);
    assert_eq!(editor.tool_kind(), ToolKind::RectangleSelection);
    press_key(&mut editor, Key::ArrowDown);
    press_key(&mut editor, Key::ArrowDown);

    let floating = editor.active_tool().as_selection().and_then(|tool| tool.floating()).unwrap();
    assert_eq!(floating.bounds().min, pos2(0.0, 6.0));
    assert_eq!(floating.bounds().size(), egui::vec2(60.0, 60.0));
}
