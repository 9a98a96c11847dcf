mod common;

use common::{click, drag, editor, shortcut};
use egui::{Key, pos2};
use paint_engine::color::Rgba;
use paint_engine::command::{FillCommand, FillMode, ShapeCommand, ShapeGeometry, ShapeStyle};
use paint_engine::event::EventRecorder;
use paint_engine::{Command, CommandHistory, EditorEvent, LayerKind, RasterSurface, ToolKind};

fn rectangle(x: f32, color: Rgba) -> Command {
    Command::Shape(ShapeCommand::new(
        ShapeGeometry::Rectangle {
            start: pos2(x, 5.0),
            end: pos2(x + 12.0, 30.0),
        },
        ShapeStyle {
            line_width: 3.0,
            fill_mode: FillMode::OutlineFill,
            primary: color,
            secondary: Rgba::rgb(0, 0, 0),
        },
    ))
}

#[test]
fn test_undo_all_then_redo_all_restores_final_state() {
    common::init_logging();
    let mut surface = RasterSurface::new(80, 40).unwrap();
    let mut history = CommandHistory::new();
    let initial = surface.snapshot(LayerKind::Base);

    let commands = vec![
        rectangle(2.0, Rgba::rgb(255, 0, 0)),
        rectangle(10.0, Rgba::rgb(0, 255, 0)),
        Command::Fill(FillCommand {
            seed: (70, 35),
            color: Rgba::rgb(0, 0, 255),
            max_distance: 0.0,
            contiguous: true,
        }),
        rectangle(40.0, Rgba::rgb(20, 20, 20)),
    ];
    for command in commands.iter().cloned() {
        history.execute(command, &mut surface).unwrap();
    }
    let final_state = surface.snapshot(LayerKind::Base);

    for _ in 0..commands.len() {
        assert!(history.undo(&mut surface).unwrap());
    }
    assert_eq!(surface.snapshot(LayerKind::Base), initial);
    assert!(!history.undo(&mut surface).unwrap());

    for _ in 0..commands.len() {
        assert!(history.redo(&mut surface).unwrap());
    }
    assert_eq!(surface.snapshot(LayerKind::Base), final_state);
    assert!(!history.redo(&mut surface).unwrap());
}

#[test]
fn test_new_command_clears_redo() {
    let mut surface = RasterSurface::new(60, 40).unwrap();
    let mut history = CommandHistory::new();
    history.execute(rectangle(2.0, Rgba::rgb(255, 0, 0)), &mut surface).unwrap();
    history.undo(&mut surface).unwrap();
    assert!(history.can_redo());

    history.execute(rectangle(20.0, Rgba::rgb(0, 255, 0)), &mut surface).unwrap();
    assert!(!history.can_redo());
    assert_eq!(history.undo_len(), 1);
}

#[test]
fn test_history_limit_drops_oldest() {
    let mut surface = RasterSurface::new(80, 40).unwrap();
    let mut history = CommandHistory::with_limit(2);
    for x in [2.0, 20.0, 40.0] {
        history.execute(rectangle(x, Rgba::rgb(255, 0, 0)), &mut surface).unwrap();
    }
    assert_eq!(history.undo_len(), 2);
    history.undo(&mut surface).unwrap();
    history.undo(&mut surface).unwrap();
    assert!(!history.can_undo());
    // the first rectangle can no longer be undone
    assert_eq!(surface.base_pixel(8, 15), Some([255, 0, 0, 255]));
}

#[test]
fn test_editor_shortcuts_emit_history_changes() {
    let mut editor = editor(60, 60);
    let recorder = EventRecorder::new();
    editor.subscribe(Box::new(recorder.clone()));

    // undo on an empty history is a no-op
    shortcut(&mut editor, Key::Z);
    assert!(recorder.events().is_empty());

    drag(&mut editor, pos2(5.0, 5.0), pos2(40.0, 40.0));
    editor.set_tool(ToolKind::PaintBucket);
    click(&mut editor, pos2(50.0, 50.0));
    assert_eq!(editor.history().undo_len(), 2);

    shortcut(&mut editor, Key::Z);
    assert_eq!(
        recorder.last(),
        Some(EditorEvent::HistoryChanged {
            can_undo: true,
            can_redo: true
        })
    );

    editor.handle_input(paint_engine::InputEvent::KeyDown {
        key: Key::Z,
        modifiers: egui::Modifiers::CTRL | egui::Modifiers::SHIFT,
    });
    assert_eq!(
        recorder.last(),
        Some(EditorEvent::HistoryChanged {
            can_undo: true,
            can_redo: false
        })
    );
}
