#![allow(dead_code)]

use egui::{Key, Modifiers, PointerButton, Pos2};
use paint_engine::{Editor, EditorConfig, InputEvent};

/// Routes library logs through the test harness
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn editor(width: u32, height: u32) -> Editor {
    init_logging();
    let config = EditorConfig {
        canvas_width: width,
        canvas_height: height,
        ..EditorConfig::default()
    };
    Editor::new(config).unwrap()
}

pub fn drag(editor: &mut Editor, from: Pos2, to: Pos2) {
    editor.handle_input(InputEvent::PointerDown { pos: from, button: PointerButton::Primary });
    editor.handle_input(InputEvent::PointerMove { pos: to });
    editor.handle_input(InputEvent::PointerUp { pos: to, button: PointerButton::Primary });
}

pub fn click(editor: &mut Editor, pos: Pos2) {
    editor.handle_input(InputEvent::PointerDown { pos, button: PointerButton::Primary });
    editor.handle_input(InputEvent::PointerUp { pos, button: PointerButton::Primary });
}

pub fn press_key(editor: &mut Editor, key: Key) {
    editor.handle_input(InputEvent::KeyDown { key, modifiers: Modifiers::NONE });
}

pub fn shortcut(editor: &mut Editor, key: Key) {
    editor.handle_input(InputEvent::KeyDown { key, modifiers: Modifiers::CTRL });
}
