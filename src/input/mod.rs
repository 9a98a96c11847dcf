use egui::{Event, Key, Modifiers, PointerButton, Pos2, RawInput};
use log::debug;

use crate::geometry::distance;

/// Presses closer together than this (seconds) can form a double click
pub const MAX_DOUBLE_CLICK_DELAY: f64 = 0.3;

/// Presses further apart than this (points) never form a double click
pub const MAX_CLICK_DIST: f32 = 6.0;

/// Input delivered to the editor, in canvas coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Mouse button was pressed
    PointerDown { pos: Pos2, button: PointerButton },
    /// Mouse moved (with or without buttons pressed)
    PointerMove { pos: Pos2 },
    /// Mouse button was released
    PointerUp { pos: Pos2, button: PointerButton },
    /// Mouse left the canvas
    PointerLeave,
    /// Mouse entered the canvas
    PointerEnter { pos: Pos2 },
    /// Second primary press in quick succession
    DoubleClick { pos: Pos2 },
    KeyDown { key: Key, modifiers: Modifiers },
    KeyUp { key: Key, modifiers: Modifiers },
    /// Shift/Ctrl/Alt state changed
    ModifiersChanged(Modifiers),
}

/// Translates raw egui input into `InputEvent`s.
///
/// Positions are shifted by `canvas_origin` so the canvas' top-left corner
/// maps to `(0, 0)`.
#[derive(Debug, Clone, Default)]
pub struct InputHandler {
    canvas_origin: Pos2,
    last_pointer_pos: Option<Pos2>,
    modifiers: Modifiers,
    last_press: Option<(f64, Pos2)>,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Where the canvas sits in screen coordinates
    pub fn set_canvas_origin(&mut self, origin: Pos2) {
        self.canvas_origin = origin;
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    fn to_canvas(&self, pos: Pos2) -> Pos2 {
        (pos - self.canvas_origin).to_pos2()
    }

    fn track_modifiers(&mut self, modifiers: Modifiers, events: &mut Vec<InputEvent>) {
        if modifiers != self.modifiers {
            self.modifiers = modifiers;
            events.push(InputEvent::ModifiersChanged(modifiers));
        }
    }

    /// Whether a primary press at `pos` and `time` completes a double click.
    fn is_double_click(&mut self, time: f64, pos: Pos2) -> bool {
        let double = self.last_press.is_some_and(|(last_time, last_pos)| {
            time - last_time <= MAX_DOUBLE_CLICK_DELAY && distance(last_pos, pos) <= MAX_CLICK_DIST
        });
        // a third quick press starts a new pair
        self.last_press = if double { None } else { Some((time, pos)) };
        double
    }

    /// Process one frame of raw egui input and generate our InputEvents
    pub fn process_input(&mut self, raw: &RawInput) -> Vec<InputEvent> {
        let mut events = Vec::new();
        let time = raw.time.unwrap_or(0.0);
        self.track_modifiers(raw.modifiers, &mut events);

        for event in &raw.events {
            match event {
                Event::PointerMoved(screen_pos) => {
                    let pos = self.to_canvas(*screen_pos);
                    if self.last_pointer_pos.is_none() {
                        events.push(InputEvent::PointerEnter { pos });
                    }
                    if self.last_pointer_pos != Some(pos) {
                        events.push(InputEvent::PointerMove { pos });
                    }
                    self.last_pointer_pos = Some(pos);
                }
                Event::PointerGone => {
                    if self.last_pointer_pos.take().is_some() {
                        events.push(InputEvent::PointerLeave);
                    }
                }
                Event::PointerButton {
                    pos: screen_pos,
                    button,
                    pressed,
                    modifiers,
                } => {
                    self.track_modifiers(*modifiers, &mut events);
                    let pos = self.to_canvas(*screen_pos);
                    if *pressed {
                        events.push(InputEvent::PointerDown { pos, button: *button });
                        if *button == PointerButton::Primary && self.is_double_click(time, pos) {
                            debug!("Double click at ({}, {})", pos.x, pos.y);
                            events.push(InputEvent::DoubleClick { pos });
                        }
                    } else {
                        events.push(InputEvent::PointerUp { pos, button: *button });
                    }
                }
                Event::Key {
                    key,
                    pressed,
                    modifiers,
                    ..
                } => {
                    self.track_modifiers(*modifiers, &mut events);
                    if *pressed {
                        events.push(InputEvent::KeyDown { key: *key, modifiers: *modifiers });
                    } else {
                        events.push(InputEvent::KeyUp { key: *key, modifiers: *modifiers });
                    }
                }
                _ => {}
            }
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn press(pos: Pos2, pressed: bool) -> Event {
        Event::PointerButton {
            pos,
            button: PointerButton::Primary,
            pressed,
            modifiers: Modifiers::NONE,
        }
    }

    fn frame(time: f64, events: Vec<Event>) -> RawInput {
        RawInput {
            time: Some(time),
            events,
            ..Default::default()
        }
    }

    #[test]
    fn positions_are_relative_to_canvas() {
        let mut handler = InputHandler::new();
        handler.set_canvas_origin(pos2(100.0, 50.0));
        let events = handler.process_input(&frame(0.0, vec![Event::PointerMoved(pos2(110.0, 70.0))]));
        assert_eq!(
            events,
            vec![
                InputEvent::PointerEnter { pos: pos2(10.0, 20.0) },
                InputEvent::PointerMove { pos: pos2(10.0, 20.0) },
            ]
        );
        let events = handler.process_input(&frame(0.1, vec![Event::PointerGone]));
        assert_eq!(events, vec![InputEvent::PointerLeave]);
    }

    #[test]
    fn quick_second_press_is_a_double_click() {
        let mut handler = InputHandler::new();
        let p = pos2(5.0, 5.0);
        handler.process_input(&frame(1.0, vec![press(p, true), press(p, false)]));
        let events = handler.process_input(&frame(1.2, vec![press(p, true)]));
        assert!(events.contains(&InputEvent::DoubleClick { pos: p }));

        let events = handler.process_input(&frame(2.0, vec![press(p, true)]));
        assert!(!events.contains(&InputEvent::DoubleClick { pos: p }));
    }

    #[test]
    fn modifier_changes_are_reported_once() {
        let mut handler = InputHandler::new();
        let raw = RawInput {
            modifiers: Modifiers::SHIFT,
            ..Default::default()
        };
        assert_eq!(handler.process_input(&raw), vec![InputEvent::ModifiersChanged(Modifiers::SHIFT)]);
        assert!(handler.process_input(&raw).is_empty());
        assert!(handler.modifiers().shift);
    }
}
