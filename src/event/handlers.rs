use std::cell::RefCell;
use std::rc::Rc;

use crate::event::{EditorEvent, EventHandler};

/// Collects emitted events; clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Rc<RefCell<Vec<EditorEvent>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events recorded so far, oldest first
    pub fn events(&self) -> Vec<EditorEvent> {
        self.events.borrow().clone()
    }

    /// Removes and returns the recorded events
    pub fn take(&self) -> Vec<EditorEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn last(&self) -> Option<EditorEvent> {
        self.events.borrow().last().cloned()
    }
}

impl EventHandler for EventRecorder {
    fn handle_event(&mut self, event: &EditorEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
