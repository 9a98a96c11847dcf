use std::cell::RefCell;

use log::trace;

use crate::event::{EditorEvent, EventHandler};

/// Broadcasts editor notifications (cursor, selection bounds, history
/// state) to every subscribed UI collaborator, in subscription order.
///
/// Handlers must not emit on the bus they are subscribed to.
pub struct EventBus {
    handlers: RefCell<Vec<Box<dyn EventHandler>>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &format!("<{} handlers>", self.handlers.borrow().len()))
            .finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(Vec::new()),
        }
    }

    /// Handlers are never removed; they live as long as the bus.
    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        self.handlers.borrow_mut().push(handler);
    }

    pub fn emit(&self, event: EditorEvent) {
        let mut handlers = self.handlers.borrow_mut();
        trace!("Emitting {:?} to {} handlers", event, handlers.len());
        for handler in handlers.iter_mut() {
            handler.handle_event(&event);
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }
}
