use std::cell::RefCell;
use std::fmt;

use super::{EventHandler, PaintEvent};
use crate::engine::PaintReport;

/// Fans engine notifications out to subscribers, in subscription order.
///
/// Handlers run synchronously inside the engine call that produced the event
/// and must not subscribe further handlers while being notified.
#[derive(Default)]
pub struct EventBus {
    subscribers: RefCell<Vec<Box<dyn EventHandler>>>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subscriber and returns how many there are now.
    pub fn subscribe(&self, handler: Box<dyn EventHandler>) -> usize {
        let mut subscribers = self.subscribers.borrow_mut();
        subscribers.push(handler);
        subscribers.len()
    }

    pub fn len(&self) -> usize {
        self.subscribers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn emit(&self, event: PaintEvent) {
        for subscriber in self.subscribers.borrow_mut().iter_mut() {
            subscriber.handle_event(&event);
        }
    }

    /// Emits every event described by `report`.
    ///
    /// Order: reset, filled cells, completed colors, selection change, board
    /// completion. Nothing is sent for an empty report.
    pub fn publish(&self, report: &PaintReport) {
        if self.is_empty() {
            return;
        }
        for event in PaintEvent::from_report(report) {
            self.emit(event);
        }
    }
}
