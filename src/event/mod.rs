mod bus;
mod events;

pub use bus::EventBus;
pub use events::PaintEvent;

pub trait EventHandler {
    fn handle_event(&mut self, event: &PaintEvent);
}

impl<F> EventHandler for F
where
    F: FnMut(&PaintEvent),
{
    fn handle_event(&mut self, event: &PaintEvent) {
        self(event)
    }
}
