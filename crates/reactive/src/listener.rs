//! Listener trait and closure adapter.

use crate::event::{EventKind, RowSetEvent};

/// Observer of row set events.
///
/// Every callback defaults to doing nothing, so listeners only implement the
/// events they care about.
pub trait RowSetListener {
    /// Called after the cursor moved.
    fn cursor_moved(&self, _event: &RowSetEvent) {}

    /// Called after a row changed.
    fn row_changed(&self, _event: &RowSetEvent) {}

    /// Called after the row set changed as a whole.
    fn row_set_changed(&self, _event: &RowSetEvent) {}
}

/// Callback type for closure listeners.
pub type EventCallback = Box<dyn Fn(&RowSetEvent)>;

/// A listener that forwards every event to one closure.
pub struct CallbackListener {
    callback: EventCallback,
}

impl CallbackListener {
    /// Creates a listener from a closure.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&RowSetEvent) + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }
}

impl RowSetListener for CallbackListener {
    fn cursor_moved(&self, event: &RowSetEvent) {
        (self.callback)(event);
    }

    fn row_changed(&self, event: &RowSetEvent) {
        (self.callback)(event);
    }

    fn row_set_changed(&self, event: &RowSetEvent) {
        (self.callback)(event);
    }
}

/// Routes an event to the matching listener callback.
pub(crate) fn dispatch(listener: &dyn RowSetListener, event: &RowSetEvent) {
    match event.kind {
        EventKind::CursorMoved => listener.cursor_moved(event),
        EventKind::RowChanged => listener.row_changed(event),
        EventKind::RowSetChanged => listener.row_set_changed(event),
    }
}
