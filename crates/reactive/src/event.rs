//! Row set events.

/// Kind of a row set event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The cursor moved.
    CursorMoved,
    /// A single row changed.
    RowChanged,
    /// The row set contents changed as a whole.
    RowSetChanged,
}

/// An event delivered to row set listeners.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowSetEvent {
    /// What happened.
    pub kind: EventKind,
    /// Cursor position when the event fired (0 when not on a visible row).
    pub row: usize,
}

impl RowSetEvent {
    /// Creates a cursor-moved event.
    pub fn cursor_moved(row: usize) -> Self {
        Self {
            kind: EventKind::CursorMoved,
            row,
        }
    }

    /// Creates a row-changed event.
    pub fn row_changed(row: usize) -> Self {
        Self {
            kind: EventKind::RowChanged,
            row,
        }
    }

    /// Creates a row-set-changed event.
    pub fn row_set_changed() -> Self {
        Self {
            kind: EventKind::RowSetChanged,
            row: 0,
        }
    }
}
