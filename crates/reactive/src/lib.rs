//! Rowset Reactive - change notification for cached row sets.
//!
//! Row sets report three kinds of events to registered listeners:
//!
//! - `CursorMoved`: any successful navigation
//! - `RowChanged`: a row was updated, deleted, inserted or had a change undone
//! - `RowSetChanged`: the whole buffer was replaced, synchronized or released
//!
//! Listeners are called synchronously, in registration order, after the state
//! change completed. The registry snapshots its listeners before dispatch, so a
//! listener may add or remove listeners (itself included) without affecting the
//! pass in progress.
//!
//! # Example
//!
//! ```rust
//! use rowset_reactive::{EventKind, ListenerRegistry, RowSetEvent};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let registry = ListenerRegistry::new();
//! let moves = Rc::new(Cell::new(0));
//! let counter = moves.clone();
//! registry.add_callback(move |event| {
//!     if event.kind == EventKind::CursorMoved {
//!         counter.set(counter.get() + 1);
//!     }
//! });
//!
//! registry.notify(&RowSetEvent::cursor_moved(1));
//! assert_eq!(moves.get(), 1);
//! ```

pub mod event;
pub mod listener;
pub mod subscription;

pub use event::{EventKind, RowSetEvent};
pub use listener::{CallbackListener, RowSetListener};
pub use subscription::{ListenerId, ListenerRegistry};
