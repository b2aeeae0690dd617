//! Listener registry for row set notifications.
//!
//! This module provides listener IDs and an ordered registry. The registry is a
//! cheap handle (`Clone` shares the same listener list), which lets a listener
//! keep a handle and unregister itself from inside a callback.

use crate::event::RowSetEvent;
use crate::listener::{dispatch, CallbackListener, RowSetListener};
use std::cell::RefCell;
use std::rc::Rc;

/// Unique identifier for a registered listener.
pub type ListenerId = u64;

struct Registered {
    id: ListenerId,
    listener: Rc<dyn RowSetListener>,
}

struct Inner {
    /// Listeners in registration order.
    listeners: Vec<Registered>,
    /// Next listener ID to assign.
    next_id: ListenerId,
}

/// Ordered, copy-on-iterate listener registry.
#[derive(Clone)]
pub struct ListenerRegistry {
    inner: Rc<RefCell<Inner>>,
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ListenerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                listeners: Vec::new(),
                next_id: 1,
            })),
        }
    }

    /// Registers a listener and returns its ID.
    pub fn add(&self, listener: Rc<dyn RowSetListener>) -> ListenerId {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.push(Registered { id, listener });
        id
    }

    /// Registers a closure that receives every event.
    pub fn add_callback<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&RowSetEvent) + 'static,
    {
        self.add(Rc::new(CallbackListener::new(callback)))
    }

    /// Unregisters a listener by ID.
    ///
    /// Returns true if the listener was found and removed.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.listeners.len();
        inner.listeners.retain(|r| r.id != id);
        inner.listeners.len() != before
    }

    /// Notifies all listeners registered when the call started.
    pub fn notify(&self, event: &RowSetEvent) {
        // Snapshot first: callbacks may mutate the registry.
        let snapshot: Vec<Rc<dyn RowSetListener>> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .map(|r| r.listener.clone())
            .collect();
        if snapshot.is_empty() {
            return;
        }
        tracing::trace!(kind = ?event.kind, row = event.row, listeners = snapshot.len(), "dispatching row set event");
        for listener in snapshot {
            dispatch(listener.as_ref(), event);
        }
    }

    /// Returns the number of registered listeners.
    pub fn len(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Returns true if there are no listeners.
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().listeners.is_empty()
    }

    /// Returns all listener IDs in registration order.
    pub fn ids(&self) -> Vec<ListenerId> {
        self.inner.borrow().listeners.iter().map(|r| r.id).collect()
    }

    /// Removes every listener.
    pub fn clear(&self) {
        self.inner.borrow_mut().listeners.clear();
    }
}
