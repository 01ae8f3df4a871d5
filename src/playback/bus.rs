//! Page-wide "now playing" broadcast.
//!
//! Listeners are plain callbacks invoked synchronously from `announce`, in
//! registration order. The registry is snapshotted when a broadcast starts:
//! a listener registered mid-broadcast first hears the next announcement, and
//! a listener cancelled mid-broadcast is skipped if its turn has not come yet.
//! No registry borrow is held while callbacks run, so callbacks may freely
//! subscribe or cancel.

use super::identity::InstanceId;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

type Listener = Rc<dyn Fn(InstanceId)>;

struct Registration {
    key: u64,
    active: Rc<Cell<bool>>,
    callback: Listener,
}

#[derive(Default)]
struct Registry {
    next_key: u64,
    entries: Vec<Registration>,
}

/// Broadcast channel deciding which embedded player may be live.
///
/// Cloning shares the same registry. Separate `PlaybackBus::new()` values are
/// fully independent, so page sections can coordinate on their own buses.
#[derive(Clone, Default)]
pub struct PlaybackBus {
    registry: Rc<RefCell<Registry>>,
}

impl PlaybackBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tell every current listener that `id` just started playing.
    pub fn announce(&self, id: InstanceId) {
        let snapshot: Vec<(Rc<Cell<bool>>, Listener)> = self
            .registry
            .borrow()
            .entries
            .iter()
            .map(|entry| (entry.active.clone(), entry.callback.clone()))
            .collect();

        tracing::trace!(%id, listeners = snapshot.len(), "playback bus announce");

        for (active, callback) in snapshot {
            if active.get() {
                callback(id);
            }
        }
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(InstanceId) + 'static,
    {
        let mut registry = self.registry.borrow_mut();
        let key = registry.next_key;
        registry.next_key += 1;

        let active = Rc::new(Cell::new(true));
        registry.entries.push(Registration {
            key,
            active: active.clone(),
            callback: Rc::new(callback),
        });

        Subscription {
            registry: Rc::downgrade(&self.registry),
            key,
            active,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.registry.borrow().entries.len()
    }
}

impl PartialEq for PlaybackBus {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.registry, &other.registry)
    }
}

/// Disposer returned by [`PlaybackBus::subscribe`]. Dropping it cancels.
pub struct Subscription {
    registry: Weak<RefCell<Registry>>,
    key: u64,
    active: Rc<Cell<bool>>,
}

impl Subscription {
    /// Remove the registration. Later calls do nothing.
    pub fn cancel(&self) {
        if !self.active.replace(false) {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            // The callback is dropped after the borrow ends; it may own other subscriptions.
            let removed = {
                let mut registry = registry.borrow_mut();
                registry
                    .entries
                    .iter()
                    .position(|entry| entry.key == self.key)
                    .map(|index| registry.entries.remove(index))
            };
            drop(removed);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}
