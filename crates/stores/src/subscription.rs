//! Per-store subscriber registries.
//!
//! Every store carries a listener list and notifies it synchronously
//! after each mutation's persisted write. Listeners fire in subscription
//! order and receive a snapshot of the collection. Subscribing or
//! unsubscribing from inside a listener is not part of the contract: the
//! registry snapshots the list before dispatch so it never deadlocks, but
//! whether the change affects the in-flight notification is unspecified.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use crate::sync::lock;

type Callback<T> = Arc<dyn Fn(&[T]) + Send + Sync>;

struct Entry<T: 'static> {
    id: u64,
    callback: Callback<T>,
}

/// Ordered listener registry for one store.
pub(crate) struct Listeners<T: 'static> {
    entries: Arc<Mutex<Vec<Entry<T>>>>,
    next_id: AtomicU64,
}

impl<T: 'static> Listeners<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
            next_id: AtomicU64::new(0),
        }
    }

    /// Register `listener` and hand back its removal handle.
    pub(crate) fn subscribe(
        &self,
        listener: impl Fn(&[T]) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.entries).push(Entry {
            id,
            callback: Arc::new(listener),
        });

        let entries: Weak<Mutex<Vec<Entry<T>>>> = Arc::downgrade(&self.entries);
        Subscription {
            cancel: Box::new(move || {
                if let Some(entries) = entries.upgrade() {
                    lock(&entries).retain(|entry| entry.id != id);
                }
            }),
        }
    }

    /// Invoke every current listener, in subscription order, with a
    /// snapshot of the collection.
    pub(crate) fn notify(&self, snapshot: &[T]) {
        let callbacks: Vec<Callback<T>> = lock(&self.entries)
            .iter()
            .map(|entry| Arc::clone(&entry.callback))
            .collect();
        for callback in callbacks {
            callback(snapshot);
        }
    }
}

/// Handle returned by a store's `subscribe`.
///
/// Calling [`Subscription::unsubscribe`] removes exactly the listener
/// this handle was created for; all other listeners keep firing.
/// Dropping the handle without calling it leaves the listener registered
/// for the store's lifetime.
#[must_use = "dropping the handle leaves the listener registered; call unsubscribe() to remove it"]
pub struct Subscription {
    cancel: Box<dyn FnOnce() + Send>,
}

impl Subscription {
    /// Remove the listener this handle refers to.
    pub fn unsubscribe(self) {
        (self.cancel)();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
