//! Shared store core: collection + slot + subscribers.
//!
//! All four stores follow one contract (load-or-seed on open, defensive
//! reads, mutate-persist-notify, reload on external change); this module
//! holds that contract once so the stores only carry their own semantics.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{error, warn};

use crate::feed::ChangeFeed;
use crate::persist::{Slot, StorageBackend, load_or_seed, write_through};
use crate::subscription::{Listeners, Subscription};
use crate::sync::lock;

/// One store's state: the in-memory collection, its persisted slot, and
/// its subscriber list.
pub(crate) struct Collection<T: 'static> {
    backend: Arc<dyn StorageBackend>,
    feed: Option<ChangeFeed>,
    slot: Slot,
    items: Mutex<Vec<T>>,
    /// Blob corresponding to the current in-memory collection; the
    /// last-seen value for `reload_if_changed` mismatch detection.
    last_blob: Mutex<Option<String>>,
    listeners: Listeners<T>,
}

impl<T> Collection<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Load the slot, seeding it when absent or unparsable.
    pub(crate) fn open(
        backend: Arc<dyn StorageBackend>,
        feed: Option<ChangeFeed>,
        slot: Slot,
        seed: impl FnOnce() -> Vec<T>,
    ) -> Self {
        let (items, blob) = load_or_seed(backend.as_ref(), slot, seed);
        Self {
            backend,
            feed,
            slot,
            items: Mutex::new(items),
            last_blob: Mutex::new(blob),
            listeners: Listeners::new(),
        }
    }

    /// Read the collection through `f` without exposing the lock.
    pub(crate) fn read<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&lock(&self.items))
    }

    /// A defensive copy of the whole collection.
    pub(crate) fn snapshot(&self) -> Vec<T> {
        lock(&self.items).clone()
    }

    /// Mutate through `f`; when it asks for a commit, persist the full
    /// collection and notify every subscriber, in that order.
    pub(crate) fn mutate_with<R>(&self, f: impl FnOnce(&mut Vec<T>) -> (bool, R)) -> R {
        let (result, snapshot) = {
            let mut items = lock(&self.items);
            let (commit, result) = f(&mut items);
            let snapshot = commit.then(|| items.clone());
            (result, snapshot)
        };
        if let Some(snapshot) = snapshot {
            self.commit(&snapshot);
        }
        result
    }

    /// Mutate and always commit.
    pub(crate) fn mutate<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> R {
        self.mutate_with(|items| (true, f(items)))
    }

    /// Mutate and commit only when `f` produced a value.
    pub(crate) fn try_mutate<R>(&self, f: impl FnOnce(&mut Vec<T>) -> Option<R>) -> Option<R> {
        self.mutate_with(|items| {
            let result = f(items);
            (result.is_some(), result)
        })
    }

    /// Register a mutation listener; fires after each persisted write.
    pub(crate) fn subscribe(
        &self,
        listener: impl Fn(&[T]) + Send + Sync + 'static,
    ) -> Subscription {
        self.listeners.subscribe(listener)
    }

    /// Re-read the slot and replace the in-memory collection, notifying
    /// subscribers. Absent or unparsable blobs leave the collection as it
    /// was (another context may be mid-write).
    pub(crate) fn reload(&self) {
        match self.backend.read(self.slot) {
            Ok(Some(blob)) => {
                self.replace_from(blob);
            }
            Ok(None) => warn!(slot = %self.slot, "Reload found no blob, keeping current state"),
            Err(e) => warn!(slot = %self.slot, error = %e, "Reload failed, keeping current state"),
        }
    }

    /// Poll the slot and reload only when the persisted blob differs from
    /// the last one this instance saw. Returns whether a reload happened.
    pub(crate) fn reload_if_changed(&self) -> bool {
        let current = match self.backend.read(self.slot) {
            Ok(current) => current,
            Err(e) => {
                warn!(slot = %self.slot, error = %e, "Change poll failed");
                return false;
            }
        };

        let Some(blob) = current else {
            return false;
        };
        if lock(&self.last_blob).as_deref() == Some(blob.as_str()) {
            return false;
        }
        self.replace_from(blob)
    }

    fn replace_from(&self, blob: String) -> bool {
        match serde_json::from_str::<Vec<T>>(&blob) {
            Ok(items) => {
                let snapshot = {
                    let mut current = lock(&self.items);
                    *current = items;
                    current.clone()
                };
                *lock(&self.last_blob) = Some(blob);
                self.listeners.notify(&snapshot);
                true
            }
            Err(e) => {
                error!(slot = %self.slot, error = %e, "Unparsable blob on reload, keeping current state");
                false
            }
        }
    }

    fn commit(&self, snapshot: &[T]) {
        let blob = write_through(self.backend.as_ref(), self.feed.as_ref(), self.slot, snapshot);
        *lock(&self.last_blob) = blob;
        self.listeners.notify(snapshot);
    }
}
