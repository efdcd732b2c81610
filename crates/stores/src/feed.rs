//! Cross-context change propagation.
//!
//! One execution context's mutation becomes visible in another through
//! the shared persistence surface, but the other context has to find out.
//! The source system grew three inconsistent mechanisms for this (storage
//! events, custom DOM events, interval polling); this module replaces all
//! of them with a single change feed.
//!
//! A [`ChangeFeed`] is a cheaply cloneable handle over a broadcast
//! channel. Stores constructed with a feed publish a [`ChangeNotice`]
//! after every successful persisted write; a consumer in another context
//! holds a [`ChangeListener`], drains it at its own pace, and reacts by
//! reloading the matching store. Contexts without a feed can still poll
//! via the stores' `reload_if_changed`.
//!
//! Propagation is best-effort: a notice is observed eventually, and never
//! before the writer's write completed. Lagging listeners lose the oldest
//! notices, which is harmless - a reload always reads the latest blob.

use tokio::sync::broadcast;
use tracing::warn;

use crate::persist::Slot;

/// Buffered notices per listener before the oldest are dropped.
const FEED_CAPACITY: usize = 64;

/// A change to a persisted slot: which slot, and the new blob.
#[derive(Debug, Clone)]
pub struct ChangeNotice {
    /// The slot that was written.
    pub slot: Slot,
    /// The blob that was persisted.
    pub blob: String,
}

/// Broadcast handle shared by stores and cross-context consumers.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeNotice>,
}

impl ChangeFeed {
    /// Create a new feed.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(FEED_CAPACITY);
        Self { tx }
    }

    /// Register a listener for subsequent notices.
    ///
    /// Notices published before this call are not delivered.
    #[must_use]
    pub fn subscribe(&self) -> ChangeListener {
        ChangeListener {
            rx: self.tx.subscribe(),
        }
    }

    /// Publish a notice. Fire-and-forget: with no listeners the notice is
    /// dropped.
    pub(crate) fn publish(&self, slot: Slot, blob: String) {
        let _ = self.tx.send(ChangeNotice { slot, blob });
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving end of a [`ChangeFeed`].
#[derive(Debug)]
pub struct ChangeListener {
    rx: broadcast::Receiver<ChangeNotice>,
}

impl ChangeListener {
    /// Take the next pending notice, if any.
    ///
    /// Non-blocking; safe to call from synchronous code on any thread.
    pub fn try_next(&mut self) -> Option<ChangeNotice> {
        loop {
            match self.rx.try_recv() {
                Ok(notice) => return Some(notice),
                Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                    // Dropped notices are recovered by the next reload.
                    warn!(missed, "Change feed listener lagged");
                }
                Err(
                    broadcast::error::TryRecvError::Empty
                    | broadcast::error::TryRecvError::Closed,
                ) => return None,
            }
        }
    }

    /// Drain every pending notice in publication order.
    pub fn drain(&mut self) -> Vec<ChangeNotice> {
        let mut notices = Vec::new();
        while let Some(notice) = self.try_next() {
            notices.push(notice);
        }
        notices
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_reaches_listener_in_order() {
        let feed = ChangeFeed::new();
        let mut listener = feed.subscribe();

        feed.publish(Slot::Products, "[1]".to_owned());
        feed.publish(Slot::Cart, "[2]".to_owned());

        let notices = listener.drain();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices.first().unwrap().slot, Slot::Products);
        assert_eq!(notices.first().unwrap().blob, "[1]");
        assert_eq!(notices.get(1).unwrap().slot, Slot::Cart);
    }

    #[test]
    fn test_publish_without_listeners_is_dropped() {
        let feed = ChangeFeed::new();
        feed.publish(Slot::Orders, "[]".to_owned());

        // A listener registered afterwards sees nothing.
        let mut listener = feed.subscribe();
        assert!(listener.try_next().is_none());
    }

    #[test]
    fn test_each_listener_sees_every_notice() {
        let feed = ChangeFeed::new();
        let mut a = feed.subscribe();
        let mut b = feed.subscribe();

        feed.publish(Slot::RegisteredUsers, "[]".to_owned());

        assert_eq!(a.drain().len(), 1);
        assert_eq!(b.drain().len(), 1);
    }

    #[test]
    fn test_lagged_listener_recovers() {
        let feed = ChangeFeed::new();
        let mut listener = feed.subscribe();

        for i in 0..200 {
            feed.publish(Slot::Cart, format!("[{i}]"));
        }

        // The oldest notices were dropped, but draining still yields the
        // most recent ones and terminates.
        let notices = listener.drain();
        assert!(!notices.is_empty());
        assert_eq!(notices.last().unwrap().blob, "[199]");
    }
}
