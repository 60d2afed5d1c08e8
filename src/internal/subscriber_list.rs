//! Copy-on-write subscriber storage shared by event slots and the failure hub.

use std::sync::Arc;

use super::sync::RwLock;
use crate::subscription::SubscriptionId;

/// A registered subscriber together with its removal handle.
#[derive(Clone)]
pub(crate) struct Entry<T> {
    pub(crate) id: SubscriptionId,
    pub(crate) value: T,
}

/// Ordered, thread-safe list of subscribers.
///
/// Readers take an `Arc` snapshot under a short read lock and iterate it
/// without holding any lock, so a subscriber may add or remove subscribers
/// (including itself) while being invoked. Writers clone the vector only when
/// a snapshot is still alive.
pub(crate) struct SubscriberList<T> {
    entries: RwLock<Arc<Vec<Entry<T>>>>,
}

impl<T: Clone> SubscriberList<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Appends a subscriber, preserving registration order.
    pub(crate) fn push(&self, value: T) -> SubscriptionId {
        let id = SubscriptionId::next();
        let mut entries = self.entries.write();
        Arc::make_mut(&mut *entries).push(Entry { id, value });
        id
    }

    /// Removes the subscriber registered under `id`.
    pub(crate) fn remove(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.write();
        match entries.iter().position(|entry| entry.id == id) {
            Some(index) => {
                Arc::make_mut(&mut *entries).remove(index);
                true
            }
            None => false,
        }
    }

    /// Returns the current subscribers in registration order.
    pub(crate) fn snapshot(&self) -> Arc<Vec<Entry<T>>> {
        Arc::clone(&*self.entries.read())
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub(crate) fn clear(&self) {
        *self.entries.write() = Arc::new(Vec::new());
    }
}

impl<T: Clone> Default for SubscriberList<T> {
    fn default() -> Self {
        Self::new()
    }
}
