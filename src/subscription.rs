//! Subscription handles.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque handle returned when a callback is registered.
///
/// Ids are unique for the lifetime of the process, so registering the same
/// closure twice yields two independently removable subscriptions.
///
/// # Examples
///
/// ```
/// use ferrous_lifecycle::EventSlot;
///
/// let slot: EventSlot<(), u32> = EventSlot::new();
/// let first = slot.subscribe(|_, _| Ok(()));
/// let second = slot.subscribe(|_, _| Ok(()));
///
/// assert_ne!(first, second);
/// assert!(slot.unsubscribe(first));
/// assert_eq!(slot.len(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) fn next() -> Self {
        SubscriptionId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw numeric value of this id.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic() {
        let a = SubscriptionId::next();
        let b = SubscriptionId::next();
        assert!(b > a);
        assert_eq!(format!("{}", a), format!("sub#{}", a.as_u64()));
    }
}
