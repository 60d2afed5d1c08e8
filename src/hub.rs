//! Central hub for failures that have nowhere else to go.
//!
//! A process-wide instance is available through [`FailureHub::global`]. It
//! is created on first use and lives for the rest of the process. Code that
//! needs isolation (tests in particular) constructs its own hub and injects it
//! into a [`SafeBroadcaster`](crate::SafeBroadcaster).

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::error::BoxError;
use crate::failure::{Failure, UnhandledFailure};
use crate::internal::{panic, SubscriberList};
use crate::subscription::SubscriptionId;

/// Callback registered with a [`FailureHub`].
pub type FailureHandler = Arc<dyn Fn(&mut UnhandledFailure) + Send + Sync>;

static GLOBAL_HUB: Lazy<Arc<FailureHub>> = Lazy::new(|| Arc::new(FailureHub::new()));

/// Best-effort fan-out of unhandled failures.
///
/// Subscribers run in registration order. Delivery stops as soon as one of
/// them marks the report handled, and a subscriber that panics is ignored so
/// reporting never cascades.
///
/// # Examples
///
/// ```
/// use ferrous_lifecycle::{Failure, FailureHub};
/// use std::sync::{Arc, Mutex};
///
/// let hub = FailureHub::new();
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// let sink = seen.clone();
/// hub.subscribe(move |report| {
///     sink.lock().unwrap().push(report.failure().to_string());
///     report.mark_handled();
/// });
///
/// assert!(hub.report(Failure::new("socket closed")));
/// assert_eq!(*seen.lock().unwrap(), vec!["socket closed"]);
/// ```
pub struct FailureHub {
    subscribers: SubscriberList<FailureHandler>,
}

impl FailureHub {
    /// Creates an empty, independent hub.
    pub fn new() -> Self {
        Self {
            subscribers: SubscriberList::new(),
        }
    }

    /// The process-wide hub.
    pub fn global() -> Arc<FailureHub> {
        Arc::clone(&GLOBAL_HUB)
    }

    /// Registers a subscriber.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&mut UnhandledFailure) + Send + Sync + 'static,
    {
        self.subscribers.push(Arc::new(handler))
    }

    /// Registers a subscriber that writes every report to stderr and leaves it
    /// unhandled.
    pub fn subscribe_logger(&self, prefix: impl Into<String>) -> SubscriptionId {
        let prefix = prefix.into();
        self.subscribe(move |report| {
            let failure = report.failure();
            match failure.calling_callback() {
                Some(callback) => eprintln!("{} UNHANDLED FAILURE in {}: {}", prefix, callback, failure),
                None => eprintln!("{} UNHANDLED FAILURE: {}", prefix, failure),
            }
        })
    }

    /// Removes a subscriber. Returns false if `id` was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }

    /// Cheap check used to skip building a report nobody would receive.
    pub fn has_subscribers(&self) -> bool {
        !self.subscribers.is_empty()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Removes every subscriber.
    pub fn clear(&self) {
        self.subscribers.clear();
    }

    /// Delivers `failure` to the subscribers.
    ///
    /// Does nothing when `failure` is `None` or nobody is subscribed. Returns
    /// true if a subscriber marked the report handled.
    pub fn report(&self, failure: impl Into<Option<Failure>>) -> bool {
        let Some(failure) = failure.into() else {
            return false;
        };

        let subscribers = self.subscribers.snapshot();
        if subscribers.is_empty() {
            return false;
        }

        let mut report = UnhandledFailure::new(Arc::new(failure));
        for entry in subscribers.iter() {
            // Subscriber panics are dropped.
            let _ = panic::catch(|| (entry.value)(&mut report));
            if report.is_handled() {
                break;
            }
        }
        report.is_handled()
    }

    /// Wraps `error` in a [`Failure`] and reports it.
    pub fn report_error(&self, error: impl Into<BoxError>) -> bool {
        self.report(Failure::new(error))
    }
}

impl Default for FailureHub {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FailureHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailureHub")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
