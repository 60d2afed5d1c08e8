//! Failure-isolated multicast invocation.
//!
//! An [`EventSlot`] holds the subscribers of one event. A
//! [`SafeBroadcaster`] invokes each of them in registration order; a
//! subscriber that returns an error or panics is reported to the broadcaster's
//! [`FailureHub`] and the remaining subscribers still run.

use std::fmt;
use std::sync::Arc;

use crate::config::LifecycleConfig;
use crate::description::CallbackInfo;
use crate::error::{CallbackResult, LifecycleError, LifecycleResult};
use crate::failure::{Failure, CALLING_CALLBACK, EVENT};
use crate::hub::FailureHub;
use crate::internal::{panic, SubscriberList};
use crate::observer::{LifecycleObserver, LoggingObserver, Observers};
use crate::subscription::SubscriptionId;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

/// How the argument factory is used during a broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum ArgsUsage {
    /// Undefined; rejected by [`SafeBroadcaster::broadcast`]
    #[default]
    Unknown = 0,
    /// The factory is called once and the same argument goes to every subscriber
    Reuse = 1,
    /// The factory is called separately for each subscriber
    UniqueInstance = 2,
}

impl TryFrom<u8> for ArgsUsage {
    type Error = LifecycleError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ArgsUsage::Unknown),
            1 => Ok(ArgsUsage::Reuse),
            2 => Ok(ArgsUsage::UniqueInstance),
            other => Err(LifecycleError::OutOfRange {
                name: "usage",
                value: i64::from(other),
            }),
        }
    }
}

/// Subscriber callback: receives the sender and the event argument.
pub type Subscriber<S, A> = Arc<dyn Fn(&S, &A) -> CallbackResult + Send + Sync>;

struct Registration<S: ?Sized, A> {
    info: Arc<CallbackInfo>,
    callback: Subscriber<S, A>,
}

impl<S: ?Sized, A> Clone for Registration<S, A> {
    fn clone(&self) -> Self {
        Self {
            info: Arc::clone(&self.info),
            callback: Arc::clone(&self.callback),
        }
    }
}

/// Thread-safe list of subscribers for one event.
///
/// Subscribers may be added or removed at any time, including from inside a
/// subscriber while the slot is being raised; a broadcast always iterates the
/// subscribers that were registered when it started.
///
/// # Examples
///
/// ```
/// use ferrous_lifecycle::{ArgsUsage, EventSlot};
/// use std::sync::{Arc, Mutex};
///
/// struct Document;
/// struct Saved { path: String }
///
/// let saved: EventSlot<Document, Saved> = EventSlot::new();
/// let log = Arc::new(Mutex::new(Vec::new()));
///
/// let sink = log.clone();
/// saved.subscribe(move |_doc, args| {
///     sink.lock().unwrap().push(args.path.clone());
///     Ok(())
/// });
///
/// let raised = saved
///     .raise("Saved", &Document, || Saved { path: "/tmp/a.txt".into() }, ArgsUsage::Reuse)
///     .unwrap();
/// assert!(raised);
/// assert_eq!(*log.lock().unwrap(), vec!["/tmp/a.txt"]);
/// ```
pub struct EventSlot<S: ?Sized, A> {
    subscribers: SubscriberList<Registration<S, A>>,
}

impl<S: ?Sized, A> EventSlot<S, A> {
    /// Creates a slot with no subscribers.
    pub fn new() -> Self {
        Self {
            subscribers: SubscriberList::new(),
        }
    }

    /// Registers a subscriber, describing it from its type path.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&S, &A) -> CallbackResult + Send + Sync + 'static,
    {
        let info = CallbackInfo::of::<F, S, A>(&callback);
        self.subscribe_with_info(info, callback)
    }

    /// Registers a subscriber with an explicit description.
    pub fn subscribe_with_info<F>(&self, info: CallbackInfo, callback: F) -> SubscriptionId
    where
        F: Fn(&S, &A) -> CallbackResult + Send + Sync + 'static,
    {
        self.subscribers.push(Registration {
            info: Arc::new(info),
            callback: Arc::new(callback),
        })
    }

    /// Removes a subscriber. Returns false if `id` was not registered here.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Removes every subscriber.
    pub fn clear(&self) {
        self.subscribers.clear();
    }

    /// Descriptions of the current subscribers, in registration order.
    pub fn descriptions(&self) -> Vec<String> {
        self.subscribers
            .snapshot()
            .iter()
            .map(|entry| entry.value.info.to_string())
            .collect()
    }

    /// Raises the event through [`SafeBroadcaster::global`].
    ///
    /// See [`SafeBroadcaster::broadcast`] for the exact semantics.
    pub fn raise<G>(&self, event_name: &str, sender: &S, factory: G, usage: ArgsUsage) -> LifecycleResult<bool>
    where
        G: FnMut() -> A,
    {
        SafeBroadcaster::global().broadcast(Some(self), event_name, sender, factory, usage)
    }
}

impl<S: ?Sized> EventSlot<S, ()> {
    /// Raises an event that carries no argument.
    pub fn raise_empty(&self, event_name: &str, sender: &S) -> LifecycleResult<bool> {
        SafeBroadcaster::global().broadcast_empty(Some(self), event_name, sender)
    }
}

impl<S: ?Sized, A> Default for EventSlot<S, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ?Sized, A> fmt::Debug for EventSlot<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSlot")
            .field("subscribers", &self.descriptions())
            .finish()
    }
}

/// Invokes event subscribers with per-subscriber failure isolation.
///
/// # Examples
///
/// ```
/// use ferrous_lifecycle::{ArgsUsage, EventSlot, FailureHub, SafeBroadcaster};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// let hub = Arc::new(FailureHub::new());
/// let reported = Arc::new(AtomicUsize::new(0));
/// let counter = reported.clone();
/// hub.subscribe(move |_| { counter.fetch_add(1, Ordering::SeqCst); });
///
/// let broadcaster = SafeBroadcaster::new(hub);
/// let slot: EventSlot<(), u32> = EventSlot::new();
/// slot.subscribe(|_, _| Err("first subscriber failed".into()));
/// slot.subscribe(|_, value| { assert_eq!(*value, 7); Ok(()) });
///
/// let raised = broadcaster
///     .broadcast(Some(&slot), "Changed", &(), || 7, ArgsUsage::Reuse)
///     .unwrap();
///
/// assert!(raised);
/// assert_eq!(reported.load(Ordering::SeqCst), 1);
/// ```
#[derive(Clone)]
pub struct SafeBroadcaster {
    hub: Arc<FailureHub>,
    observers: Observers,
    catch_panics: bool,
}

impl SafeBroadcaster {
    /// Creates a broadcaster that reports to `hub`.
    pub fn new(hub: Arc<FailureHub>) -> Self {
        Self {
            hub,
            observers: Observers::new(),
            catch_panics: true,
        }
    }

    /// A broadcaster reporting to the process-wide hub.
    pub fn global() -> Self {
        Self::new(FailureHub::global())
    }

    /// Creates a broadcaster configured from `config`.
    pub fn from_config(config: &LifecycleConfig, hub: Arc<FailureHub>) -> Self {
        let mut broadcaster = Self::new(hub).catch_panics(config.catch_panics);
        if config.log_failures {
            broadcaster = broadcaster.with_observer(Arc::new(LoggingObserver::with_prefix(
                config.log_prefix.clone(),
            )));
        }
        broadcaster
    }

    /// Attaches a diagnostic observer.
    pub fn with_observer(mut self, observer: Arc<dyn LifecycleObserver>) -> Self {
        self.observers.add(observer);
        self
    }

    /// Whether subscriber panics are caught and reported (the default) or
    /// left to unwind through the caller.
    ///
    /// # Panics
    ///
    /// With catching disabled, a panicking subscriber unwinds out of
    /// [`broadcast`](Self::broadcast) and the subscribers after it are not
    /// called. Returned errors are still isolated.
    pub fn catch_panics(mut self, enabled: bool) -> Self {
        self.catch_panics = enabled;
        self
    }

    /// The hub receiving subscriber failures.
    pub fn hub(&self) -> &Arc<FailureHub> {
        &self.hub
    }

    /// Invokes every subscriber of `slot`.
    ///
    /// - Fails with [`LifecycleError::InvalidArgument`] if `event_name` is empty
    ///   or whitespace.
    /// - Returns `Ok(false)` without calling `factory` if the slot is absent or
    ///   has no subscribers.
    /// - Fails with [`LifecycleError::OutOfRange`] for [`ArgsUsage::Unknown`]
    ///   before any subscriber or factory call.
    /// - With [`ArgsUsage::Reuse`] the factory runs once, up front; with
    ///   [`ArgsUsage::UniqueInstance`] it runs immediately before each
    ///   subscriber, inside that subscriber's failure boundary.
    ///
    /// Returns `Ok(true)` once every subscriber has been attempted, whether or
    /// not any of them failed.
    pub fn broadcast<S, A, G>(
        &self,
        slot: Option<&EventSlot<S, A>>,
        event_name: &str,
        sender: &S,
        mut factory: G,
        usage: ArgsUsage,
    ) -> LifecycleResult<bool>
    where
        S: ?Sized,
        G: FnMut() -> A,
    {
        validate_event_name(event_name)?;

        let Some(slot) = slot else {
            return Ok(false);
        };
        let subscribers = slot.subscribers.snapshot();
        if subscribers.is_empty() {
            return Ok(false);
        }

        let shared = match usage {
            ArgsUsage::Reuse => Some(factory()),
            ArgsUsage::UniqueInstance => None,
            ArgsUsage::Unknown => {
                return Err(LifecycleError::OutOfRange {
                    name: "usage",
                    value: usage as i64,
                })
            }
        };

        let mut failed = 0;
        for entry in subscribers.iter() {
            let registration = &entry.value;
            let outcome = self.invoke(|| match &shared {
                Some(args) => (registration.callback)(sender, args),
                None => {
                    let args = factory();
                    (registration.callback)(sender, &args)
                }
            });

            if let Some(failure) = outcome {
                failed += 1;
                self.report(event_name, &registration.info, failure);
            }
        }

        self.observers
            .broadcast_completed(event_name, subscribers.len(), failed);
        Ok(true)
    }

    /// Invokes every subscriber of an argument-less event.
    pub fn broadcast_empty<S>(
        &self,
        slot: Option<&EventSlot<S, ()>>,
        event_name: &str,
        sender: &S,
    ) -> LifecycleResult<bool>
    where
        S: ?Sized,
    {
        self.broadcast(slot, event_name, sender, || (), ArgsUsage::Reuse)
    }

    fn invoke<F>(&self, call: F) -> Option<Failure>
    where
        F: FnOnce() -> CallbackResult,
    {
        let result = if self.catch_panics {
            panic::catch(call)
        } else {
            Ok(call())
        };

        match result {
            Ok(Ok(())) => None,
            Ok(Err(err)) => Some(Failure::new(err)),
            Err(message) => Some(Failure::from_panic(message)),
        }
    }

    fn report(&self, event_name: &str, info: &CallbackInfo, failure: Failure) {
        let description = info.to_string();
        if self.observers.has_observers() {
            self.observers
                .callback_failed(event_name, &description, &failure.to_string());
        }
        if self.hub.has_subscribers() {
            self.hub.report(
                failure
                    .with_data(CALLING_CALLBACK, description)
                    .with_data(EVENT, event_name),
            );
        }
    }
}

impl Default for SafeBroadcaster {
    fn default() -> Self {
        Self::global()
    }
}

impl fmt::Debug for SafeBroadcaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SafeBroadcaster")
            .field("hub", &self.hub)
            .field("catch_panics", &self.catch_panics)
            .field("observers", &self.observers.has_observers())
            .finish()
    }
}

fn validate_event_name(event_name: &str) -> LifecycleResult<()> {
    if event_name.trim().is_empty() {
        return Err(LifecycleError::InvalidArgument {
            name: "event_name",
            reason: "must not be empty or whitespace",
        });
    }
    Ok(())
}
