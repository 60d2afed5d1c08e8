//! Diagnostic observers for disposal and broadcast events.
//!
//! Observers are the crate's logging seam: nothing is printed unless an
//! observer is attached, and the built-in [`LoggingObserver`] writes to
//! stdout/stderr. Failures swallowed by an isolation boundary are visible
//! here even when no [`FailureHub`](crate::FailureHub) subscriber exists.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Observer trait for lifecycle and broadcast events.
///
/// Every method has an empty default implementation so observers only
/// implement the events they care about.
///
/// # Performance
///
/// Observer calls are made synchronously on the thread that disposes or
/// broadcasts. Keep implementations lightweight.
///
/// # Examples
///
/// ```
/// use ferrous_lifecycle::{DisposalLifecycle, LifecycleObserver};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// struct TraceObserver;
///
/// impl LifecycleObserver for TraceObserver {
///     fn disposed(&self, name: &str, duration: Duration) {
///         println!("{} disposed in {:?}", name, duration);
///     }
/// }
///
/// let lifecycle = DisposalLifecycle::with_name("Cache").with_observer(Arc::new(TraceObserver));
/// lifecycle.dispose();
/// ```
pub trait LifecycleObserver: Send + Sync {
    /// Called by the winning `dispose` caller before the teardown hook runs.
    fn disposing(&self, _name: &str) {}

    /// Called after the teardown hook has completed, successfully or not.
    fn disposed(&self, _name: &str, _duration: Duration) {}

    /// Called when a teardown hook returned an error or panicked.
    ///
    /// The failure is swallowed after this call.
    fn teardown_failed(&self, _name: &str, _message: &str) {}

    /// Called when a broadcast subscriber returned an error or panicked.
    ///
    /// # Arguments
    ///
    /// * `event` - The event name passed to the broadcast
    /// * `callback` - The failing subscriber's description
    /// * `message` - The error or panic message
    fn callback_failed(&self, _event: &str, _callback: &str, _message: &str) {}

    /// Called once a broadcast has attempted every subscriber.
    fn broadcast_completed(&self, _event: &str, _attempted: usize, _failed: usize) {}
}

/// Container for registered observers.
///
/// Designed to have no overhead beyond an emptiness check when no observers
/// are registered.
#[derive(Default, Clone)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn LifecycleObserver>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    pub(crate) fn add(&mut self, observer: Arc<dyn LifecycleObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    #[inline]
    pub(crate) fn disposing(&self, name: &str) {
        for observer in &self.observers {
            observer.disposing(name);
        }
    }

    #[inline]
    pub(crate) fn disposed(&self, name: &str, duration: Duration) {
        for observer in &self.observers {
            observer.disposed(name, duration);
        }
    }

    #[inline]
    pub(crate) fn teardown_failed(&self, name: &str, message: &str) {
        for observer in &self.observers {
            observer.teardown_failed(name, message);
        }
    }

    #[inline]
    pub(crate) fn callback_failed(&self, event: &str, callback: &str, message: &str) {
        for observer in &self.observers {
            observer.callback_failed(event, callback, message);
        }
    }

    #[inline]
    pub(crate) fn broadcast_completed(&self, event: &str, attempted: usize, failed: usize) {
        for observer in &self.observers {
            observer.broadcast_completed(event, attempted, failed);
        }
    }
}

/// Built-in observer that logs events to stdout and failures to stderr.
///
/// # Examples
///
/// ```
/// use ferrous_lifecycle::{DisposalLifecycle, LoggingObserver};
/// use std::sync::Arc;
///
/// let lifecycle = DisposalLifecycle::with_name("Pool")
///     .with_observer(Arc::new(LoggingObserver::with_prefix("[pool]")));
///
/// // Prints "[pool] Disposing: Pool" and "[pool] Disposed: Pool in ..."
/// lifecycle.dispose();
/// ```
pub struct LoggingObserver {
    prefix: String,
}

impl LoggingObserver {
    /// Creates a new logging observer with the default prefix.
    pub fn new() -> Self {
        Self {
            prefix: "[ferrous-lifecycle]".to_string(),
        }
    }

    /// Creates a new logging observer with a custom prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The prefix written before every line.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleObserver for LoggingObserver {
    fn disposing(&self, name: &str) {
        println!("{} Disposing: {}", self.prefix, name);
    }

    fn disposed(&self, name: &str, duration: Duration) {
        println!("{} Disposed: {} in {:?}", self.prefix, name, duration);
    }

    fn teardown_failed(&self, name: &str, message: &str) {
        eprintln!("{} TEARDOWN FAILED in {}: {}", self.prefix, name, message);
    }

    fn callback_failed(&self, event: &str, callback: &str, message: &str) {
        eprintln!(
            "{} CALLBACK FAILED [{}] {}: {}",
            self.prefix, event, callback, message
        );
    }

    fn broadcast_completed(&self, event: &str, attempted: usize, failed: usize) {
        println!(
            "{} Raised: {} ({} attempted, {} failed)",
            self.prefix, event, attempted, failed
        );
    }
}

/// Observer that counts lifecycle and broadcast events.
pub struct MetricsObserver {
    pub disposals: AtomicU64,
    pub teardown_failures: AtomicU64,
    pub broadcasts: AtomicU64,
    pub callbacks_attempted: AtomicU64,
    pub callback_failures: AtomicU64,
}

impl MetricsObserver {
    /// Creates a new metrics observer with all counters at zero.
    pub fn new() -> Self {
        Self {
            disposals: AtomicU64::new(0),
            teardown_failures: AtomicU64::new(0),
            broadcasts: AtomicU64::new(0),
            callbacks_attempted: AtomicU64::new(0),
            callback_failures: AtomicU64::new(0),
        }
    }

    /// Number of completed disposals observed.
    pub fn disposal_count(&self) -> u64 {
        self.disposals.load(Ordering::Relaxed)
    }

    /// Number of teardown hooks that failed.
    pub fn teardown_failure_count(&self) -> u64 {
        self.teardown_failures.load(Ordering::Relaxed)
    }

    /// Number of broadcasts that reached at least one subscriber.
    pub fn broadcast_count(&self) -> u64 {
        self.broadcasts.load(Ordering::Relaxed)
    }

    /// Number of subscriber invocations attempted.
    pub fn callbacks_attempted_count(&self) -> u64 {
        self.callbacks_attempted.load(Ordering::Relaxed)
    }

    /// Number of subscriber invocations that failed.
    pub fn callback_failure_count(&self) -> u64 {
        self.callback_failures.load(Ordering::Relaxed)
    }

    /// Resets all counters.
    pub fn reset(&self) {
        self.disposals.store(0, Ordering::Relaxed);
        self.teardown_failures.store(0, Ordering::Relaxed);
        self.broadcasts.store(0, Ordering::Relaxed);
        self.callbacks_attempted.store(0, Ordering::Relaxed);
        self.callback_failures.store(0, Ordering::Relaxed);
    }
}

impl Default for MetricsObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleObserver for MetricsObserver {
    fn disposed(&self, _name: &str, _duration: Duration) {
        self.disposals.fetch_add(1, Ordering::Relaxed);
    }

    fn teardown_failed(&self, _name: &str, _message: &str) {
        self.teardown_failures.fetch_add(1, Ordering::Relaxed);
    }

    fn callback_failed(&self, _event: &str, _callback: &str, _message: &str) {
        self.callback_failures.fetch_add(1, Ordering::Relaxed);
    }

    fn broadcast_completed(&self, _event: &str, attempted: usize, _failed: usize) {
        self.broadcasts.fetch_add(1, Ordering::Relaxed);
        self.callbacks_attempted
            .fetch_add(attempted as u64, Ordering::Relaxed);
    }
}
