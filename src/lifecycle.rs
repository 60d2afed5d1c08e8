//! Thread-safe, idempotent disposal lifecycle.
//!
//! [`DisposalLifecycle`] is embedded by an owner object to guard its public
//! API and to run its teardown logic at most once, no matter how many
//! threads race to dispose it.

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;

use crate::error::{BoxError, LifecycleError, LifecycleResult};
use crate::internal::panic;
use crate::observer::{LifecycleObserver, Observers};

const NOT_DISPOSED: u8 = 0;
const DISPOSED: u8 = 1;

const DEFAULT_NAME: &str = "object";

/// Tracks whether an owner has been disposed of.
///
/// The first call to [`dispose_with`](Self::dispose_with) wins a
/// compare-and-swap and runs the teardown hook; every other call, concurrent
/// or later, returns immediately without waiting for the hook to finish.
/// Teardown failures (returned errors and panics) are swallowed: disposal
/// never fails from the caller's point of view.
///
/// # Examples
///
/// ```
/// use ferrous_lifecycle::{DisposalLifecycle, LifecycleResult};
///
/// struct Connection {
///     lifecycle: DisposalLifecycle,
/// }
///
/// impl Connection {
///     fn send(&self, _bytes: &[u8]) -> LifecycleResult<()> {
///         self.lifecycle.check_not_disposed()?;
///         Ok(())
///     }
///
///     fn close(&self) {
///         self.lifecycle.dispose_with(|| {
///             // flush buffers, release handles...
///             Ok(())
///         });
///     }
/// }
///
/// let conn = Connection { lifecycle: DisposalLifecycle::with_name("Connection") };
/// assert!(conn.send(b"ping").is_ok());
/// conn.close();
/// conn.close(); // no-op
/// assert!(conn.send(b"ping").is_err());
/// ```
pub struct DisposalLifecycle {
    state: AtomicU8,
    name: Cow<'static, str>,
    observers: Observers,
}

impl DisposalLifecycle {
    /// Creates a lifecycle in the not-disposed state.
    pub fn new() -> Self {
        Self::with_name(DEFAULT_NAME)
    }

    /// Creates a lifecycle whose owner is reported as `name` in errors and
    /// diagnostics.
    pub fn with_name(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            state: AtomicU8::new(NOT_DISPOSED),
            name: name.into(),
            observers: Observers::new(),
        }
    }

    /// Attaches a diagnostic observer.
    pub fn with_observer(mut self, observer: Arc<dyn LifecycleObserver>) -> Self {
        self.observers.add(observer);
        self
    }

    /// The owner name used in errors and diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true once disposal has started.
    ///
    /// Lock-free; the flag flips before the teardown hook runs, so an owner
    /// observed as disposed may still be tearing down on another thread.
    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.state.load(Ordering::Acquire) == DISPOSED
    }

    /// Fails with [`LifecycleError::ObjectDisposed`] if the owner has been
    /// disposed of.
    ///
    /// Call at the top of every public operation that must not run after
    /// disposal.
    #[inline]
    pub fn check_not_disposed(&self) -> LifecycleResult<()> {
        if self.is_disposed() {
            Err(LifecycleError::ObjectDisposed(self.name.to_string()))
        } else {
            Ok(())
        }
    }

    /// Marks the owner as disposed without a teardown hook.
    ///
    /// Returns true if this call performed the transition.
    pub fn dispose(&self) -> bool {
        self.dispose_with(|| Ok(()))
    }

    /// Disposes of the owner, running `teardown` if and only if this call wins
    /// the not-disposed to disposed transition.
    ///
    /// Returns true if this call ran the hook. Errors returned by the hook and
    /// panics raised inside it are reported to observers and then discarded.
    pub fn dispose_with<F>(&self, teardown: F) -> bool
    where
        F: FnOnce() -> Result<(), BoxError>,
    {
        if !self.try_begin() {
            return false;
        }

        let started = Instant::now();
        self.observers.disposing(&self.name);

        match panic::catch(teardown) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => self.observers.teardown_failed(&self.name, &err.to_string()),
            Err(message) => self.observers.teardown_failed(&self.name, &message),
        }

        self.observers.disposed(&self.name, started.elapsed());
        true
    }

    /// Async variant of [`dispose_with`](Self::dispose_with).
    ///
    /// The transition is decided before the future is created, so losing
    /// callers never construct or await a teardown future. Panics raised while
    /// the teardown future is polled are swallowed like returned errors.
    pub async fn dispose_with_async<F, Fut>(&self, teardown: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), BoxError>>,
    {
        if !self.try_begin() {
            return false;
        }

        let started = Instant::now();
        self.observers.disposing(&self.name);

        let outcome = match panic::catch(teardown) {
            Ok(future) => AssertUnwindSafe(future)
                .catch_unwind()
                .await
                .map_err(|payload| panic::panic_message(payload.as_ref())),
            Err(message) => Err(message),
        };
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(err)) => self.observers.teardown_failed(&self.name, &err.to_string()),
            Err(message) => self.observers.teardown_failed(&self.name, &message),
        }

        self.observers.disposed(&self.name, started.elapsed());
        true
    }

    fn try_begin(&self) -> bool {
        self.state
            .compare_exchange(NOT_DISPOSED, DISPOSED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl Default for DisposalLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DisposalLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisposalLifecycle")
            .field("name", &self.name)
            .field("disposed", &self.is_disposed())
            .field("observers", &self.observers.has_observers())
            .finish()
    }
}
