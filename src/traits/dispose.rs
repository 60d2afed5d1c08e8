//! Disposal traits for owner objects.

use crate::error::{BoxError, LifecycleResult};
use crate::lifecycle::DisposalLifecycle;

/// Trait for owners with synchronous teardown.
///
/// Implementors embed a [`DisposalLifecycle`] and override
/// [`teardown`](Disposable::teardown); the provided methods guarantee the
/// teardown runs at most once and never propagates a failure.
///
/// # Examples
///
/// ```
/// use ferrous_lifecycle::{BoxError, Disposable, DisposalLifecycle, LifecycleResult};
/// use std::sync::Mutex;
///
/// struct Cache {
///     lifecycle: DisposalLifecycle,
///     entries: Mutex<Vec<String>>,
/// }
///
/// impl Cache {
///     fn insert(&self, value: &str) -> LifecycleResult<()> {
///         self.check_not_disposed()?;
///         self.entries.lock().unwrap().push(value.to_string());
///         Ok(())
///     }
/// }
///
/// impl Disposable for Cache {
///     fn lifecycle(&self) -> &DisposalLifecycle {
///         &self.lifecycle
///     }
///
///     fn teardown(&self) -> Result<(), BoxError> {
///         self.entries.lock().unwrap().clear();
///         Ok(())
///     }
/// }
///
/// let cache = Cache {
///     lifecycle: DisposalLifecycle::with_name("Cache"),
///     entries: Mutex::new(Vec::new()),
/// };
/// cache.insert("a").unwrap();
/// assert!(cache.dispose());
/// assert!(!cache.dispose());
/// assert!(cache.insert("b").is_err());
/// ```
pub trait Disposable: Send + Sync {
    /// The lifecycle tracking this owner's disposed state.
    fn lifecycle(&self) -> &DisposalLifecycle;

    /// Releases the owner's resources.
    ///
    /// Runs at most once, on the thread that wins [`dispose`](Disposable::dispose).
    /// Errors and panics are swallowed by the caller.
    fn teardown(&self) -> Result<(), BoxError> {
        Ok(())
    }

    /// Disposes of the owner. Returns true if this call ran the teardown.
    fn dispose(&self) -> bool {
        self.lifecycle().dispose_with(|| self.teardown())
    }

    /// Returns true once disposal has started.
    fn is_disposed(&self) -> bool {
        self.lifecycle().is_disposed()
    }

    /// Fails if the owner has been disposed of.
    fn check_not_disposed(&self) -> LifecycleResult<()> {
        self.lifecycle().check_not_disposed()
    }
}

/// Trait for owners whose teardown is asynchronous.
///
/// # Examples
///
/// ```
/// use ferrous_lifecycle::{AsyncDisposable, BoxError, DisposalLifecycle};
/// use async_trait::async_trait;
///
/// struct Client {
///     lifecycle: DisposalLifecycle,
/// }
///
/// #[async_trait]
/// impl AsyncDisposable for Client {
///     fn lifecycle(&self) -> &DisposalLifecycle {
///         &self.lifecycle
///     }
///
///     async fn teardown(&self) -> Result<(), BoxError> {
///         // close the connection gracefully...
///         Ok(())
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait AsyncDisposable: Send + Sync {
    /// The lifecycle tracking this owner's disposed state.
    fn lifecycle(&self) -> &DisposalLifecycle;

    /// Releases the owner's resources asynchronously.
    async fn teardown(&self) -> Result<(), BoxError>;

    /// Disposes of the owner. Returns true if this call ran the teardown.
    async fn dispose(&self) -> bool {
        self.lifecycle()
            .dispose_with_async(|| self.teardown())
            .await
    }
}
