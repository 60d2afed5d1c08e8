//! Error types for lifecycle and broadcast operations.

use std::fmt;

/// Boxed error returned by subscriber callbacks and teardown hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result returned by subscriber callbacks.
///
/// An `Err` is isolated by the broadcaster and forwarded to the
/// [`FailureHub`](crate::FailureHub); it never reaches the caller of
/// [`SafeBroadcaster::broadcast`](crate::SafeBroadcaster::broadcast).
pub type CallbackResult = Result<(), BoxError>;

/// Lifecycle errors
///
/// Represents the conditions that are surfaced to callers. Failures that
/// happen inside isolation boundaries (subscriber callbacks, teardown hooks,
/// hub subscribers) are never returned as a `LifecycleError`.
///
/// # Examples
///
/// ```rust
/// use ferrous_lifecycle::{DisposalLifecycle, LifecycleError};
///
/// let lifecycle = DisposalLifecycle::with_name("Connection");
/// lifecycle.dispose();
///
/// match lifecycle.check_not_disposed() {
///     Err(LifecycleError::ObjectDisposed(name)) => assert_eq!(name, "Connection"),
///     _ => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use ferrous_lifecycle::LifecycleError;
///
/// let invalid = LifecycleError::InvalidArgument { name: "event_name", reason: "must not be empty" };
/// let out_of_range = LifecycleError::OutOfRange { name: "usage", value: 7 };
///
/// println!("Error: {}", invalid);
/// println!("Error: {}", out_of_range);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// Object cannot be accessed after it has been disposed of
    ObjectDisposed(String),
    /// Precondition violation on an argument
    InvalidArgument {
        name: &'static str,
        reason: &'static str,
    },
    /// Enumerated argument holds an unrecognised value
    OutOfRange { name: &'static str, value: i64 },
    /// Configuration value could not be parsed
    Config(String),
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleError::ObjectDisposed(name) => {
                write!(f, "Cannot access a disposed object: {}", name)
            }
            LifecycleError::InvalidArgument { name, reason } => {
                write!(f, "Invalid argument '{}': {}", name, reason)
            }
            LifecycleError::OutOfRange { name, value } => {
                write!(f, "Argument '{}' out of range: {}", name, value)
            }
            LifecycleError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for LifecycleError {}

/// Result type for lifecycle operations
///
/// A convenience alias for `Result<T, LifecycleError>`.
///
/// # Examples
///
/// ```rust
/// use ferrous_lifecycle::{LifecycleResult, LifecycleError};
///
/// fn open() -> LifecycleResult<()> {
///     Err(LifecycleError::ObjectDisposed("Channel".to_string()))
/// }
///
/// assert!(open().is_err());
/// ```
pub type LifecycleResult<T> = Result<T, LifecycleError>;
