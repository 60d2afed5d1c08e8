//! Failure values carried from isolation boundaries to the failure hub.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::error::BoxError;

/// Metadata key holding the description of the callback that failed.
pub const CALLING_CALLBACK: &str = "calling_callback";

/// Metadata key holding the name of the event being raised.
pub const EVENT: &str = "event";

/// What went wrong inside an isolated callback.
#[derive(Debug)]
pub enum FailureCause {
    /// The callback returned an error
    Error(BoxError),
    /// The callback panicked; holds the panic message
    Panic(String),
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCause::Error(err) => write!(f, "{}", err),
            FailureCause::Panic(message) => write!(f, "panicked: {}", message),
        }
    }
}

/// An error plus contextual metadata describing where it was caught.
///
/// # Examples
///
/// ```
/// use ferrous_lifecycle::{failure, Failure};
///
/// let failure = Failure::new("disk full")
///     .with_data(failure::EVENT, "Saved");
///
/// assert_eq!(failure.to_string(), "disk full");
/// assert_eq!(failure.data(failure::EVENT), Some("Saved"));
/// assert!(failure.calling_callback().is_none());
/// ```
#[derive(Debug)]
pub struct Failure {
    cause: FailureCause,
    data: BTreeMap<String, String>,
}

impl Failure {
    /// Wraps an error.
    pub fn new(error: impl Into<BoxError>) -> Self {
        Self {
            cause: FailureCause::Error(error.into()),
            data: BTreeMap::new(),
        }
    }

    /// Wraps a captured panic message.
    pub fn from_panic(message: impl Into<String>) -> Self {
        Self {
            cause: FailureCause::Panic(message.into()),
            data: BTreeMap::new(),
        }
    }

    /// Adds (or replaces) a metadata entry.
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn cause(&self) -> &FailureCause {
        &self.cause
    }

    /// The wrapped error, if the failure was not a panic.
    pub fn error(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        match &self.cause {
            FailureCause::Error(err) => Some(err.as_ref()),
            FailureCause::Panic(_) => None,
        }
    }

    pub fn is_panic(&self) -> bool {
        matches!(self.cause, FailureCause::Panic(_))
    }

    /// Looks up a metadata entry.
    pub fn data(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    /// All metadata entries, ordered by key.
    pub fn metadata(&self) -> impl Iterator<Item = (&str, &str)> {
        self.data.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Description of the callback that produced this failure, when it was
    /// caught by a broadcast.
    pub fn calling_callback(&self) -> Option<&str> {
        self.data(CALLING_CALLBACK)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cause)
    }
}

impl Error for Failure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            FailureCause::Error(err) => Some(err.as_ref()),
            FailureCause::Panic(_) => None,
        }
    }
}

/// Report handed to each [`FailureHub`](crate::FailureHub) subscriber.
///
/// Setting [`handled`](Self::set_handled) stops delivery to the remaining
/// subscribers.
#[derive(Debug)]
pub struct UnhandledFailure {
    failure: Arc<Failure>,
    handled: bool,
}

impl UnhandledFailure {
    pub(crate) fn new(failure: Arc<Failure>) -> Self {
        Self {
            failure,
            handled: false,
        }
    }

    /// The failure being reported.
    pub fn failure(&self) -> &Arc<Failure> {
        &self.failure
    }

    pub fn is_handled(&self) -> bool {
        self.handled
    }

    pub fn set_handled(&mut self, handled: bool) {
        self.handled = handled;
    }

    /// Shorthand for `set_handled(true)`.
    pub fn mark_handled(&mut self) {
        self.handled = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_failure() {
        let failure = Failure::new("connection reset").with_data(CALLING_CALLBACK, "[app].on_change");

        assert!(!failure.is_panic());
        assert_eq!(failure.to_string(), "connection reset");
        assert_eq!(failure.calling_callback(), Some("[app].on_change"));
        assert!(failure.error().is_some());
        assert!(failure.source().is_some());
    }

    #[test]
    fn test_panic_failure() {
        let failure = Failure::from_panic("index out of bounds");

        assert!(failure.is_panic());
        assert!(failure.error().is_none());
        assert_eq!(failure.to_string(), "panicked: index out of bounds");
    }

    #[test]
    fn test_metadata_is_ordered_by_key() {
        let failure = Failure::new("x")
            .with_data(EVENT, "Changed")
            .with_data(CALLING_CALLBACK, "[a].b");

        let keys: Vec<_> = failure.metadata().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![CALLING_CALLBACK, EVENT]);
    }

    #[test]
    fn test_handled_flag() {
        let mut report = UnhandledFailure::new(Arc::new(Failure::new("x")));
        assert!(!report.is_handled());

        report.mark_handled();
        assert!(report.is_handled());

        report.set_handled(false);
        assert!(!report.is_handled());
    }
}
