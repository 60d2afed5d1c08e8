//! Human-readable callback descriptions for diagnostics.

use std::any::type_name;
use std::borrow::Cow;
use std::fmt;

/// Description returned for an absent callback.
pub const NULL_DESCRIPTION: &str = "[null]";

/// Placeholder used when a callback has no declaring scope.
pub const NO_SCOPE: &str = "no type";

/// Identifies a subscriber: where it was declared and what it looks like.
///
/// Formats as `"[<scope>].<signature>"`, or `"[no type].<signature>"` when
/// the scope is unknown.
///
/// # Examples
///
/// ```
/// use ferrous_lifecycle::CallbackInfo;
///
/// let info = CallbackInfo::new("app::Window", "on_resize(&Window, &Size)");
/// assert_eq!(info.to_string(), "[app::Window].on_resize(&Window, &Size)");
///
/// let info = CallbackInfo::unscoped("anonymous");
/// assert_eq!(info.to_string(), "[no type].anonymous");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallbackInfo {
    scope: Option<Cow<'static, str>>,
    signature: Cow<'static, str>,
}

impl CallbackInfo {
    /// Describes a callback declared in `scope`.
    pub fn new(scope: impl Into<Cow<'static, str>>, signature: impl Into<Cow<'static, str>>) -> Self {
        Self {
            scope: Some(scope.into()),
            signature: signature.into(),
        }
    }

    /// Describes a callback with no known declaring scope.
    pub fn unscoped(signature: impl Into<Cow<'static, str>>) -> Self {
        Self {
            scope: None,
            signature: signature.into(),
        }
    }

    /// Derives a description from the callback's type path.
    ///
    /// For a function item `app::handlers::on_saved` taking `(&S, &A)` this
    /// yields scope `app::handlers` and signature `on_saved(&S, &A)`. Closures
    /// are reported as `{{closure}}` inside the function that created them.
    pub fn of<F, S: ?Sized, A: ?Sized>(_callback: &F) -> Self {
        let (scope, member) = split_path(type_name::<F>());
        let signature = format!("{}(&{}, &{})", member, type_name::<S>(), type_name::<A>());
        Self {
            scope: scope.map(|s| Cow::Owned(s.to_string())),
            signature: Cow::Owned(signature),
        }
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }
}

impl fmt::Display for CallbackInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "[{}].{}", scope, self.signature),
            None => write!(f, "[{}].{}", NO_SCOPE, self.signature),
        }
    }
}

/// Describes a possibly absent callback; `None` yields `"[null]"`.
pub fn describe(info: Option<&CallbackInfo>) -> String {
    match info {
        Some(info) => info.to_string(),
        None => NULL_DESCRIPTION.to_string(),
    }
}

/// Splits a type path at its last top-level `::`, ignoring separators nested
/// inside generic arguments, tuples and arrays.
fn split_path(path: &str) -> (Option<&str>, &str) {
    let bytes = path.as_bytes();
    let mut depth = 0usize;
    let mut split = None;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' | b'(' | b'[' => depth += 1,
            b'>' if i > 0 && bytes[i - 1] == b'-' => {}
            b'>' | b')' | b']' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                split = Some(i);
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }

    match split {
        Some(at) => (Some(&path[..at]), &path[at + 2..]),
        None => (None, path),
    }
}
