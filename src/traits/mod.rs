//! Core traits for owner objects.

mod dispose;

pub use dispose::{AsyncDisposable, Disposable};
