//! Lock primitives, backed by `parking_lot` when the feature is enabled.

#[cfg(feature = "parking-lot")]
pub(crate) use parking_lot::RwLock;

#[cfg(not(feature = "parking-lot"))]
pub(crate) use self::std_lock::RwLock;

#[cfg(not(feature = "parking-lot"))]
mod std_lock {
    use std::sync::{RwLockReadGuard, RwLockWriteGuard};

    /// `std::sync::RwLock` with the `parking_lot` calling convention.
    ///
    /// Poisoning is ignored: every critical section in this crate swaps a whole
    /// `Arc`, so the protected value is never observed half-written.
    #[derive(Debug, Default)]
    pub(crate) struct RwLock<T>(std::sync::RwLock<T>);

    impl<T> RwLock<T> {
        pub(crate) const fn new(value: T) -> Self {
            Self(std::sync::RwLock::new(value))
        }

        pub(crate) fn read(&self) -> RwLockReadGuard<'_, T> {
            self.0.read().unwrap_or_else(|poisoned| poisoned.into_inner())
        }

        pub(crate) fn write(&self) -> RwLockWriteGuard<'_, T> {
            self.0.write().unwrap_or_else(|poisoned| poisoned.into_inner())
        }
    }
}
