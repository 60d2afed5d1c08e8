//! # ferrous-lifecycle
//!
//! Thread-safe disposal, failure-isolated callback broadcast and a central
//! hub for unhandled failures.
//!
//! ## Features
//!
//! - **Exactly-once disposal**: any number of threads may dispose an owner;
//!   one of them runs the teardown, the rest return immediately
//! - **Post-disposal guards**: `check_not_disposed()` at the top of every
//!   public operation
//! - **Isolated broadcast**: one failing or panicking subscriber never stops
//!   the others
//! - **Failure hub**: failures with nowhere else to go are delivered to
//!   interested parties, with short-circuit on `handled`
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_lifecycle::{ArgsUsage, Disposable, DisposalLifecycle, EventSlot, LifecycleResult};
//!
//! struct Closed {
//!     reason: &'static str,
//! }
//!
//! struct Channel {
//!     lifecycle: DisposalLifecycle,
//!     closed: EventSlot<Channel, Closed>,
//! }
//!
//! impl Channel {
//!     fn send(&self, _msg: &str) -> LifecycleResult<()> {
//!         self.check_not_disposed()?;
//!         Ok(())
//!     }
//! }
//!
//! impl Disposable for Channel {
//!     fn lifecycle(&self) -> &DisposalLifecycle {
//!         &self.lifecycle
//!     }
//!
//!     fn teardown(&self) -> Result<(), ferrous_lifecycle::BoxError> {
//!         self.closed.raise("Closed", self, || Closed { reason: "disposed" }, ArgsUsage::Reuse)?;
//!         Ok(())
//!     }
//! }
//!
//! let channel = Channel {
//!     lifecycle: DisposalLifecycle::with_name("Channel"),
//!     closed: EventSlot::new(),
//! };
//! channel.closed.subscribe(|_, args| {
//!     println!("closed: {}", args.reason);
//!     Ok(())
//! });
//!
//! channel.send("hello").unwrap();
//! channel.dispose();
//! assert!(channel.send("again").is_err());
//! ```
//!
//! ## Observing swallowed failures
//!
//! ```rust
//! use ferrous_lifecycle::{EventSlot, FailureHub, SafeBroadcaster};
//! use std::sync::Arc;
//!
//! let hub = Arc::new(FailureHub::new());
//! hub.subscribe(|report| {
//!     eprintln!("{:?} failed: {}", report.failure().calling_callback(), report.failure());
//!     report.mark_handled();
//! });
//!
//! let slot: EventSlot<(), ()> = EventSlot::new();
//! slot.subscribe(|_, _| Err("listener failed".into()));
//!
//! let raised = SafeBroadcaster::new(hub).broadcast_empty(Some(&slot), "Tick", &()).unwrap();
//! assert!(raised);
//! ```

pub mod broadcast;
pub mod config;
pub mod description;
pub mod error;
pub mod failure;
pub mod hub;
pub mod lifecycle;
pub mod observer;
pub mod subscription;
pub mod traits;

mod internal;

pub use broadcast::{ArgsUsage, EventSlot, SafeBroadcaster, Subscriber};
pub use config::LifecycleConfig;
pub use description::{describe, CallbackInfo};
pub use error::{BoxError, CallbackResult, LifecycleError, LifecycleResult};
pub use failure::{Failure, FailureCause, UnhandledFailure};
pub use hub::{FailureHandler, FailureHub};
pub use lifecycle::DisposalLifecycle;
pub use observer::{LifecycleObserver, LoggingObserver, MetricsObserver};
pub use subscription::SubscriptionId;
pub use traits::{AsyncDisposable, Disposable};
