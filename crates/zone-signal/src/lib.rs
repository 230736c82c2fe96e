//! Zone Signal
//!
//! A minimal multicast notifier: one event, many callbacks.
//!
//! # Delivery Contract
//!
//! - Callbacks run synchronously on the firing thread, in subscription order.
//! - A callback that panics is logged and skipped; the rest still run.
//! - A callback unsubscribed while a fire is in flight is not invoked afterwards.
//! - Callbacks subscribed while a fire is in flight first run on the next fire.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//!
//! use zone_signal::Signal;
//!
//! let entered = Signal::new();
//! let count = Arc::new(AtomicU32::new(0));
//!
//! let c = Arc::clone(&count);
//! let subscription = entered.subscribe(move || {
//!     c.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! assert_eq!(entered.fire(), 1);
//! subscription.unsubscribe();
//! assert_eq!(entered.fire(), 0);
//! assert_eq!(count.load(Ordering::SeqCst), 1);
//! ```

#![allow(clippy::redundant_pub_crate)]

mod signal;
mod subscription;

pub use signal::{Callback, Signal};
pub use subscription::{Subscription, SubscriptionId};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Signal, Subscription, SubscriptionId};
}
