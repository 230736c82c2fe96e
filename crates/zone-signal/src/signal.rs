//! Multicast signal.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::subscription::{Subscription, SubscriptionId};

/// Callback invoked when a signal fires.
pub type Callback = Arc<dyn Fn() + Send + Sync>;

/// A registered callback.
pub(crate) struct Subscriber {
    id: SubscriptionId,
    /// Cleared on removal so a fire already in flight skips this callback.
    active: AtomicBool,
    callback: Callback,
}

/// Inner signal state (behind Arc<Mutex>).
#[derive(Default)]
pub(crate) struct SignalInner {
    /// Subscribers in subscription order
    subscribers: Vec<Arc<Subscriber>>,
    /// Next subscription ID
    next_id: u64,
}

impl SignalInner {
    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let Some(index) = self.subscribers.iter().position(|s| s.id == id) else {
            return false;
        };
        let subscriber = self.subscribers.remove(index);
        subscriber.active.store(false, Ordering::Release);
        true
    }

    pub(crate) fn contains(&self, id: SubscriptionId) -> bool {
        self.subscribers.iter().any(|s| s.id == id)
    }
}

/// Signal handle - cloneable wrapper around a shared subscriber list.
///
/// Clones refer to the same subscribers, so a clone taken before a
/// [`Signal::unsubscribe_all`] fires nothing afterwards.
#[derive(Clone, Default)]
pub struct Signal {
    inner: Arc<Mutex<SignalInner>>,
}

impl Signal {
    /// Create a signal with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback. Never fails.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock();
        let id = SubscriptionId::new(inner.next_id);
        inner.next_id += 1;
        inner.subscribers.push(Arc::new(Subscriber {
            id,
            active: AtomicBool::new(true),
            callback: Arc::new(callback),
        }));
        drop(inner);

        Subscription::new(id, Arc::downgrade(&self.inner))
    }

    /// Remove exactly one subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.lock().remove(id)
    }

    /// Remove every subscription.
    pub fn unsubscribe_all(&self) {
        let drained = core::mem::take(&mut self.inner.lock().subscribers);
        for subscriber in drained {
            subscriber.active.store(false, Ordering::Release);
        }
    }

    /// Invoke every subscribed callback in subscription order.
    ///
    /// The subscriber list is snapshotted before the first call, so callbacks are
    /// free to subscribe or unsubscribe on this signal. Returns the number of
    /// callbacks invoked, including ones that panicked.
    pub fn fire(&self) -> usize {
        let snapshot = self.inner.lock().subscribers.clone();

        let mut invoked = 0;
        for subscriber in snapshot {
            if !subscriber.active.load(Ordering::Acquire) {
                continue;
            }
            invoked += 1;

            let callback = &subscriber.callback;
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| callback())) {
                tracing::error!(
                    subscription = subscriber.id.raw(),
                    "signal callback panicked: {}",
                    panic_message(payload.as_ref())
                );
            }
        }
        invoked
    }

    /// Number of subscribed callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().subscribers.len()
    }

    /// Whether no callbacks are subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().subscribers.is_empty()
    }
}

impl core::fmt::Debug for Signal {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Signal")
            .field("subscribers", &self.len())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "<non-string panic payload>"
    }
}
