//! In-process tick source.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::{TickFn, TickHandle, TickId, TickSource};

struct TickSubscriber {
    handle: TickHandle,
    active: AtomicBool,
    callback: Mutex<TickFn>,
}

#[derive(Default)]
struct HeartbeatInner {
    subscribers: Vec<Arc<TickSubscriber>>,
    next_handle: u64,
    tick: TickId,
}

/// Heartbeat handle - cloneable wrapper around shared scheduler state.
///
/// Driven manually: each call to [`Heartbeat::tick`] is one tick.
#[derive(Clone, Default)]
pub struct Heartbeat {
    inner: Arc<Mutex<HeartbeatInner>>,
}

impl Heartbeat {
    /// Create a heartbeat at tick 0 with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one tick and return its id.
    ///
    /// Subscribers cancelled by an earlier callback in the same tick are skipped.
    /// Calling `tick` from inside a tick callback skips that callback's own
    /// subscription for the nested tick.
    pub fn tick(&self) -> TickId {
        let (tick, snapshot) = {
            let mut inner = self.inner.lock();
            inner.tick += 1;
            (inner.tick, inner.subscribers.clone())
        };

        for subscriber in snapshot {
            if !subscriber.active.load(Ordering::Acquire) {
                continue;
            }
            let Some(mut callback) = subscriber.callback.try_lock() else {
                tracing::warn!(
                    tick,
                    handle = subscriber.handle.raw(),
                    "skipping re-entrant tick subscriber"
                );
                continue;
            };
            (*callback)(tick);
        }

        tick
    }

    /// Id of the most recent tick, `0` before the first.
    #[must_use]
    pub fn current_tick(&self) -> TickId {
        self.inner.lock().tick
    }

    /// Number of active subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }
}

impl TickSource for Heartbeat {
    fn subscribe(&self, callback: TickFn) -> TickHandle {
        let mut inner = self.inner.lock();
        let handle = TickHandle::new(inner.next_handle);
        inner.next_handle += 1;
        inner.subscribers.push(Arc::new(TickSubscriber {
            handle,
            active: AtomicBool::new(true),
            callback: Mutex::new(callback),
        }));
        tracing::trace!(handle = handle.raw(), "tick subscriber added");
        handle
    }

    fn cancel(&self, handle: TickHandle) -> bool {
        let mut inner = self.inner.lock();
        let Some(index) = inner.subscribers.iter().position(|s| s.handle == handle) else {
            return false;
        };
        let subscriber = inner.subscribers.remove(index);
        subscriber.active.store(false, Ordering::Release);
        tracing::trace!(handle = handle.raw(), "tick subscriber cancelled");
        true
    }
}

impl core::fmt::Debug for Heartbeat {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Heartbeat")
            .field("tick", &inner.tick)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;

    #[test]
    fn test_tick_invokes_subscribers() {
        let heartbeat = Heartbeat::new();
        let last = Arc::new(AtomicU64::new(0));

        let l = Arc::clone(&last);
        heartbeat.subscribe(Box::new(move |tick| l.store(tick, Ordering::SeqCst)));

        assert_eq!(heartbeat.tick(), 1);
        assert_eq!(heartbeat.tick(), 2);
        assert_eq!(last.load(Ordering::SeqCst), 2);
        assert_eq!(heartbeat.current_tick(), 2);
    }

    #[test]
    fn test_cancel_stops_callback() {
        let heartbeat = Heartbeat::new();
        let count = Arc::new(AtomicU64::new(0));

        let c = Arc::clone(&count);
        let handle = heartbeat.subscribe(Box::new(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        }));

        heartbeat.tick();
        assert!(heartbeat.cancel(handle));
        assert!(!heartbeat.cancel(handle));
        heartbeat.tick();

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(heartbeat.subscriber_count(), 0);
    }

    #[test]
    fn test_cancel_during_tick_skips_later_subscriber() {
        let heartbeat = Heartbeat::new();
        let count = Arc::new(AtomicU64::new(0));
        let victim = Arc::new(Mutex::new(None::<TickHandle>));

        let hb = heartbeat.clone();
        let v = Arc::clone(&victim);
        heartbeat.subscribe(Box::new(move |_| {
            if let Some(handle) = v.lock().take() {
                hb.cancel(handle);
            }
        }));

        let c = Arc::clone(&count);
        let handle = heartbeat.subscribe(Box::new(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        }));
        *victim.lock() = Some(handle);

        heartbeat.tick();
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_reentrant_tick_does_not_deadlock() {
        let heartbeat = Heartbeat::new();
        let count = Arc::new(AtomicU64::new(0));

        let hb = heartbeat.clone();
        let c = Arc::clone(&count);
        heartbeat.subscribe(Box::new(move |tick| {
            c.fetch_add(1, Ordering::SeqCst);
            if tick == 1 {
                hb.tick();
            }
        }));

        heartbeat.tick();
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(heartbeat.current_tick(), 2);
    }
}
