//! Subscription handles.

use std::sync::Weak;

use parking_lot::Mutex;

use crate::signal::SignalInner;

/// Identifier of a callback registered on one [`Signal`](crate::Signal).
///
/// Ids are unique per signal, not across signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);

impl SubscriptionId {
    /// Create a new subscription ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Handle returned by [`Signal::subscribe`](crate::Signal::subscribe).
///
/// Dropping the handle does **not** unsubscribe; call [`Subscription::unsubscribe`].
/// The handle holds only a weak reference, so it never keeps a signal alive.
pub struct Subscription {
    id: SubscriptionId,
    signal: Weak<Mutex<SignalInner>>,
}

impl Subscription {
    pub(crate) fn new(id: SubscriptionId, signal: Weak<Mutex<SignalInner>>) -> Self {
        Self { id, signal }
    }

    /// The id of this subscription on its signal.
    #[must_use]
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Remove this callback from its signal.
    ///
    /// Returns `true` if the callback was still subscribed. Calling it twice is a no-op.
    pub fn unsubscribe(&self) -> bool {
        self.signal
            .upgrade()
            .is_some_and(|inner| inner.lock().remove(self.id))
    }

    /// Whether the callback is still subscribed.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.signal
            .upgrade()
            .is_some_and(|inner| inner.lock().contains(self.id))
    }
}

impl core::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
