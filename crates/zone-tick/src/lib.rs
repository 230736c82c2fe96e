//! Tick-driven execution.
//!
//! # Tick Execution Model
//!
//! ```text
//! Tick N:
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Phase 1: Advance tick counter                              │
//! │  Phase 2: Snapshot subscribers                              │
//! │  Phase 3: Invoke each still-active subscriber, in order     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Consumers depend only on [`TickSource`]; [`Heartbeat`] is the in-process
//! implementation used by the demo and the tests. A host engine plugs in its own
//! frame loop by implementing the trait.

mod heartbeat;

pub use heartbeat::Heartbeat;

/// Monotonic tick number. The first tick is `1`.
pub type TickId = u64;

/// Callback run once per tick.
pub type TickFn = Box<dyn FnMut(TickId) + Send>;

/// Handle identifying one subscription on a [`TickSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(u64);

impl TickHandle {
    /// Create a handle from a raw value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw handle value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// A periodic update source.
///
/// Implementations must invoke each subscribed callback at most once per tick and
/// must not invoke a callback after [`TickSource::cancel`] returned for it.
///
/// Nested ticking is unsupported. A tick started from inside a tick callback does
/// not invoke the callback that is still running, so that subscriber misses the
/// nested tick entirely ([`Heartbeat`] logs a `warn` when this happens).
pub trait TickSource {
    /// Register a callback to run every tick.
    fn subscribe(&self, callback: TickFn) -> TickHandle;

    /// Stop a subscription. Returns `false` if it was not active.
    fn cancel(&self, handle: TickHandle) -> bool;
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Heartbeat, TickFn, TickHandle, TickId, TickSource};
}
