//! Hand-driven clock for deterministic tests.

use std::sync::atomic::{AtomicI64, Ordering};

use crate::clock::Clock;

/// A [`Clock`] that only moves when told to.
///
/// ```rust,ignore
/// let clock = Arc::new(ManualClock::new(1_000));
/// let store = InMemoryTicketStore::with_clock(clock.clone());
/// clock.advance(500);
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: AtomicI64::new(start_ms),
        }
    }

    /// Move the clock forward by `ms`.
    pub fn advance(&self, ms: i64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: i64) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
