//! Monotonic time source injected into the buffer.
//!
//! The buffer needs "a monotonic clock with millisecond resolution... not
//! required to match real time" — see the crate-level design notes. A
//! trait object is used rather than a generic parameter because the clock
//! is an infrequently-called, injected collaborator, not a hot-path
//! abstraction, and this keeps [`crate::JitterBuffer`] non-generic.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// A source of monotonically non-decreasing milliseconds.
///
/// Implementations must never return a value smaller than a previously
/// returned value for the lifetime of the process.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current time in milliseconds, on an arbitrary epoch.
    fn now_ms(&self) -> u64;
}

/// The default clock, backed by [`std::time::Instant`].
#[derive(Debug)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    /// Creates a clock whose epoch is the moment of construction.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// A clock that only advances when told to, for deterministic scenario and
/// property tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicU64,
}

impl ManualClock {
    /// Creates a manual clock starting at zero milliseconds.
    pub fn new() -> Self {
        Self {
            now_ms: AtomicU64::new(0),
        }
    }

    /// Sets the clock to an absolute time. Panics (via the non-decreasing
    /// contract of [`Clock`]) is not enforced here; callers are expected to
    /// only advance.
    pub fn set_ms(&self, now_ms: u64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }

    /// Advances the clock by `delta_ms`.
    pub fn advance_ms(&self, delta_ms: u64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}
