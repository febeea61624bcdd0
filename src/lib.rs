//! A real-time jitter buffer for RTP media streams.
//!
//! This crate absorbs arrival-time variance between an unreliable network
//! producer and a steady-cadence media consumer: it reorders packets that
//! arrive out of sequence, detects gaps, recovers single-packet losses
//! carried as dynamic-payload redundancy, and tracks RFC 3550 interarrival
//! jitter. It does not parse anything beyond the fixed 12-byte RTP header,
//! does not touch the network, and does not decode media payloads — those
//! are the caller's concern.
//!
//! The buffer is safe to share between one producer thread calling
//! [`JitterBuffer::push`] and one consumer thread calling
//! [`JitterBuffer::pop`]: every operation is serialized behind a single
//! reentrant lock.
//!
//! ```
//! use rtp_jitterbuf::{JitterBuffer, PacketCarrier, PushOutcome};
//!
//! let jb = JitterBuffer::new(60, 8000);
//! let mut pkt = vec![0u8; 12];
//! pkt[2..4].copy_from_slice(&1u16.to_be_bytes());
//! assert_eq!(jb.push(PacketCarrier::new(pkt, 20)), PushOutcome::Success);
//! ```

mod buffer;
mod carrier;
mod clock;
mod error;
mod stats;

pub mod header;

pub use carrier::PacketCarrier;
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use error::{PopOutcome, PushOutcome};
pub use header::HeaderError;

use std::cell::RefCell;
use std::sync::Arc;

use parking_lot::ReentrantMutex;

use buffer::Inner;

/// A sequence-ordered, depth-bounded buffer for a single RTP stream.
///
/// Construct one per stream with [`JitterBuffer::new`]. Every method takes
/// `&self`: the type is `Send + Sync` and is meant to be wrapped in an
/// [`std::sync::Arc`] and shared between a producer thread (calling
/// [`push`](JitterBuffer::push)) and a consumer thread (calling
/// [`pop`](JitterBuffer::pop)).
pub struct JitterBuffer {
    inner: ReentrantMutex<RefCell<Inner>>,
}

impl JitterBuffer {
    /// Builds a new buffer with the given nominal playout depth (in
    /// milliseconds) and media sample rate (in Hz), using the default
    /// wall-clock time source.
    ///
    /// The maximum buffered depth defaults to twice `nominal_depth_ms`;
    /// use [`JitterBuffer::set_depth`] to override it.
    pub fn new(nominal_depth_ms: u32, sample_rate_hz: u32) -> Self {
        Self::with_clock(
            nominal_depth_ms,
            sample_rate_hz,
            Arc::new(clock::MonotonicClock::new()),
        )
    }

    /// Builds a new buffer with an explicit [`Clock`] implementation,
    /// for deterministic tests or an alternate time source.
    pub fn with_clock(nominal_depth_ms: u32, sample_rate_hz: u32, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: ReentrantMutex::new(RefCell::new(Inner::new(
                nominal_depth_ms,
                sample_rate_hz,
                clock,
            ))),
        }
    }

    /// Re-initializes the buffer in place: equivalent to constructing a
    /// fresh instance with a new nominal depth and sample rate, but keeps
    /// the existing clock. The jitter estimator is rebuilt against the new
    /// sample rate rather than continuing to use the old one.
    pub fn init(&self, nominal_depth_ms: u32, sample_rate_hz: u32) {
        let guard = self.inner.lock();
        guard.borrow_mut().init(nominal_depth_ms, sample_rate_hz);
    }

    /// Pushes a packet onto the buffer. Safe to call from the producer
    /// thread concurrently with [`pop`](Self::pop) on another thread.
    #[must_use]
    pub fn push(&self, carrier: PacketCarrier) -> PushOutcome {
        let guard = self.inner.lock();
        guard.borrow_mut().push(carrier)
    }

    /// Attempts to deliver the next packet in sequence. Safe to call from
    /// the consumer thread concurrently with [`push`](Self::push) on
    /// another thread.
    #[must_use]
    pub fn pop(&self) -> PopOutcome {
        let guard = self.inner.lock();
        guard.borrow_mut().pop()
    }

    /// Clears the queue and resets all statistics and sequence trackers,
    /// returning the buffer to its initial warmup state.
    pub fn reset(&self) {
        let guard = self.inner.lock();
        guard.borrow_mut().reset();
    }

    /// Reconfigures the nominal and maximum playout depth, in
    /// milliseconds. If `max_depth_ms` is less than `nominal_depth_ms`
    /// (including the default of zero), the maximum is set to twice the
    /// nominal depth.
    pub fn set_depth(&self, nominal_depth_ms: u32, max_depth_ms: u32) {
        let guard = self.inner.lock();
        guard.borrow_mut().set_depth(nominal_depth_ms, max_depth_ms);
    }

    /// Number of packets currently queued.
    #[must_use]
    pub fn get_depth(&self) -> usize {
        let guard = self.inner.lock();
        guard.borrow().depth()
    }

    /// Milliseconds of media currently queued.
    #[must_use]
    pub fn get_depth_ms(&self) -> u32 {
        let guard = self.inner.lock();
        guard.borrow().depth_ms()
    }

    /// The configured nominal playout depth, in milliseconds.
    #[must_use]
    pub fn get_nominal_depth(&self) -> u32 {
        let guard = self.inner.lock();
        guard.borrow().nominal_depth_ms()
    }

    /// True while the buffer is in its warmup state and [`pop`](Self::pop)
    /// will refuse delivery.
    #[must_use]
    pub fn buffering(&self) -> bool {
        let guard = self.inner.lock();
        guard.borrow().buffering()
    }

    /// Asserts end-of-transmission: zeroes the sequence trackers used by
    /// the loss-detection protocol, without touching the queue, depth
    /// accounting, or statistics.
    ///
    /// Despite its name this is a mutating action, not a query — it
    /// matches the operation this crate's reference behavior exposes.
    pub fn eot_detected(&self) {
        let guard = self.inner.lock();
        guard.borrow_mut().eot_detected();
    }

    /// Total number of overflow evictions since construction or the last
    /// reset.
    #[must_use]
    pub fn overflow_count(&self) -> u32 {
        let guard = self.inner.lock();
        guard.borrow().stats().overflow_count()
    }

    /// Total number of out-of-order insertions since construction or the
    /// last reset.
    #[must_use]
    pub fn out_of_order_count(&self) -> u32 {
        let guard = self.inner.lock();
        guard.borrow().stats().out_of_order_count()
    }

    /// Total number of empty-queue observations since construction or the
    /// last reset.
    #[must_use]
    pub fn empty_count(&self) -> u32 {
        let guard = self.inner.lock();
        guard.borrow().stats().empty_count()
    }

    /// Current smoothed RFC 3550 jitter estimate, in RTP timestamp ticks.
    #[must_use]
    pub fn jitter(&self) -> u32 {
        let guard = self.inner.lock();
        guard.borrow().stats().jitter()
    }

    /// Largest jitter estimate observed since construction or the last
    /// reset, in RTP timestamp ticks.
    #[must_use]
    pub fn max_jitter(&self) -> u32 {
        let guard = self.inner.lock();
        guard.borrow().stats().max_jitter()
    }
}
