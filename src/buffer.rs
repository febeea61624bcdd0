//! The ordered buffer and state machine: sequence-ordered insertion with
//! 16-bit wraparound, the buffering/playout gate, and the loss-detection
//! protocol between `push` and `pop`.
//!
//! Structurally this is the sequence-indexed queue and
//! `Fill`/`Drain`-style gate found in a playout buffer, generalized to a
//! standalone bounded-depth buffer with explicit loss reporting and
//! redundancy recovery instead of a fixed jitter window.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::carrier::PacketCarrier;
use crate::clock::Clock;
use crate::error::{PopOutcome, PushOutcome};
use crate::header;
use crate::stats::Stats;

struct Slot {
    carrier: PacketCarrier,
    seq: u16,
}

/// Default maximum depth multiplier applied when a caller does not supply
/// an explicit `max_depth_ms` to [`Inner::set_depth`].
const DEFAULT_MAX_DEPTH_MULTIPLIER: u32 = 2;

/// The non-`Sync` inner state, guarded by the reentrant lock in
/// [`crate::JitterBuffer`].
pub(crate) struct Inner {
    queue: VecDeque<Slot>,

    nominal_depth_ms: u32,
    max_buffer_depth_ms: u32,
    depth_ms: u32,
    sample_rate_hz: u32,

    first_buf_seq: u16,
    last_buf_seq: u16,
    last_pop_seq: u16,

    buffering: bool,
    buffering_started_at: Option<u64>,

    stats: Stats,
    clock: Arc<dyn Clock>,
}

impl Inner {
    pub(crate) fn new(nominal_depth_ms: u32, sample_rate_hz: u32, clock: Arc<dyn Clock>) -> Self {
        let mut inner = Self {
            queue: VecDeque::new(),
            nominal_depth_ms,
            max_buffer_depth_ms: nominal_depth_ms * DEFAULT_MAX_DEPTH_MULTIPLIER,
            depth_ms: 0,
            sample_rate_hz,
            first_buf_seq: 0,
            last_buf_seq: 0,
            last_pop_seq: 0,
            buffering: true,
            buffering_started_at: None,
            stats: Stats::new(sample_rate_hz),
            clock,
        };
        inner.set_depth(nominal_depth_ms, 0);
        inner
    }

    pub(crate) fn reset(&mut self) {
        self.queue.clear();
        self.depth_ms = 0;
        self.first_buf_seq = 0;
        self.last_buf_seq = 0;
        self.last_pop_seq = 0;
        self.buffering = true;
        self.buffering_started_at = None;
        self.stats.reset();
    }

    /// Re-initializes in place with a new nominal depth and sample rate:
    /// equivalent to [`Inner::new`] with the existing clock kept. Unlike
    /// [`Inner::reset`], this also rebuilds the jitter estimator against the
    /// new sample rate rather than the one the instance was constructed
    /// with.
    pub(crate) fn init(&mut self, nominal_depth_ms: u32, sample_rate_hz: u32) {
        self.reset();
        self.sample_rate_hz = sample_rate_hz;
        self.stats = Stats::new(sample_rate_hz);
        self.set_depth(nominal_depth_ms, 0);
    }

    pub(crate) fn set_depth(&mut self, nominal_depth_ms: u32, max_depth_ms: u32) {
        self.nominal_depth_ms = nominal_depth_ms;
        self.max_buffer_depth_ms = if max_depth_ms < nominal_depth_ms {
            nominal_depth_ms * DEFAULT_MAX_DEPTH_MULTIPLIER
        } else {
            max_depth_ms
        };
    }

    pub(crate) fn eot_detected(&mut self) {
        self.first_buf_seq = 0;
        self.last_buf_seq = 0;
        self.last_pop_seq = 0;
    }

    pub(crate) fn depth(&self) -> usize {
        self.queue.len()
    }

    pub(crate) fn depth_ms(&self) -> u32 {
        self.depth_ms
    }

    pub(crate) fn nominal_depth_ms(&self) -> u32 {
        self.nominal_depth_ms
    }

    pub(crate) fn buffering(&self) -> bool {
        self.buffering
    }

    pub(crate) fn stats(&self) -> &Stats {
        &self.stats
    }

    pub(crate) fn push(&mut self, mut carrier: PacketCarrier) -> PushOutcome {
        if let Err(err) = header::validate_push(&carrier.raw_bytes) {
            tracing::trace!(?err, "rejected undecodable packet");
            return PushOutcome::BadPacket;
        }

        let s = header::seq(&carrier.raw_bytes);
        let pkt_ts = header::ts(&carrier.raw_bytes);
        carrier.payload_type = header::payload_type(&carrier.raw_bytes);

        let mut outcome = PushOutcome::Success;

        if self.depth_ms > self.max_buffer_depth_ms {
            if let Some(evicted) = self.queue.pop_front() {
                self.depth_ms = self.depth_ms.saturating_sub(evicted.carrier.payload_ms);
                self.stats.record_overflow();
                outcome = PushOutcome::BufferOverflow;
                if let Some(front) = self.queue.front() {
                    self.first_buf_seq = front.seq;
                }
                tracing::warn!(evicted_seq = evicted.seq, "buffer overflow, evicted head");
            }
        }

        if self.buffering && self.buffering_started_at.is_none() {
            self.buffering_started_at = Some(self.clock.now_ms());
        }

        let now_ms = self.clock.now_ms();
        self.stats.on_packet_arrival(pkt_ts, now_ms);

        let queue_was_empty = self.queue.is_empty();
        let slot = Slot { carrier, seq: s };

        if queue_was_empty {
            self.first_buf_seq = s;
            self.last_buf_seq = s;
            self.last_pop_seq = s;
            self.depth_ms += slot.carrier.payload_ms;
            self.queue.push_back(slot);
        } else if s >= self.last_buf_seq
            || (s == 0 && self.last_buf_seq == 0xFFFF)
            || self.last_pop_seq == self.first_buf_seq
        {
            self.last_buf_seq = s;
            self.depth_ms += slot.carrier.payload_ms;
            self.queue.push_back(slot);
        } else if s < self.first_buf_seq.wrapping_sub(1) {
            outcome = PushOutcome::BadPacket;
            self.stats.record_out_of_order();
            tracing::trace!(seq = s, "rejected too-old out-of-order packet");
        } else if s == self.first_buf_seq.wrapping_sub(1) {
            self.first_buf_seq = s;
            self.depth_ms += slot.carrier.payload_ms;
            self.queue.push_front(slot);
            self.stats.record_out_of_order();
            tracing::trace!(seq = s, "inserted out-of-order packet at head");
        } else {
            let pos = self
                .queue
                .iter()
                .position(|existing| existing.seq > s)
                .unwrap_or(self.queue.len());
            self.depth_ms += slot.carrier.payload_ms;
            self.queue.insert(pos, slot);
            self.stats.record_out_of_order();
            tracing::trace!(seq = s, "inserted out-of-order packet mid-queue");
        }

        outcome
    }

    pub(crate) fn pop(&mut self) -> PopOutcome {
        let now_ms = self.clock.now_ms();

        if self.queue.is_empty() {
            self.stats.record_empty();
            if !self.buffering {
                self.buffering = true;
            }
        } else if self.buffering {
            let elapsed_ms = match self.buffering_started_at {
                Some(started) => now_ms.saturating_sub(started),
                None => 0,
            };
            if elapsed_ms >= self.nominal_depth_ms as u64 || self.depth_ms >= self.nominal_depth_ms
            {
                self.buffering = false;
                self.buffering_started_at = None;
            }
        }

        if self.buffering {
            return PopOutcome::Buffering;
        }
        if self.queue.is_empty() {
            return PopOutcome::Buffering;
        }

        let head_seq = self.queue.front().expect("checked non-empty").seq;
        let head_pt = self
            .queue
            .front()
            .expect("checked non-empty")
            .carrier
            .payload_type;

        let fresh_or_caught_up = self.last_pop_seq == self.first_buf_seq;
        let contiguous = self.last_pop_seq == self.first_buf_seq.wrapping_sub(1);
        let wrapped = self.last_pop_seq == 0xFFFF && self.first_buf_seq == 0;
        let redundancy_recoverable = head_pt == header::DYNAMIC_PAYLOAD_TYPE
            && self.last_pop_seq == self.first_buf_seq.wrapping_sub(2);

        if redundancy_recoverable {
            let slot = self.queue.front_mut().expect("checked non-empty");
            slot.carrier.use_redundant_payload = true;
            let delivered = slot.carrier.clone();
            self.last_pop_seq = head_seq;
            PopOutcome::Delivered(delivered)
        } else if fresh_or_caught_up || contiguous || wrapped {
            let mut slot = self.queue.pop_front().expect("checked non-empty");
            slot.carrier.use_redundant_payload = false;
            self.depth_ms = self.depth_ms.saturating_sub(slot.carrier.payload_ms);
            self.last_pop_seq = slot.seq;
            self.first_buf_seq = match self.queue.front() {
                Some(front) => front.seq,
                None => self.last_pop_seq,
            };
            PopOutcome::Delivered(slot.carrier)
        } else {
            self.last_pop_seq = self.last_pop_seq.wrapping_add(1);
            tracing::trace!(last_pop_seq = self.last_pop_seq, "packet loss detected");
            PopOutcome::DroppedPacket
        }
    }
}

// Not read outside tests: `Stats` holds its own derived ticks-per-ms value
// for the jitter estimator, so this getter only exists to assert `init`
// rethreads the sample rate correctly.
#[allow(dead_code)]
impl Inner {
    pub(crate) fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }
}
