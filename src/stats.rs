//! Running statistics, including the RFC 3550 Appendix A.8 interarrival
//! jitter estimate.
//!
//! The estimator's state (`prev_arrival`, `prev_transit`,
//! `prev_rx_timestamp`, `ts_units_per_ms`) is folded directly into this
//! struct rather than split into a separate type, since it is specified as
//! part of the statistics block.

/// Counters and running estimates exposed by [`crate::JitterBuffer`].
///
/// All counters are monotonic across the instance lifetime and are reset
/// only by `init`/`reset`.
#[derive(Debug, Clone)]
pub struct Stats {
    overflow_count: u32,
    empty_count: u32,
    ooo_count: u32,

    jitter: f64,
    max_jitter: f64,

    // Jitter estimator state, RFC 3550 Appendix A.8. `prev_arrival` and
    // `prev_transit` are 32-bit RTP timestamp ticks; arithmetic on them
    // wraps modulo 2^32 and differences are reinterpreted as signed, the
    // same idiom the RFC reference implementation uses with `int32_t`.
    prev_arrival: u32,
    prev_transit: i32,
    prev_rx_timestamp: u64,
    ts_units_per_ms: u32,
}

impl Stats {
    /// Builds a fresh, zeroed statistics block for the given media sample
    /// rate.
    pub fn new(sample_rate_hz: u32) -> Self {
        Self {
            overflow_count: 0,
            empty_count: 0,
            ooo_count: 0,
            jitter: 0.0,
            max_jitter: 0.0,
            prev_arrival: 0,
            prev_transit: 0,
            prev_rx_timestamp: 0,
            ts_units_per_ms: (sample_rate_hz / 1000).max(1),
        }
    }

    /// Resets all counters and estimator state, keeping the configured
    /// sample rate.
    pub fn reset(&mut self) {
        let ts_units_per_ms = self.ts_units_per_ms;
        *self = Self::new(ts_units_per_ms * 1000);
    }

    /// Updates the jitter estimate for a newly arrived packet.
    ///
    /// `pkt_ts` is the packet's RTP timestamp (host order). `now_ms` is the
    /// buffer's monotonic clock reading at arrival.
    ///
    /// Deliberate deviation from RFC 3550: `prev_arrival` is advanced to
    /// the packet's own `ts` rather than to the synthesized `arrival`. This
    /// is a documented, preserved quirk, not a bug to fix.
    pub fn on_packet_arrival(&mut self, pkt_ts: u32, now_ms: u64) {
        let arrival = if self.prev_arrival == 0 {
            pkt_ts
        } else {
            let interarrival_ms = now_ms.wrapping_sub(self.prev_rx_timestamp) as u32;
            self.prev_arrival
                .wrapping_add(interarrival_ms.wrapping_mul(self.ts_units_per_ms))
        };

        let transit = arrival.wrapping_sub(pkt_ts) as i32;
        let d = (transit.wrapping_sub(self.prev_transit)).unsigned_abs() as f64;
        self.jitter += (d - self.jitter) / 16.0;
        if self.jitter > self.max_jitter {
            self.max_jitter = self.jitter;
        }

        self.prev_transit = transit;
        self.prev_arrival = pkt_ts;
        self.prev_rx_timestamp = now_ms;
    }

    /// Increments the overflow counter after the buffer evicts its head
    /// due to exceeding the configured maximum depth.
    pub fn record_overflow(&mut self) {
        self.overflow_count += 1;
    }

    /// Increments the empty counter when `pop` observes an empty queue.
    pub fn record_empty(&mut self) {
        self.empty_count += 1;
    }

    /// Increments the out-of-order counter for any insertion that is not a
    /// plain tail append.
    pub fn record_out_of_order(&mut self) {
        self.ooo_count += 1;
    }

    /// Total overflow evictions since construction or the last reset.
    pub fn overflow_count(&self) -> u32 {
        self.overflow_count
    }

    /// Total empty-queue observations since construction or the last
    /// reset.
    pub fn empty_count(&self) -> u32 {
        self.empty_count
    }

    /// Total out-of-order insertions since construction or the last reset.
    pub fn out_of_order_count(&self) -> u32 {
        self.ooo_count
    }

    /// Current smoothed jitter estimate, truncated to whole RTP timestamp
    /// ticks.
    pub fn jitter(&self) -> u32 {
        self.jitter as u32
    }

    /// Largest jitter estimate observed since construction or the last
    /// reset, truncated to whole RTP timestamp ticks.
    pub fn max_jitter(&self) -> u32 {
        self.max_jitter as u32
    }

    /// RTP timestamp ticks per millisecond, derived from the configured
    /// sample rate, used by the jitter estimator to synthesize `arrival`.
    pub fn ts_units_per_ms(&self) -> u32 {
        self.ts_units_per_ms
    }
}
