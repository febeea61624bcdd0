//! Result enumerations returned by [`crate::JitterBuffer`]'s push and pop
//! operations.
//!
//! Kept as two distinct enums rather than a single unified result type:
//! `pop` needs to carry a delivered [`PacketCarrier`] payload on success,
//! and no operation in this crate shares a result shape with the other.

use crate::carrier::PacketCarrier;

/// Outcome of a [`crate::JitterBuffer::push`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The packet was accepted and inserted in sequence order.
    Success,
    /// The packet was accepted, but accepting it pushed buffered depth
    /// over the configured maximum, so the oldest buffered packet was
    /// evicted.
    BufferOverflow,
    /// The packet was rejected: either undecodable, or an out-of-order
    /// arrival too old to place in the queue.
    BadPacket,
}

/// Outcome of a [`crate::JitterBuffer::pop`] call.
#[derive(Debug, Clone)]
pub enum PopOutcome {
    /// A packet was delivered.
    Delivered(PacketCarrier),
    /// The buffer is still in its warmup state, or the queue is currently
    /// empty; the reference behavior this crate preserves treats both
    /// cases identically. Try again after a pacing interval.
    Buffering,
    /// A gap was detected between the last delivered sequence number and
    /// the head of the queue. No packet is delivered; the consumer should
    /// perform loss concealment for the missing sequence number.
    DroppedPacket,
    /// Reserved for API completeness. The reference implementation this
    /// crate follows never actually returns this variant, returning
    /// [`PopOutcome::Buffering`] for an empty queue instead; see the
    /// crate-level open questions.
    BufferEmpty,
}

impl PopOutcome {
    /// Returns the delivered carrier, if this outcome carries one.
    pub fn into_delivered(self) -> Option<PacketCarrier> {
        match self {
            PopOutcome::Delivered(carrier) => Some(carrier),
            _ => None,
        }
    }

    /// True if a packet was delivered.
    pub fn is_delivered(&self) -> bool {
        matches!(self, PopOutcome::Delivered(_))
    }
}
