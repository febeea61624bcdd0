//! The owned record that travels through the buffer between `push` and
//! `pop`: a raw RTP datagram plus the small amount of metadata the caller
//! and the buffer itself need to attach to it.

use bytes::Bytes;

/// A single RTP datagram, owned by the buffer between insertion and
/// delivery.
///
/// `raw_bytes` is kept as [`Bytes`] rather than `Vec<u8>` so that the
/// redundancy-recovery delivery path can hand the consumer a cheap clone
/// of the carrier while the buffer retains its own copy in the queue,
/// without copying the payload.
#[derive(Debug, Clone)]
pub struct PacketCarrier {
    /// The raw RTP datagram, including the fixed header.
    pub raw_bytes: Bytes,
    /// Caller-declared duration of media this packet represents, in
    /// milliseconds.
    pub payload_ms: u32,
    /// Payload type. Overwritten by `push` with the value decoded from the
    /// wire header; any value supplied here is only a hint used before the
    /// packet has been decoded.
    pub payload_type: u8,
    /// Set by the buffer when this carrier is being delivered as a
    /// redundant copy recovering a previously lost packet.
    pub use_redundant_payload: bool,
}

impl PacketCarrier {
    /// Builds a new carrier from raw bytes and a declared payload duration.
    /// `payload_type` is a hint; `push` overwrites it with the decoded
    /// value from the wire header.
    pub fn new(raw_bytes: impl Into<Bytes>, payload_ms: u32) -> Self {
        Self {
            raw_bytes: raw_bytes.into(),
            payload_ms,
            payload_type: 0,
            use_redundant_payload: false,
        }
    }
}
