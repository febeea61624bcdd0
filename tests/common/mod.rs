//! Shared RTP packet synthesis helpers for integration tests.

use bytes::Bytes;
use rtp_jitterbuf::PacketCarrier;

/// Installs a `tracing` subscriber that writes to the test harness's
/// captured output, so the overflow/out-of-order trace lines emitted on the
/// buffer's hot path show up under `cargo test -- --nocapture`. Safe to
/// call from multiple tests; only the first call wins.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Builds a minimal 12-byte RTP packet with the given sequence number,
/// timestamp, and payload type, wrapped in a [`PacketCarrier`] declaring
/// `payload_ms` of media.
#[allow(dead_code)]
pub fn packet(seq: u16, ts: u32, payload_type: u8, payload_ms: u32) -> PacketCarrier {
    let mut raw = vec![0u8; 12];
    let flags = 0x8000u16 | (payload_type as u16 & 0x7F);
    raw[0..2].copy_from_slice(&flags.to_be_bytes());
    raw[2..4].copy_from_slice(&seq.to_be_bytes());
    raw[4..8].copy_from_slice(&ts.to_be_bytes());
    raw[8..12].copy_from_slice(&0xC0FF_EEu32.to_be_bytes());
    PacketCarrier::new(Bytes::from(raw), payload_ms)
}
