//! Decoding of the fixed 12-byte RTP header (RFC 3550 §5.1).
//!
//! Only the fixed header and, when present, the single extension block are
//! understood here. CSRC lists beyond the count nibble are not walked (see
//! the crate-level open questions); extension and dynamic-payload
//! redundancy framing are walked far enough to locate the start of the
//! payload.

use thiserror::Error;

const HEADER_LEN: usize = 12;

const VERSION_MASK: u16 = 0xC000;
const PADDING_MASK: u16 = 0x2000;
const EXTENSION_MASK: u16 = 0x1000;
const CSRC_COUNT_MASK: u16 = 0x0F00;
const MARKER_MASK: u16 = 0x0080;
const PAYLOAD_TYPE_MASK: u16 = 0x007F;

/// Payload type used by the dynamic redundancy-recovery encoding described
/// in the push/pop loss-detection protocol.
pub const DYNAMIC_PAYLOAD_TYPE: u8 = 0x79;

/// Failure modes of header decoding.
///
/// This is an internal, typed cause — `push` folds any of these into
/// [`crate::error::PushOutcome::BadPacket`] rather than surfacing a
/// `Result::Err` to callers, since a malformed packet is an expected,
/// non-exceptional outcome for this API.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HeaderError {
    /// Fewer than 12 bytes were supplied.
    #[error("packet shorter than the fixed RTP header ({0} bytes)")]
    TooShort(usize),
    /// The extension header's declared length runs past the end of the
    /// supplied bytes.
    #[error("extension header overruns packet bounds")]
    ExtensionOverrun,
    /// The dynamic-payload redundancy preamble's declared length, or its
    /// trailing primary payload-type byte, runs past the end of the
    /// supplied bytes.
    #[error("redundant payload preamble overruns packet bounds")]
    RedundancyOverrun,
}

#[inline]
fn flags_raw(pkt: &[u8]) -> u16 {
    u16::from_be_bytes([pkt[0], pkt[1]])
}

/// Reads the 16-bit flags word (version, padding, extension, CSRC count,
/// marker, payload type).
///
/// # Panics
/// Panics if `pkt` is shorter than 12 bytes. Callers that have not already
/// validated length should use [`seq`] or [`validate`] first.
pub fn flags(pkt: &[u8]) -> u16 {
    flags_raw(pkt)
}

/// Extracts the 16-bit RTP sequence number (offset 2, network byte order).
pub fn seq(pkt: &[u8]) -> u16 {
    u16::from_be_bytes([pkt[2], pkt[3]])
}

/// Extracts the 32-bit RTP timestamp (offset 4, network byte order).
pub fn ts(pkt: &[u8]) -> u32 {
    u32::from_be_bytes([pkt[4], pkt[5], pkt[6], pkt[7]])
}

/// Extracts the 32-bit synchronization source identifier (offset 8).
pub fn ssrc(pkt: &[u8]) -> u32 {
    u32::from_be_bytes([pkt[8], pkt[9], pkt[10], pkt[11]])
}

/// True when the RTP marker bit is set.
pub fn marker(pkt: &[u8]) -> bool {
    flags_raw(pkt) & MARKER_MASK != 0
}

/// True when the extension bit is set.
pub fn has_extension(pkt: &[u8]) -> bool {
    flags_raw(pkt) & EXTENSION_MASK != 0
}

/// True when the padding bit is set.
pub fn has_padding(pkt: &[u8]) -> bool {
    flags_raw(pkt) & PADDING_MASK != 0
}

/// The two-bit RTP version field, shifted down to `0..=3`.
pub fn version(pkt: &[u8]) -> u8 {
    ((flags_raw(pkt) & VERSION_MASK) >> 14) as u8
}

/// The four-bit CSRC count field, shifted down to `0..=15`.
pub fn csrc_count(pkt: &[u8]) -> u8 {
    ((flags_raw(pkt) & CSRC_COUNT_MASK) >> 8) as u8
}

/// The 7-bit payload type field.
pub fn payload_type(pkt: &[u8]) -> u8 {
    (flags_raw(pkt) & PAYLOAD_TYPE_MASK) as u8
}

/// Validates that `pkt` is long enough to contain the fixed header.
pub fn validate(pkt: &[u8]) -> Result<(), HeaderError> {
    if pkt.len() < HEADER_LEN {
        return Err(HeaderError::TooShort(pkt.len()));
    }
    Ok(())
}

/// Walks past the fixed 12-byte header and, if the extension bit is set,
/// the extension block, returning the offset just past either. Does not
/// look at the dynamic-payload redundancy preamble.
///
/// This is the full decode a `push` call needs to reject a packet: SPEC
/// behavior only requires `push` to validate the fixed header and an
/// optional extension block, not the redundancy framing (that is only
/// walked by [`payload_start`] itself, on the read path that actually
/// needs the primary payload offset).
fn header_and_extension_end(pkt: &[u8]) -> Result<usize, HeaderError> {
    validate(pkt)?;
    let mut idx = HEADER_LEN;

    if has_extension(pkt) {
        if idx + 4 > pkt.len() {
            return Err(HeaderError::ExtensionOverrun);
        }
        let ext_len_words = u16::from_be_bytes([pkt[idx + 2], pkt[idx + 3]]) as usize;
        idx += 4;
        let ext_bytes = ext_len_words * 4;
        if idx + ext_bytes > pkt.len() {
            return Err(HeaderError::ExtensionOverrun);
        }
        idx += ext_bytes;
    }

    Ok(idx)
}

/// Validates that `pkt` decodes far enough for `push` to accept it: the
/// fixed 12-byte header, plus the extension block if the extension bit is
/// set. Does not walk the dynamic-payload redundancy preamble — that
/// framing is only relevant to [`payload_start`], not to push-time
/// admission.
pub fn validate_push(pkt: &[u8]) -> Result<(), HeaderError> {
    header_and_extension_end(pkt).map(|_| ())
}

/// Computes the byte offset at which payload data begins.
///
/// Walks past the fixed 12-byte header, an extension block (if the
/// extension bit is set), and — for the dynamic redundancy payload type —
/// the redundancy preamble described in the push/pop loss-recovery
/// protocol: a 3-byte preamble, a one-byte redundant-payload length, that
/// many bytes of redundant payload, and a one-byte primary payload type.
///
/// CSRC list length is deliberately not accounted for here; see the
/// crate-level open question on this point.
pub fn payload_start(pkt: &[u8]) -> Result<usize, HeaderError> {
    let mut idx = header_and_extension_end(pkt)?;

    if payload_type(pkt) == DYNAMIC_PAYLOAD_TYPE {
        if idx + 4 > pkt.len() {
            return Err(HeaderError::RedundancyOverrun);
        }
        // 3-byte redundancy preamble, then a 1-byte redundant-payload length.
        let redundant_len = pkt[idx + 3] as usize;
        idx += 4;
        if idx + redundant_len + 1 > pkt.len() {
            return Err(HeaderError::RedundancyOverrun);
        }
        idx += redundant_len + 1;
    }

    Ok(idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header(seq_no: u16, ts_val: u32, pt: u8) -> Vec<u8> {
        let mut pkt = vec![0u8; HEADER_LEN];
        let flags_word = 0x8000u16 | (pt as u16 & 0x7F);
        pkt[0..2].copy_from_slice(&flags_word.to_be_bytes());
        pkt[2..4].copy_from_slice(&seq_no.to_be_bytes());
        pkt[4..8].copy_from_slice(&ts_val.to_be_bytes());
        pkt[8..12].copy_from_slice(&0xDEAD_BEEFu32.to_be_bytes());
        pkt
    }

    #[test]
    fn decodes_fixed_fields() {
        let pkt = sample_header(42, 160_000, 0);
        assert_eq!(seq(&pkt), 42);
        assert_eq!(ts(&pkt), 160_000);
        assert_eq!(ssrc(&pkt), 0xDEAD_BEEF);
        assert_eq!(version(&pkt), 2);
        assert!(!has_extension(&pkt));
        assert_eq!(payload_type(&pkt), 0);
    }

    #[test]
    fn too_short_is_rejected() {
        let pkt = vec![0u8; 4];
        assert_eq!(validate(&pkt), Err(HeaderError::TooShort(4)));
        assert_eq!(payload_start(&pkt), Err(HeaderError::TooShort(4)));
    }

    #[test]
    fn payload_start_without_extension_is_twelve() {
        let pkt = sample_header(1, 1, 8);
        assert_eq!(payload_start(&pkt).unwrap(), HEADER_LEN);
    }

    #[test]
    fn extension_block_is_skipped() {
        let mut pkt = sample_header(1, 1, 8);
        let flags_word = flags_raw(&pkt) | EXTENSION_MASK;
        pkt[0..2].copy_from_slice(&flags_word.to_be_bytes());
        // extension profile (2 bytes) + length-in-words (2 bytes) = 1 word
        pkt.extend_from_slice(&[0xBE, 0xEF, 0x00, 0x01]);
        pkt.extend_from_slice(&[0, 0, 0, 0]); // one word of extension data
        pkt.extend_from_slice(&[1, 2, 3, 4]); // payload
        assert!(has_extension(&pkt));
        assert_eq!(payload_start(&pkt).unwrap(), HEADER_LEN + 4 + 4);
    }

    #[test]
    fn extension_overrun_is_rejected() {
        let mut pkt = sample_header(1, 1, 8);
        let flags_word = flags_raw(&pkt) | EXTENSION_MASK;
        pkt[0..2].copy_from_slice(&flags_word.to_be_bytes());
        pkt.extend_from_slice(&[0xBE, 0xEF, 0x00, 0x05]); // claims 5 words, none present
        assert_eq!(payload_start(&pkt), Err(HeaderError::ExtensionOverrun));
    }

    #[test]
    fn dynamic_payload_skips_redundancy_preamble() {
        let mut pkt = sample_header(5, 1, DYNAMIC_PAYLOAD_TYPE);
        // 3-byte preamble + 1-byte redundant length (2) + 2 redundant bytes + 1 primary PT byte
        pkt.extend_from_slice(&[0, 0, 0, 2, 0xAA, 0xBB, 0]);
        pkt.extend_from_slice(&[9, 9]); // primary payload
        assert_eq!(payload_start(&pkt).unwrap(), HEADER_LEN + 4 + 2 + 1);
    }

    #[test]
    fn dynamic_payload_overrun_is_rejected() {
        let mut pkt = sample_header(5, 1, DYNAMIC_PAYLOAD_TYPE);
        pkt.extend_from_slice(&[0, 0, 0, 10]); // claims 10 redundant bytes, none present
        assert_eq!(payload_start(&pkt), Err(HeaderError::RedundancyOverrun));
    }

    #[test]
    fn validate_push_accepts_fixed_header_with_no_extension() {
        let pkt = sample_header(1, 1, 8);
        assert_eq!(validate_push(&pkt), Ok(()));
    }

    #[test]
    fn validate_push_rejects_too_short_packet() {
        let pkt = vec![0u8; 4];
        assert_eq!(validate_push(&pkt), Err(HeaderError::TooShort(4)));
    }

    #[test]
    fn validate_push_rejects_extension_overrun() {
        let mut pkt = sample_header(1, 1, 8);
        let flags_word = flags_raw(&pkt) | EXTENSION_MASK;
        pkt[0..2].copy_from_slice(&flags_word.to_be_bytes());
        pkt.extend_from_slice(&[0xBE, 0xEF, 0x00, 0x05]); // claims 5 words, none present
        assert_eq!(validate_push(&pkt), Err(HeaderError::ExtensionOverrun));
    }

    #[test]
    fn validate_push_does_not_walk_redundancy_preamble() {
        // A dynamic-payload packet whose (unwalked) redundancy preamble would
        // overrun the buffer if `validate_push` inspected it — it must not.
        let pkt = sample_header(5, 1, DYNAMIC_PAYLOAD_TYPE);
        assert_eq!(validate_push(&pkt), Ok(()));
        assert_eq!(payload_start(&pkt), Err(HeaderError::RedundancyOverrun));
    }
}
