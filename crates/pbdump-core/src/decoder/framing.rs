//! Streaming transport framing.
//!
//! gRPC prefixes each message with a compressed-flag byte and a 4-byte
//! big-endian length. Captures taken off the wire usually still carry it.

use tracing::trace;

/// Size of the length-prefixed message header
pub const FRAME_HEADER_LEN: usize = 5;

/// Strip a leading frame header when one appears to be present.
///
/// The header is only removed when the flag byte is `0` (uncompressed) and the
/// declared length fits in the bytes that follow. Anything else, including
/// input shorter than a header, is returned unchanged.
pub fn strip_frame_header(data: &[u8]) -> &[u8] {
    match data {
        [0, a, b, c, d, rest @ ..] => {
            let declared = u32::from_be_bytes([*a, *b, *c, *d]) as u64;
            if declared <= rest.len() as u64 {
                trace!(declared, remaining = rest.len(), "stripping frame header");
                rest
            } else {
                trace!(declared, remaining = rest.len(), "frame header length too large, ignoring");
                data
            }
        }
        _ => data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_header() {
        let data = [0x08, 0x96, 0x01];
        assert_eq!(strip_frame_header(&data), &data[..]);
    }

    #[test]
    fn test_exact_header() {
        let data = [0x00, 0x00, 0x00, 0x00, 0x03, 0x08, 0x96, 0x01];
        let body = strip_frame_header(&data);
        assert_eq!(body, &[0x08, 0x96, 0x01][..]);
        assert_eq!(data.len() - body.len(), FRAME_HEADER_LEN);
    }

    #[test]
    fn test_declared_shorter_than_remaining() {
        let data = [0x00, 0x00, 0x00, 0x00, 0x01, 0x08, 0x96, 0x01];
        assert_eq!(strip_frame_header(&data), &[0x08, 0x96, 0x01][..]);
    }

    #[test]
    fn test_declared_too_long() {
        let data = [0x00, 0x00, 0x00, 0x00, 0x09, 0x08, 0x96, 0x01];
        assert_eq!(strip_frame_header(&data), &data[..]);
    }

    #[test]
    fn test_short_and_empty_input() {
        assert!(strip_frame_header(&[]).is_empty());
        let short = [0x00, 0x00, 0x00];
        assert_eq!(strip_frame_header(&short), &short[..]);
    }

    #[test]
    fn test_empty_framed_message() {
        let data = [0x00, 0x00, 0x00, 0x00, 0x00];
        assert!(strip_frame_header(&data).is_empty());
    }
}
