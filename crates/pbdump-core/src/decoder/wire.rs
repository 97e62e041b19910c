//! Low-level protobuf wire format primitives.
//!
//! ## Wire Format Overview
//!
//! Each protobuf field is encoded as:
//! - A varint "tag" containing `(field_number << 3) | wire_type`
//! - The field data (format depends on wire type)
//!
//! Wire types:
//! - 0: VARINT (int32, int64, uint32, uint64, sint32, sint64, bool, enum)
//! - 1: I64 (fixed64, sfixed64, double)
//! - 2: LEN (string, bytes, embedded messages, packed repeated fields)
//! - 3/4: SGROUP/EGROUP (deprecated, laid out like LEN by this decoder)
//! - 5: I32 (fixed32, sfixed32, float)

use crate::error::{WireError, WireResult};

/// Protobuf wire types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    /// Variable-length integer
    Varint = 0,
    /// 64-bit fixed-width
    Fixed64 = 1,
    /// Length-delimited (strings, bytes, embedded messages)
    Bytes = 2,
    /// Start group (deprecated)
    StartGroup = 3,
    /// End group (deprecated)
    EndGroup = 4,
    /// 32-bit fixed-width
    Fixed32 = 5,
}

impl WireType {
    /// Returns a short lowercase name for display
    pub fn as_str(&self) -> &'static str {
        match self {
            WireType::Varint => "varint",
            WireType::Fixed64 => "fixed64",
            WireType::Bytes => "bytes",
            WireType::StartGroup => "group-start",
            WireType::EndGroup => "group-end",
            WireType::Fixed32 => "fixed32",
        }
    }

    /// True for the wire types that carry a length-prefixed payload
    pub fn is_length_delimited(&self) -> bool {
        matches!(
            self,
            WireType::Bytes | WireType::StartGroup | WireType::EndGroup
        )
    }
}

impl TryFrom<u8> for WireType {
    type Error = WireError;

    fn try_from(value: u8) -> WireResult<Self> {
        match value {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::Fixed64),
            2 => Ok(WireType::Bytes),
            3 => Ok(WireType::StartGroup),
            4 => Ok(WireType::EndGroup),
            5 => Ok(WireType::Fixed32),
            _ => Err(WireError::UnknownWireType {
                offset: 0,
                wire_type: value,
                tag: u64::from(value),
            }),
        }
    }
}

impl std::fmt::Display for WireType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maximum valid protobuf field number (2^29 - 1)
pub const MAX_FIELD_NUMBER: u32 = 536_870_911;

/// Longest varint accepted; a u64 never needs more than 10 groups of 7 bits
pub const MAX_VARINT_LEN: usize = 10;

/// Decode a varint from the start of the given bytes.
///
/// Returns the decoded value and the number of bytes consumed. Fails with
/// [`WireError::MalformedVarint`] on empty input and on runs of continuation bytes
/// longer than [`MAX_VARINT_LEN`]. Bits beyond the 64th are dropped.
pub fn decode_varint(data: &[u8]) -> WireResult<(u64, usize)> {
    let mut result: u64 = 0;
    let mut shift = 0;

    for (i, &byte) in data.iter().enumerate() {
        if i >= MAX_VARINT_LEN {
            return Err(WireError::malformed_varint(0));
        }

        result |= ((byte & 0x7F) as u64) << shift;
        shift += 7;

        if byte & 0x80 == 0 {
            return Ok((result, i + 1));
        }
    }

    Err(WireError::malformed_varint(0))
}

/// Read a little-endian `u32` at `pos`, or report how short the buffer is
pub(crate) fn read_fixed32(data: &[u8], pos: usize) -> WireResult<u32> {
    let bytes = data
        .get(pos..pos + 4)
        .ok_or_else(|| WireError::truncated(pos, 4, data.len().saturating_sub(pos)))?;
    let mut raw = [0u8; 4];
    raw.copy_from_slice(bytes);
    Ok(u32::from_le_bytes(raw))
}

/// Read a little-endian `u64` at `pos`, or report how short the buffer is
pub(crate) fn read_fixed64(data: &[u8], pos: usize) -> WireResult<u64> {
    let bytes = data
        .get(pos..pos + 8)
        .ok_or_else(|| WireError::truncated(pos, 8, data.len().saturating_sub(pos)))?;
    let mut raw = [0u8; 8];
    raw.copy_from_slice(bytes);
    Ok(u64::from_le_bytes(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_varint_single_byte() {
        let data = [0x08];
        let (value, len) = decode_varint(&data).unwrap();
        assert_eq!(value, 8);
        assert_eq!(len, 1);
    }

    #[test]
    fn test_decode_varint_multi_byte() {
        let data = [0xAC, 0x02]; // 300
        let (value, len) = decode_varint(&data).unwrap();
        assert_eq!(value, 300);
        assert_eq!(len, 2);
    }

    #[test]
    fn test_decode_varint_max() {
        let data = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01];
        let (value, len) = decode_varint(&data).unwrap();
        assert_eq!(value, u64::MAX);
        assert_eq!(len, 10);
    }

    #[test]
    fn test_decode_varint_stops_at_terminator() {
        let data = [0x96, 0x01, 0xFF, 0xFF];
        assert_eq!(decode_varint(&data).unwrap(), (150, 2));
    }

    #[test]
    fn test_decode_varint_failures() {
        assert!(matches!(
            decode_varint(&[]),
            Err(WireError::MalformedVarint { .. })
        ));
        assert!(matches!(
            decode_varint(&[0x80, 0x80]),
            Err(WireError::MalformedVarint { .. })
        ));
        assert!(matches!(
            decode_varint(&[0xFF; 17]),
            Err(WireError::MalformedVarint { .. })
        ));
    }

    #[test]
    fn test_wire_type_conversion() {
        assert_eq!(WireType::try_from(0).unwrap(), WireType::Varint);
        assert_eq!(WireType::try_from(1).unwrap(), WireType::Fixed64);
        assert_eq!(WireType::try_from(2).unwrap(), WireType::Bytes);
        assert_eq!(WireType::try_from(3).unwrap(), WireType::StartGroup);
        assert_eq!(WireType::try_from(4).unwrap(), WireType::EndGroup);
        assert_eq!(WireType::try_from(5).unwrap(), WireType::Fixed32);
        assert!(WireType::try_from(6).is_err());
        assert!(WireType::try_from(7).is_err());
    }

    #[test]
    fn test_fixed_reads() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        assert_eq!(read_fixed32(&data, 0).unwrap(), 0x0403_0201);
        assert_eq!(read_fixed64(&data, 0).unwrap(), 0x0807_0605_0403_0201);
        assert_eq!(
            read_fixed32(&data, 6),
            Err(WireError::truncated(6, 4, 2))
        );
        assert_eq!(
            read_fixed64(&data, 1),
            Err(WireError::truncated(1, 8, 7))
        );
    }
}
