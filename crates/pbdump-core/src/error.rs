//! Error types for the pbdump-core library.
//!
//! Decoding failures are [`WireError`]s. They carry the byte offset, relative
//! to the buffer level being decoded, at which decoding gave up, and are
//! cheap to clone and compare so they can live inside a
//! [`DecodeOutcome`](crate::DecodeOutcome). [`Error`] wraps them together
//! with the I/O failures of the file helpers.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pbdump operations
pub type Result<T> = std::result::Result<T, Error>;

/// Result type alias for wire decoding steps
pub type WireResult<T> = std::result::Result<T, WireError>;

/// Malformed protobuf wire data
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WireError {
    /// A tag, value or length varint was empty or never terminated
    #[error("malformed varint at offset {offset}")]
    MalformedVarint {
        /// Byte offset where the varint starts
        offset: usize,
    },

    /// A value needs more bytes than the buffer holds
    #[error("truncated input at offset {offset}: need {needed} bytes, have {available}")]
    TruncatedInput {
        /// Byte offset where the value starts
        offset: usize,
        /// Bytes the value requires
        needed: u64,
        /// Bytes left in the buffer
        available: usize,
    },

    /// Field number outside of `1..=536870911`
    #[error("invalid field number {number} at offset {offset}: must be between 1 and {max}")]
    InvalidFieldNumber {
        /// Byte offset of the tag
        offset: usize,
        /// The decoded field number
        number: u64,
        /// Maximum valid field number
        max: u32,
    },

    /// Wire type bits outside the recognized set
    #[error("unknown wire type {wire_type} in tag {tag:#x} at offset {offset}")]
    UnknownWireType {
        /// Byte offset of the tag
        offset: usize,
        /// The offending 3-bit wire type
        wire_type: u8,
        /// The complete tag varint
        tag: u64,
    },
}

impl WireError {
    /// Creates a new malformed varint error
    pub fn malformed_varint(offset: usize) -> Self {
        Self::MalformedVarint { offset }
    }

    /// Creates a new truncated input error
    pub fn truncated(offset: usize, needed: u64, available: usize) -> Self {
        Self::TruncatedInput {
            offset,
            needed,
            available,
        }
    }

    /// Returns the byte offset where decoding failed
    pub fn offset(&self) -> usize {
        match self {
            Self::MalformedVarint { offset }
            | Self::TruncatedInput { offset, .. }
            | Self::InvalidFieldNumber { offset, .. }
            | Self::UnknownWireType { offset, .. } => *offset,
        }
    }

    /// Shifts the offset by `base`
    pub(crate) fn at(mut self, base: usize) -> Self {
        match &mut self {
            Self::MalformedVarint { offset }
            | Self::TruncatedInput { offset, .. }
            | Self::InvalidFieldNumber { offset, .. }
            | Self::UnknownWireType { offset, .. } => *offset += base,
        }
        self
    }
}

/// Error type for all pbdump operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Invalid protobuf wire format
    #[error(transparent)]
    Wire(#[from] WireError),

    /// Failed to read input file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        /// Path to the file that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Creates a new file read error
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Returns the wire error, if this is one
    pub fn as_wire(&self) -> Option<&WireError> {
        match self {
            Self::Wire(e) => Some(e),
            Self::FileRead { .. } => None,
        }
    }

    /// Returns the byte offset for wire format errors
    pub fn offset(&self) -> Option<usize> {
        self.as_wire().map(WireError::offset)
    }

    /// Returns true if this error was raised by the wire decoder
    pub fn is_wire_error(&self) -> bool {
        self.as_wire().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = Error::from(WireError::truncated(3, 4, 3));
        assert!(err.to_string().contains("truncated input"));
        assert!(err.to_string().contains("need 4 bytes, have 3"));
    }

    #[test]
    fn test_offset_shift() {
        let err = WireError::malformed_varint(2).at(10);
        assert_eq!(err, WireError::MalformedVarint { offset: 12 });
        assert_eq!(Error::from(err).offset(), Some(12));
    }

    #[test]
    fn test_is_wire_error() {
        assert!(Error::from(WireError::malformed_varint(0)).is_wire_error());
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = Error::file_read("/tmp/missing.bin", io);
        assert!(!err.is_wire_error());
        assert_eq!(err.offset(), None);
    }

    #[test]
    fn test_file_read_keeps_io_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = Error::file_read("/tmp/missing.bin", io);

        let source = err.source().expect("io error is the source");
        let io = source.downcast_ref::<std::io::Error>().unwrap();
        assert_eq!(io.kind(), std::io::ErrorKind::NotFound);
    }
}
