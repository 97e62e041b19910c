//! Schema-less wire format decoding.
//!
//! ## Algorithm Overview
//!
//! 1. Strip an optional gRPC frame header from the input
//! 2. Decode fields one after another until the buffer is exhausted
//! 3. For every length-delimited field, try to decode its payload the same way;
//!    if that consumes the payload exactly and without error the field is a
//!    nested message, otherwise the payload is kept as opaque bytes
//!
//! Step 3 is a heuristic. Strings and blobs that happen to be valid field
//! sequences are reported as nested messages.
//!
//! Decoding stops at the first malformed field of a buffer level. The fields
//! decoded before it are returned alongside the error in a [`DecodeOutcome`].

mod framing;
mod wire;

use crate::chunk::{Chunk, IdType};
use crate::error::{Error, Result, WireError, WireResult};
use bytes::Bytes;
use tracing::{debug, trace};

pub use framing::{strip_frame_header, FRAME_HEADER_LEN};
pub use wire::{decode_varint, WireType, MAX_FIELD_NUMBER, MAX_VARINT_LEN};

use wire::{read_fixed32, read_fixed64};

/// Configuration for the decoder
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Remove a leading gRPC frame header before decoding
    pub strip_framing: bool,
    /// Number of nested levels resolved below the top level; deeper
    /// length-delimited payloads are kept opaque
    pub max_depth: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            strip_framing: true,
            max_depth: 64,
        }
    }
}

impl DecoderConfig {
    /// Creates a new decoder config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether a frame header is stripped
    pub fn strip_framing(mut self, strip: bool) -> Self {
        self.strip_framing = strip;
        self
    }

    /// Sets the nesting ceiling
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

/// Fields decoded from one buffer level, plus the error that stopped
/// decoding early, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeOutcome {
    /// Fields in byte order
    pub chunks: Vec<Chunk>,
    /// Why decoding stopped before the end of the buffer
    pub error: Option<WireError>,
}

impl DecodeOutcome {
    /// True when the whole buffer was consumed without error
    pub fn is_clean(&self) -> bool {
        self.error.is_none()
    }

    /// Splits into the decoded fields and the error
    pub fn into_parts(self) -> (Vec<Chunk>, Option<WireError>) {
        (self.chunks, self.error)
    }

    /// Converts into a `Result`, discarding partial fields on error
    pub fn into_result(self) -> Result<Vec<Chunk>> {
        match self.error {
            None => Ok(self.chunks),
            Some(e) => Err(e.into()),
        }
    }
}

/// Schema-less protobuf decoder
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    /// Creates a new decoder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new decoder with custom configuration
    pub fn with_config(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// Returns the active configuration
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode a complete payload, copying it once into shared storage
    pub fn decode(&self, data: &[u8]) -> DecodeOutcome {
        self.decode_bytes(Bytes::copy_from_slice(data))
    }

    /// Decode a complete payload without copying it.
    ///
    /// Error offsets count from the start of `data`, frame header included.
    pub fn decode_bytes(&self, data: Bytes) -> DecodeOutcome {
        let skip = if self.config.strip_framing {
            data.len() - strip_frame_header(&data).len()
        } else {
            0
        };
        let body = data.slice(skip..);

        debug!("Decoding {} bytes", body.len());
        let mut outcome = self.decode_level(&body, 0);
        outcome.error = outcome.error.map(|e| e.at(skip));

        match &outcome.error {
            None => debug!("Decoded {} top-level fields", outcome.chunks.len()),
            Some(e) => debug!(
                "Decoding stopped after {} top-level fields: {}",
                outcome.chunks.len(),
                e
            ),
        }
        outcome
    }

    /// Decode `data` as a field sequence, without framing removal
    pub fn decode_sequence(&self, data: &Bytes) -> DecodeOutcome {
        self.decode_level(data, 0)
    }

    /// Decode the single field starting at `start`.
    ///
    /// Returns the node and the number of bytes it occupied, tag included.
    /// Error offsets are relative to the start of `data`; a `start` at or
    /// past the end is reported as a malformed tag.
    pub fn decode_field(&self, data: &Bytes, start: usize) -> WireResult<(Chunk, usize)> {
        if start > data.len() {
            return Err(WireError::malformed_varint(start));
        }
        self.decode_field_at(data, start, 0)
    }

    fn decode_level(&self, data: &Bytes, depth: usize) -> DecodeOutcome {
        let mut chunks = Vec::new();
        let mut position = 0;

        while position < data.len() {
            match self.decode_field_at(data, position, depth) {
                Ok((chunk, length)) => {
                    chunks.push(chunk);
                    position += length;
                }
                Err(e) => {
                    return DecodeOutcome {
                        chunks,
                        error: Some(e),
                    };
                }
            }
        }

        DecodeOutcome {
            chunks,
            error: None,
        }
    }

    fn decode_field_at(
        &self,
        data: &Bytes,
        start: usize,
        depth: usize,
    ) -> WireResult<(Chunk, usize)> {
        let (tag, tag_len) = decode_varint(&data[start..]).map_err(|e| e.at(start))?;
        let mut position = start + tag_len;

        if position >= data.len() {
            return Err(WireError::truncated(position, 1, 0));
        }

        let field_number = tag >> 3;
        if field_number == 0 || field_number > u64::from(MAX_FIELD_NUMBER) {
            return Err(WireError::InvalidFieldNumber {
                offset: start,
                number: field_number,
                max: MAX_FIELD_NUMBER,
            });
        }

        let wire_bits = (tag & 0x07) as u8;
        let wire_type = WireType::try_from(wire_bits).map_err(|_| WireError::UnknownWireType {
            offset: start,
            wire_type: wire_bits,
            tag,
        })?;

        let id = IdType::new(field_number as u32, wire_type, data.slice(start..position));

        let chunk = match wire_type {
            WireType::Varint => {
                let (value, value_len) =
                    decode_varint(&data[position..]).map_err(|e| e.at(position))?;
                position += value_len;
                Chunk::Varint { id, value }
            }
            WireType::Fixed64 => {
                let value = read_fixed64(data, position)?;
                position += 8;
                Chunk::Fixed64 { id, value }
            }
            WireType::Fixed32 => {
                let value = read_fixed32(data, position)?;
                position += 4;
                Chunk::Fixed32 { id, value }
            }
            WireType::Bytes | WireType::StartGroup | WireType::EndGroup => {
                let (length, length_len) =
                    decode_varint(&data[position..]).map_err(|e| e.at(position))?;
                position += length_len;

                let available = data.len() - position;
                if length > available as u64 {
                    return Err(WireError::truncated(position, length, available));
                }

                let end = position + length as usize;
                let raw = data.slice(position..end);
                position = end;

                let children = self.resolve_nested(&raw, depth);
                Chunk::Struct { id, raw, children }
            }
        };

        Ok((chunk, position - start))
    }

    /// Try a length-delimited payload as a nested message. Only a clean decode
    /// counts; any failure leaves the payload opaque.
    fn resolve_nested(&self, raw: &Bytes, depth: usize) -> Vec<Chunk> {
        if depth >= self.config.max_depth {
            trace!(depth, len = raw.len(), "nesting ceiling reached, keeping payload opaque");
            return Vec::new();
        }

        let outcome = self.decode_level(raw, depth + 1);
        if outcome.is_clean() {
            outcome.chunks
        } else {
            trace!(len = raw.len(), error = ?outcome.error, "payload is not a message");
            Vec::new()
        }
    }
}

/// Decode a payload with the default configuration
pub fn decode_all(data: &[u8]) -> DecodeOutcome {
    Decoder::new().decode(data)
}

/// Read a file and decode its contents with the default configuration
pub fn decode_file(path: impl AsRef<std::path::Path>) -> Result<DecodeOutcome> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| Error::file_read(path, e))?;
    Ok(Decoder::new().decode_bytes(Bytes::from(data)))
}
