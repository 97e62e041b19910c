//! The decoded field tree.
//!
//! Every decoded field becomes one [`Chunk`]. Length-delimited fields whose
//! payload itself decodes as a complete field sequence carry that sequence as
//! `children`; all other payloads stay opaque.
//!
//! Payloads are [`Bytes`] views into a single copy of the input, so nested
//! nodes share storage with their parents instead of copying it.

mod stats;

use crate::decoder::WireType;
use bytes::{BufMut, Bytes};
use prost::encoding::{encode_varint, encoded_len_varint};

pub use stats::ChunkStats;

/// Field identity shared by every node: number, wire type and the tag bytes
/// exactly as they appeared in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdType {
    field_number: u32,
    wire_type: WireType,
    raw_key: Bytes,
}

impl IdType {
    /// Creates a field identity from its parts
    pub fn new(field_number: u32, wire_type: WireType, raw_key: Bytes) -> Self {
        Self {
            field_number,
            wire_type,
            raw_key,
        }
    }

    /// The field number, always in `1..=536870911`
    pub fn field_number(&self) -> u32 {
        self.field_number
    }

    /// The wire type taken from the low three tag bits
    pub fn wire_type(&self) -> WireType {
        self.wire_type
    }

    /// The tag varint as encoded in the input
    pub fn raw_key(&self) -> &[u8] {
        &self.raw_key
    }
}

/// One decoded field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    /// Wire type 0
    Varint {
        /// Field identity
        id: IdType,
        /// Decoded value
        value: u64,
    },
    /// Wire type 1, kept as a bit pattern
    Fixed64 {
        /// Field identity
        id: IdType,
        /// Little-endian value
        value: u64,
    },
    /// Wire type 5, kept as a bit pattern
    Fixed32 {
        /// Field identity
        id: IdType,
        /// Little-endian value
        value: u32,
    },
    /// Wire types 2, 3 and 4
    Struct {
        /// Field identity
        id: IdType,
        /// The length-delimited payload
        raw: Bytes,
        /// Fields decoded from `raw`; empty when `raw` is opaque
        children: Vec<Chunk>,
    },
}

impl Chunk {
    /// The field identity of this node
    pub fn id(&self) -> &IdType {
        match self {
            Chunk::Varint { id, .. }
            | Chunk::Fixed64 { id, .. }
            | Chunk::Fixed32 { id, .. }
            | Chunk::Struct { id, .. } => id,
        }
    }

    /// Shorthand for `self.id().field_number()`
    pub fn field_number(&self) -> u32 {
        self.id().field_number()
    }

    /// Shorthand for `self.id().wire_type()`
    pub fn wire_type(&self) -> WireType {
        self.id().wire_type()
    }

    /// True for a length-delimited node whose payload decoded as fields
    pub fn is_nested(&self) -> bool {
        matches!(self, Chunk::Struct { children, .. } if !children.is_empty())
    }

    /// Nested fields, empty for scalars and opaque payloads
    pub fn children(&self) -> &[Chunk] {
        match self {
            Chunk::Struct { children, .. } => children,
            _ => &[],
        }
    }

    /// The length-delimited payload, `None` for scalars
    pub fn raw(&self) -> Option<&Bytes> {
        match self {
            Chunk::Struct { raw, .. } => Some(raw),
            _ => None,
        }
    }

    /// Payload length in bytes, `0` for scalars
    pub fn data_len(&self) -> usize {
        self.raw().map_or(0, Bytes::len)
    }

    /// Number of bytes [`Chunk::encode`] writes for this node.
    ///
    /// Equals the bytes the field occupied in the input whenever the value and
    /// length varints were minimally encoded.
    pub fn encoded_len(&self) -> usize {
        let key_len = self.id().raw_key().len();
        let value_len = match self {
            Chunk::Varint { value, .. } => encoded_len_varint(*value),
            Chunk::Fixed64 { .. } => 8,
            Chunk::Fixed32 { .. } => 4,
            Chunk::Struct { raw, .. } => encoded_len_varint(raw.len() as u64) + raw.len(),
        };
        key_len + value_len
    }

    /// Write this node back in wire format, reusing its original tag bytes
    pub fn encode(&self, buf: &mut impl BufMut) {
        buf.put_slice(self.id().raw_key());
        match self {
            Chunk::Varint { value, .. } => encode_varint(*value, buf),
            Chunk::Fixed64 { value, .. } => buf.put_u64_le(*value),
            Chunk::Fixed32 { value, .. } => buf.put_u32_le(*value),
            Chunk::Struct { raw, .. } => {
                encode_varint(raw.len() as u64, buf);
                buf.put_slice(raw);
            }
        }
    }
}

/// Encode a sequence of nodes back into wire format
pub fn encode_chunks(chunks: &[Chunk]) -> Vec<u8> {
    let len = chunks.iter().map(Chunk::encoded_len).sum();
    let mut buf = Vec::with_capacity(len);
    for chunk in chunks {
        chunk.encode(&mut buf);
    }
    buf
}
