//! # pbdump-core
//!
//! A library for inspecting Protocol Buffer payloads without their schema.
//!
//! This crate provides the core functionality for:
//! - Removing the gRPC length-prefixed message header from captured payloads
//! - Decoding raw protobuf wire format into a tree of fields
//! - Guessing which length-delimited fields are nested messages
//! - Rendering the tree as text through a pluggable [`Renderer`]
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`decoder`]: Framing removal and wire format decoding
//! - [`chunk`]: The decoded field tree
//! - [`render`]: The rendering contract and the console renderer
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```
//! use pbdump_core::{decode_all, try_dump};
//!
//! // Field 2 holding a message whose field 1 is 150
//! let data = [0x12, 0x03, 0x08, 0x96, 0x01];
//!
//! let outcome = decode_all(&data);
//! assert!(outcome.is_clean());
//! assert!(outcome.chunks[0].is_nested());
//!
//! assert_eq!(try_dump(&data)?, "2 {\n  1: 150\n}\n");
//! # Ok::<(), pbdump_core::Error>(())
//! ```
//!
//! ## Extensibility
//!
//! - [`Renderer`]: Customize how decoded fields are turned into text
//! - [`DecoderConfig`]: Control framing removal and the nesting ceiling
//!

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod chunk;
pub mod decoder;
pub mod error;
pub mod render;

// Re-export primary types for convenience
pub use chunk::{encode_chunks, Chunk, ChunkStats, IdType};
pub use decoder::{
    decode_all, decode_file, strip_frame_header, DecodeOutcome, Decoder, DecoderConfig, WireType,
    MAX_FIELD_NUMBER,
};
pub use error::{Error, Result, WireError, WireResult};
pub use render::{
    dump, render_chunks, try_dump, try_dump_with, ConsoleConfig, ConsoleRenderer, Renderer,
};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
