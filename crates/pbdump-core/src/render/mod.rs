//! Rendering decoded trees as text.
//!
//! The [`Renderer`] trait is the rendering contract: one method per node
//! kind plus the terminator placed between top-level entries. Nested blocks
//! recurse through [`Chunk::render`], so an implementation decides how the
//! prefix grows with depth.
//!
//! [`ConsoleRenderer`] is the default implementation used by [`try_dump`]
//! and [`dump`].

mod console;

use crate::chunk::{Chunk, IdType};
use crate::decoder::decode_all;
use crate::error::Result;
use tracing::debug;

pub use console::{ConsoleConfig, ConsoleRenderer};

/// Trait for turning decoded nodes into text.
///
/// # Example
///
/// ```
/// use pbdump_core::{Chunk, IdType, Renderer};
///
/// struct Compact;
///
/// impl Renderer for Compact {
///     fn render_varint(&self, _prefix: &str, id: &IdType, value: u64) -> String {
///         format!("{}={}", id.field_number(), value)
///     }
///     fn render_fixed32(&self, _prefix: &str, id: &IdType, value: u32) -> String {
///         format!("{}={}", id.field_number(), value)
///     }
///     fn render_fixed64(&self, _prefix: &str, id: &IdType, value: u64) -> String {
///         format!("{}={}", id.field_number(), value)
///     }
///     fn render_bytes(&self, _prefix: &str, id: &IdType, data: &[u8]) -> String {
///         format!("{}=[{} bytes]", id.field_number(), data.len())
///     }
///     fn render_nested(&self, prefix: &str, id: &IdType, children: &[Chunk]) -> String {
///         let inner: Vec<_> = children.iter().map(|c| c.render(prefix, self)).collect();
///         format!("{}{{{}}}", id.field_number(), inner.join(","))
///     }
/// }
///
/// let text = pbdump_core::try_dump_with(&[0x12, 0x02, 0x08, 0x01], &Compact)?;
/// assert_eq!(text, "2{1=1}\n");
/// # Ok::<(), pbdump_core::Error>(())
/// ```
pub trait Renderer {
    /// Render a varint field
    fn render_varint(&self, prefix: &str, id: &IdType, value: u64) -> String;

    /// Render a 32-bit fixed field
    fn render_fixed32(&self, prefix: &str, id: &IdType, value: u32) -> String;

    /// Render a 64-bit fixed field
    fn render_fixed64(&self, prefix: &str, id: &IdType, value: u64) -> String;

    /// Render a length-delimited field whose payload is opaque
    fn render_bytes(&self, prefix: &str, id: &IdType, data: &[u8]) -> String;

    /// Render a length-delimited field resolved as a nested message.
    ///
    /// Implementations render each child with [`Chunk::render`].
    fn render_nested(&self, prefix: &str, id: &IdType, children: &[Chunk]) -> String;

    /// Terminator appended after each top-level entry
    fn newline(&self) -> &str {
        "\n"
    }
}

impl Chunk {
    /// Render this node, and anything nested below it, with `renderer`
    pub fn render<R: Renderer + ?Sized>(&self, prefix: &str, renderer: &R) -> String {
        match self {
            Chunk::Varint { id, value } => renderer.render_varint(prefix, id, *value),
            Chunk::Fixed32 { id, value } => renderer.render_fixed32(prefix, id, *value),
            Chunk::Fixed64 { id, value } => renderer.render_fixed64(prefix, id, *value),
            Chunk::Struct { id, raw, children } if children.is_empty() => {
                renderer.render_bytes(prefix, id, raw)
            }
            Chunk::Struct { id, children, .. } => renderer.render_nested(prefix, id, children),
        }
    }
}

/// Render already decoded top-level nodes, one entry per node
pub fn render_chunks<R: Renderer + ?Sized>(chunks: &[Chunk], renderer: &R) -> String {
    let mut output = String::new();
    for chunk in chunks {
        output.push_str(&chunk.render("", renderer));
        output.push_str(renderer.newline());
    }
    output
}

/// Decode `data` and render it with `renderer`, failing on any decode error
pub fn try_dump_with<R: Renderer + ?Sized>(data: &[u8], renderer: &R) -> Result<String> {
    let chunks = decode_all(data).into_result()?;
    Ok(render_chunks(&chunks, renderer))
}

/// Decode `data` and render it with the default [`ConsoleRenderer`]
pub fn try_dump(data: &[u8]) -> Result<String> {
    try_dump_with(data, &ConsoleRenderer::new())
}

/// Like [`try_dump`], but returns an empty string when decoding fails
pub fn dump(data: &[u8]) -> String {
    match try_dump(data) {
        Ok(text) => text,
        Err(e) => {
            debug!("Dump failed: {}", e);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, WireError};

    /// Renders `number:value` pairs and `number{...}` blocks on one line
    struct Compact;

    impl Renderer for Compact {
        fn render_varint(&self, prefix: &str, id: &IdType, value: u64) -> String {
            format!("{}{}:{}", prefix, id.field_number(), value)
        }

        fn render_fixed32(&self, prefix: &str, id: &IdType, value: u32) -> String {
            format!("{}{}:f32:{}", prefix, id.field_number(), value)
        }

        fn render_fixed64(&self, prefix: &str, id: &IdType, value: u64) -> String {
            format!("{}{}:f64:{}", prefix, id.field_number(), value)
        }

        fn render_bytes(&self, prefix: &str, id: &IdType, data: &[u8]) -> String {
            format!("{}{}:{}b", prefix, id.field_number(), data.len())
        }

        fn render_nested(&self, prefix: &str, id: &IdType, children: &[Chunk]) -> String {
            let child_prefix = format!("{}>", prefix);
            let inner: Vec<_> = children
                .iter()
                .map(|c| c.render(&child_prefix, self))
                .collect();
            format!("{}{}{{{}}}", prefix, id.field_number(), inner.join(" "))
        }

        fn newline(&self) -> &str {
            ";"
        }
    }

    #[test]
    fn test_custom_renderer() {
        let data = [
            0x08, 0x01, // 1: 1
            0x12, 0x04, 0x08, 0x02, 0x1A, 0x00, // 2 { 1: 2, 3: "" }
            0x25, 0x01, 0x00, 0x00, 0x00, // 4: fixed32 1
        ];
        let text = try_dump_with(&data, &Compact).unwrap();
        assert_eq!(text, "1:1;2{>1:2 >3:0b};4:f32:1;");
    }

    #[test]
    fn test_renderer_as_trait_object() {
        let renderer: &dyn Renderer = &Compact;
        let text = try_dump_with(&[0x09, 0x02, 0, 0, 0, 0, 0, 0, 0], renderer).unwrap();
        assert_eq!(text, "1:f64:2;");
    }

    #[test]
    fn test_render_chunks_keeps_partial_tree() {
        let outcome = decode_all(&[0x08, 0x01, 0x0D]);
        assert!(outcome.error.is_some());
        assert_eq!(render_chunks(&outcome.chunks, &Compact), "1:1;");
    }

    #[test]
    fn test_try_dump_surfaces_error() {
        let err = try_dump(&[0x0D, 0x01, 0x02, 0x03]).unwrap_err();
        assert!(matches!(err, Error::Wire(WireError::TruncatedInput { .. })));
    }

    #[test]
    fn test_dump_swallows_error() {
        assert_eq!(dump(&[0x08]), "");
        assert_eq!(dump(&[0xFF; 17]), "");
    }

    #[test]
    fn test_dump_default_renderer() {
        assert_eq!(dump(&[0x08, 0x96, 0x01]), "1: 150\n");
        assert_eq!(dump(&[0x12, 0x02, 0x08, 0x01]), "2 {\n  1: 1\n}\n");
    }

    #[test]
    fn test_empty_input_renders_nothing() {
        assert_eq!(try_dump(&[]).unwrap(), "");
    }
}
