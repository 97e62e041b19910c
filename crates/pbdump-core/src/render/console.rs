//! Plain-text renderer for terminals.

use super::Renderer;
use crate::chunk::{Chunk, IdType};
use std::fmt::Write as FmtWrite;

/// Configuration for [`ConsoleRenderer`]
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Indentation added per nesting level (default: 2 spaces)
    pub indent_str: String,
    /// Append the wire type to every line
    pub show_wire_type: bool,
    /// Maximum payload characters or bytes shown for opaque fields (0 = unlimited)
    pub max_preview: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            indent_str: "  ".to_string(),
            show_wire_type: false,
            max_preview: 0,
        }
    }
}

impl ConsoleConfig {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the indentation string
    pub fn indent_str(mut self, s: impl Into<String>) -> Self {
        self.indent_str = s.into();
        self
    }

    /// Sets whether wire types are shown
    pub fn show_wire_type(mut self, show: bool) -> Self {
        self.show_wire_type = show;
        self
    }

    /// Sets the opaque payload preview limit
    pub fn max_preview(mut self, max: usize) -> Self {
        self.max_preview = max;
        self
    }
}

/// Renders one field per line, nested messages as indented blocks:
///
/// ```text
/// 1: 150
/// 2 {
///   1: "hello"
///   2: 0x3f800000 (i32=1065353216, f32=1)
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConsoleRenderer {
    config: ConsoleConfig,
}

impl ConsoleRenderer {
    /// Creates a renderer with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a renderer with custom configuration
    pub fn with_config(config: ConsoleConfig) -> Self {
        Self { config }
    }

    fn wire_suffix(&self, id: &IdType) -> String {
        if self.config.show_wire_type {
            format!(" [{}]", id.wire_type())
        } else {
            String::new()
        }
    }

    fn preview(&self, data: &[u8]) -> String {
        let limit = self.config.max_preview;

        if data.is_empty() {
            return "\"\"".to_string();
        }

        match std::str::from_utf8(data) {
            Ok(s) if is_printable(s) => {
                if limit > 0 && s.chars().count() > limit {
                    let head: String = s.chars().take(limit).collect();
                    format!("\"{}\"...", escape_string(&head))
                } else {
                    format!("\"{}\"", escape_string(s))
                }
            }
            _ => {
                let shown = if limit > 0 && data.len() > limit {
                    &data[..limit]
                } else {
                    data
                };
                let mut hex = String::with_capacity(shown.len() * 3);
                for (i, byte) in shown.iter().enumerate() {
                    if i > 0 {
                        hex.push(' ');
                    }
                    let _ = write!(hex, "{:02x}", byte);
                }
                if shown.len() < data.len() {
                    hex.push_str(" ...");
                }
                format!("<{}>", hex)
            }
        }
    }
}

impl Renderer for ConsoleRenderer {
    fn render_varint(&self, prefix: &str, id: &IdType, value: u64) -> String {
        format!(
            "{}{}: {}{}",
            prefix,
            id.field_number(),
            value,
            self.wire_suffix(id)
        )
    }

    fn render_fixed32(&self, prefix: &str, id: &IdType, value: u32) -> String {
        format!(
            "{}{}: {:#010x} (i32={}, f32={}){}",
            prefix,
            id.field_number(),
            value,
            value as i32,
            f32::from_bits(value),
            self.wire_suffix(id)
        )
    }

    fn render_fixed64(&self, prefix: &str, id: &IdType, value: u64) -> String {
        format!(
            "{}{}: {:#018x} (i64={}, f64={}){}",
            prefix,
            id.field_number(),
            value,
            value as i64,
            f64::from_bits(value),
            self.wire_suffix(id)
        )
    }

    fn render_bytes(&self, prefix: &str, id: &IdType, data: &[u8]) -> String {
        format!(
            "{}{}: {}{}",
            prefix,
            id.field_number(),
            self.preview(data),
            self.wire_suffix(id)
        )
    }

    fn render_nested(&self, prefix: &str, id: &IdType, children: &[Chunk]) -> String {
        let child_prefix = format!("{}{}", prefix, self.config.indent_str);

        let mut output = format!("{}{}{} {{\n", prefix, id.field_number(), self.wire_suffix(id));
        for child in children {
            output.push_str(&child.render(&child_prefix, self));
            output.push('\n');
        }
        output.push_str(prefix);
        output.push('}');
        output
    }
}

/// Text counts as printable when it has no control characters besides
/// common whitespace
fn is_printable(s: &str) -> bool {
    s.chars()
        .all(|c| !c.is_control() || c == '\n' || c == '\r' || c == '\t')
}

/// Escape a string for display inside double quotes
fn escape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            _ if c.is_ascii_control() => {
                let _ = write!(result, "\\x{:02x}", c as u8);
            }
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{render_chunks, try_dump_with};
    use crate::decoder::decode_all;
    use pretty_assertions::assert_eq;

    fn render(data: &[u8], renderer: &ConsoleRenderer) -> String {
        try_dump_with(data, renderer).unwrap()
    }

    #[test]
    fn test_escape_string() {
        assert_eq!(escape_string("hello"), "hello");
        assert_eq!(escape_string("hello\\world"), "hello\\\\world");
        assert_eq!(escape_string("hello\"world"), "hello\\\"world");
        assert_eq!(escape_string("hello\nworld"), "hello\\nworld");
    }

    #[test]
    fn test_is_printable() {
        assert!(is_printable("plain text\twith tab"));
        assert!(!is_printable("bell\u{7}"));
    }

    #[test]
    fn test_varint_line() {
        assert_eq!(render(&[0x08, 0x96, 0x01], &ConsoleRenderer::new()), "1: 150\n");
    }

    #[test]
    fn test_string_and_binary_payloads() {
        let renderer = ConsoleRenderer::new();
        assert_eq!(render(&[0x1A, 0x03, b'a', b'b', b'c'], &renderer), "3: \"abc\"\n");
        assert_eq!(render(&[0x1A, 0x02, 0xFF, 0xFE], &renderer), "3: <ff fe>\n");
        assert_eq!(render(&[0x1A, 0x00], &renderer), "3: \"\"\n");
    }

    #[test]
    fn test_fixed_lines() {
        let renderer = ConsoleRenderer::new();
        assert_eq!(
            render(&[0x0D, 0x00, 0x00, 0x80, 0x3F], &renderer),
            "1: 0x3f800000 (i32=1065353216, f32=1)\n"
        );
        assert_eq!(
            render(
                &[0x11, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xF0, 0x3F],
                &renderer
            ),
            "2: 0x3ff0000000000000 (i64=4607182418800017408, f64=1)\n"
        );
        assert_eq!(
            render(&[0x0D, 0xFF, 0xFF, 0xFF, 0xFF], &renderer),
            "1: 0xffffffff (i32=-1, f32=NaN)\n"
        );
    }

    #[test]
    fn test_nested_block() {
        let data = [
            0x08, 0x01, // 1: 1
            0x12, 0x07, // 2 {
            0x08, 0x02, //   1: 2
            0x12, 0x03, //   2 {
            0x08, 0x96, 0x01, // 1: 150
            0x18, 0x03, // 3: 3
        ];
        let expected = "1: 1\n2 {\n  1: 2\n  2 {\n    1: 150\n  }\n}\n3: 3\n";
        assert_eq!(render(&data, &ConsoleRenderer::new()), expected);
    }

    #[test]
    fn test_custom_indent_and_wire_types() {
        let config = ConsoleConfig::new().indent_str("\t").show_wire_type(true);
        let renderer = ConsoleRenderer::with_config(config);
        assert_eq!(
            render(&[0x12, 0x02, 0x08, 0x01], &renderer),
            "2 [bytes] {\n\t1: 1 [varint]\n}\n"
        );
        assert_eq!(
            render(&[0x0B, 0x02, 0xFF, 0xFE], &renderer),
            "1: <ff fe> [group-start]\n"
        );
    }

    #[test]
    fn test_preview_limit() {
        let renderer = ConsoleRenderer::with_config(ConsoleConfig::new().max_preview(2));
        assert_eq!(render(&[0x1A, 0x03, b'a', b'b', b'c'], &renderer), "3: \"ab\"...\n");
        assert_eq!(
            render(&[0x1A, 0x03, 0xFF, 0xFE, 0xFD], &renderer),
            "3: <ff fe ...>\n"
        );
    }

    #[test]
    fn test_escaped_payload() {
        let data = [0x1A, 0x04, b'a', b'"', b'\n', b'b'];
        let outcome = decode_all(&data);
        assert!(outcome.is_clean());
        assert_eq!(
            render_chunks(&outcome.chunks, &ConsoleRenderer::new()),
            "3: \"a\\\"\\nb\"\n"
        );
    }
}
