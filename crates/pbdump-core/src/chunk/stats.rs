//! Tree statistics.

use super::Chunk;
use std::fmt;

/// Counts of node kinds in a decoded tree
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChunkStats {
    /// Number of varint nodes
    pub varint_count: usize,
    /// Number of fixed32 nodes
    pub fixed32_count: usize,
    /// Number of fixed64 nodes
    pub fixed64_count: usize,
    /// Number of length-delimited nodes resolved as nested messages
    pub nested_count: usize,
    /// Number of length-delimited nodes kept opaque
    pub opaque_count: usize,
    /// Deepest nesting level, top-level nodes being level 1
    pub max_depth: usize,
}

impl ChunkStats {
    /// Walk `chunks` and everything below them
    pub fn collect(chunks: &[Chunk]) -> Self {
        let mut stats = Self::default();
        stats.visit(chunks, 1);
        stats
    }

    /// Total number of nodes
    pub fn total(&self) -> usize {
        self.varint_count
            + self.fixed32_count
            + self.fixed64_count
            + self.nested_count
            + self.opaque_count
    }

    fn visit(&mut self, chunks: &[Chunk], depth: usize) {
        if !chunks.is_empty() {
            self.max_depth = self.max_depth.max(depth);
        }

        for chunk in chunks {
            match chunk {
                Chunk::Varint { .. } => self.varint_count += 1,
                Chunk::Fixed32 { .. } => self.fixed32_count += 1,
                Chunk::Fixed64 { .. } => self.fixed64_count += 1,
                Chunk::Struct { children, .. } if children.is_empty() => self.opaque_count += 1,
                Chunk::Struct { children, .. } => {
                    self.nested_count += 1;
                    self.visit(children, depth + 1);
                }
            }
        }
    }
}

impl fmt::Display for ChunkStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "fields:  {}", self.total())?;
        writeln!(f, "varint:  {}", self.varint_count)?;
        writeln!(f, "fixed32: {}", self.fixed32_count)?;
        writeln!(f, "fixed64: {}", self.fixed64_count)?;
        writeln!(f, "nested:  {}", self.nested_count)?;
        writeln!(f, "opaque:  {}", self.opaque_count)?;
        write!(f, "depth:   {}", self.max_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::IdType;
    use crate::decoder::WireType;
    use bytes::Bytes;

    fn varint(number: u32) -> Chunk {
        Chunk::Varint {
            id: IdType::new(number, WireType::Varint, Bytes::new()),
            value: 0,
        }
    }

    fn nested(number: u32, children: Vec<Chunk>) -> Chunk {
        Chunk::Struct {
            id: IdType::new(number, WireType::Bytes, Bytes::new()),
            raw: Bytes::from_static(b"x"),
            children,
        }
    }

    #[test]
    fn test_empty() {
        let stats = ChunkStats::collect(&[]);
        assert_eq!(stats, ChunkStats::default());
        assert_eq!(stats.total(), 0);
    }

    #[test]
    fn test_counts_and_depth() {
        let tree = vec![
            varint(1),
            nested(2, vec![varint(1), nested(2, vec![varint(3)])]),
            nested(3, Vec::new()),
        ];
        let stats = ChunkStats::collect(&tree);

        assert_eq!(stats.varint_count, 3);
        assert_eq!(stats.nested_count, 2);
        assert_eq!(stats.opaque_count, 1);
        assert_eq!(stats.total(), 6);
        assert_eq!(stats.max_depth, 3);
    }

    #[test]
    fn test_display() {
        let stats = ChunkStats::collect(&[varint(1)]);
        let text = stats.to_string();
        assert!(text.contains("fields:  1"));
        assert!(text.contains("depth:   1"));
    }
}
