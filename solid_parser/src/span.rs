//! Source locations
//!
//! Every token and CST node carries a [`Span`]; diagnostics in the core report
//! its starting line and column.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A region of source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Byte offset start (0-indexed)
    pub start: usize,
    /// Byte offset end (exclusive)
    pub end: usize,
    /// Line number (1-indexed)
    pub start_line: usize,
    /// Line number (1-indexed)
    pub end_line: usize,
    /// Column (1-indexed, in bytes)
    pub start_column: usize,
    /// Column (1-indexed, in bytes)
    pub end_column: usize,
}

impl Span {
    pub fn new(
        start: usize,
        end: usize,
        start_line: usize,
        end_line: usize,
        start_column: usize,
        end_column: usize,
    ) -> Self {
        Self {
            start,
            end,
            start_line,
            end_line,
            start_column,
            end_column,
        }
    }

    /// A zero-width span at line 1, column 1
    pub fn empty() -> Self {
        Self::new(0, 0, 1, 1, 1, 1)
    }

    /// Line where the span starts
    pub fn line(&self) -> usize {
        self.start_line
    }

    /// Column where the span starts
    pub fn column(&self) -> usize {
        self.start_column
    }

    /// Smallest span covering both `self` and `other`
    pub fn merge(&self, other: &Span) -> Span {
        let first = if self.start <= other.start { self } else { other };
        let tail = if self.end >= other.end { self } else { other };
        Span {
            start: first.start,
            end: tail.end,
            start_line: first.start_line,
            end_line: tail.end_line,
            start_column: first.start_column,
            end_column: tail.end_column,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.start_line, self.start_column)
    }
}

/// Line-start table used to turn byte offsets into line/column pairs
#[derive(Debug, Clone)]
pub struct SourceMap {
    line_starts: Vec<usize>,
}

impl SourceMap {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(memchr::memchr_iter(b'\n', source.as_bytes()).map(|i| i + 1));
        Self { line_starts }
    }

    /// Get line and column (both 1-indexed) for a byte offset
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };
        let line_start = self.line_starts.get(line).copied().unwrap_or(0);
        (line + 1, offset - line_start + 1)
    }

    /// Create a span with line/column information
    pub fn span(&self, start: usize, end: usize) -> Span {
        let (start_line, start_column) = self.line_col(start);
        let (end_line, end_column) = self.line_col(end);
        Span {
            start,
            end,
            start_line,
            end_line,
            start_column,
            end_column,
        }
    }

    /// Number of lines in the mapped source
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_map() {
        let map = SourceMap::new("let x: int = 1;\nx;\n");

        assert_eq!(map.line_col(0), (1, 1));
        assert_eq!(map.line_col(4), (1, 5));
        assert_eq!(map.line_col(16), (2, 1));
        assert_eq!(map.line_count(), 3);
    }

    #[test]
    fn test_span_merge() {
        let left = Span::new(0, 5, 1, 1, 1, 6);
        let right = Span::new(10, 15, 2, 2, 5, 10);
        let merged = right.merge(&left);

        assert_eq!(merged.start, 0);
        assert_eq!(merged.end, 15);
        assert_eq!(merged.start_line, 1);
        assert_eq!(merged.end_line, 2);
        assert_eq!(merged.start_column, 1);
        assert_eq!(merged.end_column, 10);
    }

    #[test]
    fn test_span_display() {
        let span = Span::new(3, 4, 2, 2, 7, 8);
        assert_eq!(span.to_string(), "line 2, column 7");
    }
}
