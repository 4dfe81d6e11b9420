//! Text span types for source location tracking.
//!
//! Syntax nodes, bound nodes and diagnostics all point back into the source
//! through a [`TextSpan`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// A position in source text, measured as a byte offset from the start.
pub type TextPos = u32;

/// A span in source text, defined by a start position and a length.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TextSpan {
    /// The byte offset where this span starts.
    pub start: TextPos,
    /// The length of this span in bytes.
    #[serde(default)]
    pub length: TextPos,
}

impl TextSpan {
    /// Create a new text span.
    #[inline]
    pub fn new(start: TextPos, length: TextPos) -> Self {
        Self { start, length }
    }

    /// The end position of this span (exclusive).
    #[inline]
    pub fn end(&self) -> TextPos {
        self.start + self.length
    }

    /// Convert to a byte range, e.g. for slicing the source text.
    #[inline]
    pub fn to_range(&self) -> Range<usize> {
        self.start as usize..self.end() as usize
    }

    /// The smallest span covering both `self` and `other`.
    #[inline]
    pub fn union(&self, other: &TextSpan) -> TextSpan {
        let start = self.start.min(other.start);
        let end = self.end().max(other.end());
        TextSpan::new(start, end - start)
    }
}

impl fmt::Debug for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end())
    }
}

impl fmt::Display for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_end_and_range() {
        let span = TextSpan::new(4, 6);
        assert_eq!(span.end(), 10);
        assert_eq!(span.to_range(), 4..10);
        assert_eq!(TextSpan::new(3, 0).to_range(), 3..3);
    }

    #[test]
    fn test_span_deserialize_without_length() {
        let span: TextSpan = serde_json::from_str(r#"{ "start": 7 }"#).unwrap();
        assert_eq!(span, TextSpan::new(7, 0));
    }

    #[test]
    fn test_span_display() {
        assert_eq!(format!("{}", TextSpan::new(1, 2)), "[1, 3)");
        assert_eq!(format!("{:?}", TextSpan::new(1, 2)), "1..3");
    }
}
