//! Source location tracking for template diagnostics.
//!
//! Provides [`Span`] to track where segments, expressions and errors occur
//! in a template.

use std::fmt;

/// A span of template source, represented by its starting position.
///
/// Positions are reported as `line:column` like compiler diagnostics, with
/// the byte length kept for caret rendering.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, byte-based).
    pub col: u32,
    /// Length in bytes.
    pub len: u32,
}

impl Span {
    /// Create a new span from a line, column, and length.
    #[inline]
    pub fn new(line: u32, col: u32, len: u32) -> Self {
        Self { line, col, len }
    }

    /// Create a zero-length span at a position.
    #[inline]
    pub fn point(line: u32, col: u32) -> Self {
        Self { line, col, len: 0 }
    }

    /// Shift a span that is relative to an expression body so that it is
    /// relative to the template the expression was extracted from.
    ///
    /// `self` must be the span of the expression body inside the template;
    /// `inner` is a span computed against the body alone.
    pub fn offset_by(self, inner: Span) -> Span {
        if inner.line <= 1 {
            Span::new(self.line, self.col + inner.col.saturating_sub(1), inner.len)
        } else {
            Span::new(self.line + inner.line - 1, inner.col, inner.len)
        }
    }

    /// The span from the start of `self` through the end of `end`.
    ///
    /// Only a same-line `end` widens the span; carets never cross lines.
    #[inline]
    pub fn to(self, end: Span) -> Span {
        if end.line != self.line || end.col < self.col {
            return self;
        }
        let len = (end.col + end.len - self.col).max(self.len);
        Span::new(self.line, self.col, len)
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}
