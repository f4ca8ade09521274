use bracketed_core::Span;

/// What a [`Segment`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// Text copied to the output as-is (escapes already resolved).
    Literal,
    /// Expression source found between delimiters, delimiters excluded.
    Expression,
}

/// A piece of a split template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub text: String,
    /// Where the segment sits in the template. For expressions this covers
    /// the text between the delimiters.
    pub span: Span,
}

impl Segment {
    pub fn literal(text: impl Into<String>, span: Span) -> Self {
        Self {
            kind: SegmentKind::Literal,
            text: text.into(),
            span,
        }
    }

    pub fn expression(text: impl Into<String>, span: Span) -> Self {
        Self {
            kind: SegmentKind::Expression,
            text: text.into(),
            span,
        }
    }

    #[inline]
    pub fn is_literal(&self) -> bool {
        self.kind == SegmentKind::Literal
    }

    #[inline]
    pub fn is_expression(&self) -> bool {
        self.kind == SegmentKind::Expression
    }
}
