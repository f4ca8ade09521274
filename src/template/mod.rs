//! Compiled templates, their cache and rendering.

mod cache;
mod loops;
mod render;

pub use cache::TemplateCache;
pub use loops::{LOOP_TEMPLATE, LoopKeys, loop_keys};
pub use render::{ErrorObserver, Renderer};

use bracketed_core::ParseError;
use bracketed_parser::{Delimiters, Segment, Splitter};

/// A template split into segments, ready to render any number of times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
    version: u64,
}

impl Template {
    /// Split `source` with `delimiters`.
    pub fn compile(source: &str, delimiters: &Delimiters) -> Result<Self, ParseError> {
        let segments = Splitter::new(delimiters).segments(source)?;
        Ok(Self {
            source: source.to_string(),
            segments,
            version: delimiters.version(),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Alternating literal and expression segments, starting and ending with
    /// a literal.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Version of the delimiters this template was split with.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Exactly one expression with nothing around it.
    ///
    /// Such templates render to the raw expression value instead of text.
    pub fn is_sole_expression(&self) -> bool {
        match self.segments.as_slice() {
            [before, expr, after] => {
                expr.is_expression() && before.text.is_empty() && after.text.is_empty()
            }
            _ => false,
        }
    }

    pub fn has_expressions(&self) -> bool {
        self.segments.len() > 1
    }

    /// The expression sources in order.
    pub fn expressions(&self) -> impl Iterator<Item = &str> {
        self.segments
            .iter()
            .filter(|s| s.is_expression())
            .map(|s| s.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(source: &str) -> Template {
        Template::compile(source, &Delimiters::default()).unwrap()
    }

    #[test]
    fn sole_expression() {
        assert!(compile("{ x }").is_sole_expression());
        assert!(!compile(" { x }").is_sole_expression());
        assert!(!compile("{ x }{ y }").is_sole_expression());
        assert!(!compile("text").is_sole_expression());
    }

    #[test]
    fn expressions_in_order() {
        let template = compile("a{ x }b{y}c");
        assert!(template.has_expressions());
        assert_eq!(template.expressions().collect::<Vec<_>>(), [" x ", "y"]);
        assert_eq!(template.segments().len(), 5);
    }

    #[test]
    fn literal_only() {
        let template = compile("plain \\{ text");
        assert!(!template.has_expressions());
        assert_eq!(template.segments()[0].text, "plain { text");
    }

    #[test]
    fn unterminated_expression_fails() {
        assert!(Template::compile("a{ b", &Delimiters::default()).is_err());
    }
}
