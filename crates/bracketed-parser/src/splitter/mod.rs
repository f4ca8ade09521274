//! Delimiter-aware template splitting.
//!
//! The [`Splitter`] walks a template once and cuts it into alternating
//! literal and expression [`Segment`]s. Inside an expression it keeps track of
//! quoted strings, regular expression literals and bracket nesting so that a
//! close token appearing in any of those does not end the expression early.
//!
//! # Example
//!
//! ```ignore
//! use bracketed_parser::{Delimiters, Splitter};
//!
//! let delimiters = Delimiters::default();
//! let parts = Splitter::new(&delimiters).split("a{ \"b{c}d\" }e")?;
//! assert_eq!(parts, ["a", " \"b{c}d\" ", "e"]);
//! ```

mod segment;

pub use segment::{Segment, SegmentKind};

use bracketed_core::{ParseError, Span};

use crate::delimiters::Delimiters;
use crate::lexer::{Cursor, Mark, regex_literal_len};

/// Splits templates using one delimiter configuration.
pub struct Splitter<'d> {
    delimiters: &'d Delimiters,
}

impl<'d> Splitter<'d> {
    pub fn new(delimiters: &'d Delimiters) -> Self {
        Self { delimiters }
    }

    /// The delimiters this splitter recognises.
    pub fn delimiters(&self) -> &'d Delimiters {
        self.delimiters
    }

    /// Split a template into its segment texts.
    ///
    /// The result alternates literal, expression, literal, ... and always
    /// has an odd length.
    pub fn split(&self, template: &str) -> Result<Vec<String>, ParseError> {
        Ok(self
            .segments(template)?
            .into_iter()
            .map(|segment| segment.text)
            .collect())
    }

    /// Split a template into segments with source spans.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn segments(&self, template: &str) -> Result<Vec<Segment>, ParseError> {
        let open = self.delimiters.open();
        let mut cursor = Cursor::new(template);
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut text_mark = cursor.mark();

        while let Some(c) = cursor.peek() {
            if c == '\\' && cursor.rest()[1..].starts_with(open) {
                // escaped open token: keep the token, drop the backslash
                cursor.advance();
                cursor.eat_str(open);
                text.push_str(open);
            } else if cursor.check_str(open) {
                segments.push(Segment::literal(
                    std::mem::take(&mut text),
                    cursor.span_from(text_mark),
                ));
                let open_mark = cursor.mark();
                cursor.eat_str(open);
                segments.push(self.expression(&mut cursor, open_mark)?);
                text_mark = cursor.mark();
            } else {
                cursor.advance();
                text.push(c);
            }
        }

        segments.push(Segment::literal(text, cursor.span_from(text_mark)));
        Ok(segments)
    }

    /// Scan an expression body. The cursor sits just past the open token and
    /// is left just past the matching close token.
    fn expression(&self, cursor: &mut Cursor<'_>, open_mark: Mark) -> Result<Segment, ParseError> {
        let open = self.delimiters.open();
        let close = self.delimiters.close();
        let open_span = Span::new(open_mark.line, open_mark.column, open.len() as u32);
        // bracket-led open tokens nest through the bracket stack instead
        let open_nests = !open.starts_with(['(', '[', '{']);

        let body_mark = cursor.mark();
        let mut body = String::new();
        let mut depth = 1usize;
        let mut pending = Vec::new();

        loop {
            let Some(c) = cursor.peek() else {
                return Err(ParseError::unterminated_expression(open_span, open, close));
            };

            if pending.is_empty() {
                if cursor.check_str(close) {
                    depth -= 1;
                    if depth == 0 {
                        let span = cursor.span_from(body_mark);
                        cursor.eat_str(close);
                        return Ok(Segment::expression(body, span));
                    }
                    cursor.eat_str(close);
                    body.push_str(close);
                    continue;
                }
                if open_nests && cursor.check_str(open) {
                    depth += 1;
                    cursor.eat_str(open);
                    body.push_str(open);
                    continue;
                }
            }

            match c {
                '\'' | '"' => quoted(cursor, &mut body, c, open_span)?,
                '/' => match regex_literal_len(&body, cursor.rest()) {
                    Some(len) => {
                        body.push_str(&cursor.rest()[..len]);
                        cursor.advance_bytes(len);
                    }
                    None => {
                        cursor.advance();
                        body.push('/');
                    }
                },
                '\\' => {
                    cursor.advance();
                    match cursor.peek() {
                        Some(next) if self.delimiters.contains_char(next) => {
                            cursor.advance();
                            body.push(next);
                            balance(&mut pending, next);
                        }
                        _ => body.push('\\'),
                    }
                }
                _ => {
                    cursor.advance();
                    body.push(c);
                    balance(&mut pending, c);
                }
            }
        }
    }
}

/// Copy a quoted string, quotes included. Escapes are kept verbatim so the
/// evaluator sees the original literal.
fn quoted(
    cursor: &mut Cursor<'_>,
    body: &mut String,
    quote: char,
    open_span: Span,
) -> Result<(), ParseError> {
    cursor.advance();
    body.push(quote);
    loop {
        match cursor.advance() {
            None => return Err(ParseError::unterminated_string(open_span, quote)),
            Some('\\') => {
                body.push('\\');
                if let Some(next) = cursor.advance() {
                    body.push(next);
                }
            }
            Some(c) => {
                body.push(c);
                if c == quote {
                    return Ok(());
                }
            }
        }
    }
}

/// Track bracket nesting. Closers that don't match the innermost opener are
/// ignored.
fn balance(pending: &mut Vec<char>, c: char) {
    match c {
        '(' => pending.push(')'),
        '[' => pending.push(']'),
        '{' => pending.push('}'),
        ')' | ']' | '}' if pending.last() == Some(&c) => {
            pending.pop();
        }
        _ => {}
    }
}
