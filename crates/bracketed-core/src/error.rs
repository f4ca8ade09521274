//! Unified error types for template processing.
//!
//! ## Error Hierarchy
//!
//! ```text
//! TemplateError (top-level wrapper)
//! ├── ConfigError   - Invalid delimiter specification
//! ├── ParseError    - Splitter and expression parser errors (with ParseErrorKind)
//! ├── EvalError     - An expression segment failed to evaluate
//! └── InvalidPattern - A delimiter pattern template failed to compile
//! ```
//!
//! Each phase-specific error can be handled directly, or converted into
//! [`TemplateError`] with `?`:
//!
//! ```ignore
//! use bracketed_core::{TemplateError, Value};
//!
//! fn show(source: &str, data: &Value) -> Result<Value, TemplateError> {
//!     let template = bracketed::parse(source)?; // ParseError -> TemplateError
//!     bracketed::render(&template, data)        // EvalError  -> TemplateError
//! }
//! ```

use thiserror::Error;

use crate::Span;

// ============================================================================
// Configuration Errors
// ============================================================================

/// Errors raised while validating a delimiter specification.
///
/// A failed configuration never replaces the active one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The delimiter string is not two tokens separated by a single space, a token is
    /// empty, or a token uses a reserved character.
    #[error("unsupported delimiters \"{spec}\"")]
    Unsupported { spec: String },
}

impl ConfigError {
    /// Create an "unsupported delimiters" error for the given spec.
    pub fn unsupported(spec: impl Into<String>) -> Self {
        ConfigError::Unsupported { spec: spec.into() }
    }

    /// The rejected specification.
    pub fn spec(&self) -> &str {
        match self {
            ConfigError::Unsupported { spec } => spec,
        }
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

/// Categories of parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    // Splitter errors
    /// Input ended while an expression was still open.
    UnterminatedExpression,
    /// Input ended inside a quoted string of an expression.
    UnterminatedString,

    // Expression parser errors
    /// A specific token was expected but not found.
    ExpectedToken,
    /// An unexpected token was encountered.
    UnexpectedToken,
    /// Unexpected end of expression.
    UnexpectedEof,
    /// An expression was expected.
    ExpectedExpression,
    /// An identifier or property name was expected.
    ExpectedIdentifier,
    /// A literal value could not be parsed.
    InvalidLiteral,
    /// Invalid escape sequence in string literal.
    InvalidEscapeSequence,
    /// An unexpected character was encountered.
    UnexpectedChar,
    /// Sub-expressions are nested deeper than the parser accepts.
    NestingTooDeep,
}

impl ParseErrorKind {
    /// Returns a human-readable name for this error kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseErrorKind::UnterminatedExpression => "unterminated expression",
            ParseErrorKind::UnterminatedString => "unterminated string",
            ParseErrorKind::ExpectedToken => "expected token",
            ParseErrorKind::UnexpectedToken => "unexpected token",
            ParseErrorKind::UnexpectedEof => "unexpected end of expression",
            ParseErrorKind::ExpectedExpression => "expected expression",
            ParseErrorKind::ExpectedIdentifier => "expected identifier",
            ParseErrorKind::InvalidLiteral => "invalid literal",
            ParseErrorKind::InvalidEscapeSequence => "invalid escape sequence",
            ParseErrorKind::UnexpectedChar => "unexpected character",
            ParseErrorKind::NestingTooDeep => "expression nested too deeply",
        }
    }

    /// Whether this kind is raised by the template splitter (as opposed to
    /// the expression parser).
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            ParseErrorKind::UnterminatedExpression | ParseErrorKind::UnterminatedString
        )
    }
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A parse error with location and context.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at {span}: {message}")]
pub struct ParseError {
    /// The category of this error.
    pub kind: ParseErrorKind,
    /// The source location where the error occurred.
    pub span: Span,
    /// A detailed error message.
    pub message: String,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(kind: ParseErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    /// Create an "unterminated expression" error for an expression opened by `open`.
    pub fn unterminated_expression(span: Span, open: &str, close: &str) -> Self {
        Self::new(
            ParseErrorKind::UnterminatedExpression,
            span,
            format!("expression opened with `{open}` is never closed by `{close}`"),
        )
    }

    /// Create an "unterminated string" error.
    pub fn unterminated_string(span: Span, quote: char) -> Self {
        Self::new(
            ParseErrorKind::UnterminatedString,
            span,
            format!("missing closing {quote} in expression"),
        )
    }

    /// Create a "nesting too deep" error at the token that went over `limit`.
    pub fn nesting_too_deep(span: Span, limit: usize) -> Self {
        Self::new(
            ParseErrorKind::NestingTooDeep,
            span,
            format!("more than {limit} nested sub-expressions"),
        )
    }

    /// Create an "expected token" error.
    pub fn expected_token(span: Span, expected: &str, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedToken,
            span,
            format!("expected {expected}, found {found}"),
        )
    }

    /// Create an "unexpected token" error.
    pub fn unexpected_token(span: Span, token: &str) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedToken,
            span,
            format!("unexpected token: {token}"),
        )
    }

    /// Create an "unexpected EOF" error.
    pub fn unexpected_eof(span: Span) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedEof,
            span,
            "unexpected end of expression".to_string(),
        )
    }

    /// Create an "expected expression" error.
    pub fn expected_expression(span: Span, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedExpression,
            span,
            format!("expected expression, found {found}"),
        )
    }

    /// Create an "expected identifier" error.
    pub fn expected_identifier(span: Span, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedIdentifier,
            span,
            format!("expected identifier, found {found}"),
        )
    }

    /// Format the error with source context for display.
    ///
    /// This provides a rich error message with the relevant source line
    /// and a caret pointing to the error location.
    pub fn display_with_source(&self, source: &str) -> String {
        let mut output = String::new();

        let line = self.span.line;
        let column = self.span.col;

        output.push_str(&format!("Error at {}:{}: {}\n", line, column, self.kind));

        if !self.message.is_empty() {
            output.push_str(&format!("  {}\n", self.message));
        }

        if let Some(line_text) = Self::get_line(source, line) {
            output.push_str("  |\n");
            output.push_str(&format!("{:>3} | {}\n", line, line_text));

            let indent = " ".repeat(column.saturating_sub(1) as usize);
            let pointer = if self.span.len <= 1 {
                "^".to_string()
            } else {
                "^".to_string() + &"~".repeat((self.span.len - 1) as usize)
            };
            output.push_str(&format!("  | {}{}\n", indent, pointer));
        }

        output
    }

    /// Get the text of a specific line (1-indexed).
    fn get_line(source: &str, line_num: u32) -> Option<&str> {
        source.lines().nth((line_num as usize).checked_sub(1)?)
    }
}

// ============================================================================
// Evaluation Errors
// ============================================================================

/// An expression segment that the evaluator rejected.
///
/// Rendering is fail-fast: the first failing segment aborts the render and
/// is reported here.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("failed to evaluate expression #{segment} `{expression}` at {span}: {message}")]
pub struct EvalError {
    /// Index of the failing segment in the compiled template.
    pub segment: usize,
    /// Location of the failure in the template source.
    pub span: Span,
    /// Source text of the expression.
    pub expression: String,
    /// Reason reported by the evaluator.
    pub message: String,
}

impl EvalError {
    /// Create a new evaluation error.
    pub fn new(
        segment: usize,
        span: Span,
        expression: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            segment,
            span,
            expression: expression.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Top-level error type for all template operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TemplateError {
    /// Invalid delimiter configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The template or one of its expressions could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// An expression failed to evaluate.
    #[error(transparent)]
    Eval(#[from] EvalError),

    /// A delimiter pattern template did not compile.
    #[error("invalid pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },
}

impl TemplateError {
    /// Check if this is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, TemplateError::Config(_))
    }

    /// Check if this is a parse error.
    pub fn is_parse(&self) -> bool {
        matches!(self, TemplateError::Parse(_))
    }

    /// Check if this is an evaluation error.
    pub fn is_eval(&self) -> bool {
        matches!(self, TemplateError::Eval(_))
    }

    /// Get the span of the error, if it carries one.
    pub fn span(&self) -> Option<Span> {
        match self {
            TemplateError::Parse(e) => Some(e.span),
            TemplateError::Eval(e) => Some(e.span),
            TemplateError::Config(_) | TemplateError::InvalidPattern { .. } => None,
        }
    }

    /// Create an "invalid pattern" error from a failed regex compilation.
    pub fn invalid_pattern(pattern: impl Into<String>, error: &regex::Error) -> Self {
        TemplateError::InvalidPattern {
            pattern: pattern.into(),
            message: error.to_string(),
        }
    }
}

/// Result alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;
