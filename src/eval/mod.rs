//! Expression evaluation.
//!
//! The renderer never interprets expression text itself; it hands each
//! expression segment to an [`Evaluator`]. [`ExprEvaluator`] is the default,
//! a small interpreter for the JavaScript-like expression language. Any
//! `Fn(&str, &Value) -> Result<Value, EvalFailure>` closure is an evaluator
//! too.

mod builtins;
mod interp;

pub use interp::ExprEvaluator;

use bracketed_core::{ParseError, Span, Value};
use thiserror::Error;

/// Evaluates expression source against a data context.
pub trait Evaluator: Send + Sync {
    /// Evaluate `code` (the text between the delimiters) with `context` as
    /// the data in scope.
    fn evaluate(&self, code: &str, context: &Value) -> Result<Value, EvalFailure>;
}

impl<F> Evaluator for F
where
    F: Fn(&str, &Value) -> Result<Value, EvalFailure> + Send + Sync,
{
    fn evaluate(&self, code: &str, context: &Value) -> Result<Value, EvalFailure> {
        self(code, context)
    }
}

/// Why an evaluator rejected an expression.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct EvalFailure {
    pub message: String,
    /// Location inside the expression text, when known.
    pub span: Option<Span>,
}

impl EvalFailure {
    /// A failure without a location.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span: None,
        }
    }

    /// A failure at a location inside the expression text.
    pub fn at(span: Span, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span: Some(span),
        }
    }
}

impl From<ParseError> for EvalFailure {
    fn from(err: ParseError) -> Self {
        Self::at(err.span, format!("{}: {}", err.kind, err.message))
    }
}
