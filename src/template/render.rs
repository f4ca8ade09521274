use std::fmt;
use std::sync::Arc;

use bracketed_core::{EvalError, TemplateError, Value};
use bracketed_parser::Segment;
use tracing::warn;

use super::Template;
use crate::eval::{EvalFailure, Evaluator};

/// Callback invoked with every evaluation error before it is returned.
pub type ErrorObserver = Arc<dyn Fn(&EvalError) + Send + Sync>;

/// Evaluates compiled templates against a context.
#[derive(Clone)]
pub struct Renderer {
    evaluator: Arc<dyn Evaluator>,
    on_error: Option<ErrorObserver>,
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("on_error", &self.on_error.is_some())
            .finish_non_exhaustive()
    }
}

impl Renderer {
    pub fn new(evaluator: Arc<dyn Evaluator>) -> Self {
        Self {
            evaluator,
            on_error: None,
        }
    }

    /// Install an observer for evaluation errors.
    pub fn on_error(mut self, observer: impl Fn(&EvalError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(observer));
        self
    }

    pub fn evaluator(&self) -> &Arc<dyn Evaluator> {
        &self.evaluator
    }

    /// Render `template` with `context` in scope.
    ///
    /// A template that is a single expression yields that expression's value
    /// unchanged. Anything else yields a string: literal text with each
    /// expression value interpolated, `undefined` and `null` as nothing.
    /// The first failing expression aborts the render.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn render(&self, template: &Template, context: &Value) -> Result<Value, TemplateError> {
        let segments = template.segments();
        if template.is_sole_expression() {
            return self.evaluate(1, &segments[1], context);
        }

        let mut out = String::with_capacity(template.source().len());
        for (index, segment) in segments.iter().enumerate() {
            if segment.is_literal() {
                out.push_str(&segment.text);
            } else {
                let value = self.evaluate(index, segment, context)?;
                out.push_str(&value.to_display_string());
            }
        }
        Ok(Value::String(out))
    }

    fn evaluate(
        &self,
        index: usize,
        segment: &Segment,
        context: &Value,
    ) -> Result<Value, TemplateError> {
        self.evaluator
            .evaluate(&segment.text, context)
            .map_err(|failure| self.report(index, segment, failure))
    }

    fn report(&self, index: usize, segment: &Segment, failure: EvalFailure) -> TemplateError {
        let span = failure
            .span
            .map_or(segment.span, |inner| segment.span.offset_by(inner));
        let error = EvalError::new(index, span, segment.text.as_str(), failure.message);
        warn!(
            segment = index,
            at = %span,
            expression = %error.expression,
            "expression failed: {}",
            error.message
        );
        if let Some(observer) = &self.on_error {
            observer(&error);
        }
        error.into()
    }
}
