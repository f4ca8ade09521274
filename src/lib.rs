//! Template interpolation with runtime-configurable expression delimiters.
//!
//! A template is text with embedded expressions marked by a pair of
//! delimiters, `{ }` by default. The pair can be changed at any time to any
//! two tokens (`[ ]`, `{{ }}`, `${ }`, ...); nested delimiters, quoted
//! strings and regular expression literals inside an expression are handled
//! without escaping.
//!
//! # Example
//!
//! ```
//! use bracketed::{Value, render_str};
//! use serde_json::json;
//!
//! let context = Value::from(json!({ "name": "world", "n": 2 }));
//! assert_eq!(render_str("hello { name }!", &context).unwrap(), json!("hello world!"));
//! assert_eq!(render_str("{ n * 2 }", &context).unwrap(), json!(4));
//! ```
//!
//! The crate-level functions share one process-wide configuration. Use an
//! [`Engine`] for an independent one.

pub mod brackets;
pub mod engine;
pub mod eval;
pub mod template;

pub use brackets::{Brackets, Part};
pub use engine::{Engine, EngineBuilder};
pub use eval::{EvalFailure, Evaluator, ExprEvaluator};
pub use template::{LoopKeys, Renderer, Template, TemplateCache};

pub use bracketed_core::{
    ConfigError, E_NUMBER, EvalError, Map, ParseError, ParseErrorKind, Span, TemplateError,
    TemplateResult, Value,
};
pub use bracketed_parser::{DEFAULT_SPEC, Delimiters, Segment, SegmentKind, Splitter};

use std::sync::Arc;

pub mod prelude {
    pub use crate::brackets::{Brackets, Part};
    pub use crate::engine::Engine;
    pub use crate::eval::{EvalFailure, Evaluator};
    pub use crate::template::Template;
    pub use bracketed_core::{TemplateError, TemplateResult, Value};
    pub use bracketed_parser::Delimiters;
}

/// Install a new global delimiter pair. `None` or `""` restores `{ }`.
pub fn set_delimiters(spec: Option<&str>) -> Result<(), ConfigError> {
    Engine::global().set_delimiters(spec)
}

/// The global `[open, close]` pair.
pub fn delimiters() -> [String; 2] {
    Engine::global().delimiters()
}

/// Split `template` into alternating literal and expression texts, using
/// `delimiters` or the global pair.
pub fn split(template: &str, delimiters: Option<&Delimiters>) -> Result<Vec<String>, ParseError> {
    Engine::global().split(template, delimiters)
}

/// Compile `template` with the global pair.
pub fn parse(template: &str) -> TemplateResult<Arc<Template>> {
    Engine::global().parse(template)
}

/// Render a compiled template with the default evaluator.
pub fn render(template: &Template, context: &Value) -> TemplateResult<Value> {
    Engine::global().render(template, context)
}

/// [`parse`] then [`render`].
pub fn render_str(template: &str, context: &Value) -> TemplateResult<Value> {
    Engine::global().render_str(template, context)
}

/// Whether `text` appears to contain an expression for the global pair.
pub fn has_expr(text: &str) -> TemplateResult<bool> {
    Engine::global().has_expr(text)
}

/// Parse a loop header such as `{ item, i in items }`.
pub fn loop_keys(header: &str) -> Option<LoopKeys> {
    Engine::global().loop_keys(header)
}

/// Drop every template compiled by [`parse`].
pub fn clear_cache() {
    Engine::global().clear_cache();
}
