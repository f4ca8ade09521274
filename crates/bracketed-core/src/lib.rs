//! Core types shared by the bracketed template crates.
//!
//! This crate holds the pieces every other crate needs to agree on:
//!
//! - [`Span`] - template source locations
//! - [`TemplateError`] and the phase errors it wraps
//! - [`Value`] - the dynamic value model used for contexts and results

pub mod error;
pub mod span;
pub mod value;

pub use error::{
    ConfigError, EvalError, ParseError, ParseErrorKind, TemplateError, TemplateResult,
};
pub use span::Span;
pub use value::{E_NUMBER, Map, RegexValue, Value, format_number, join_items, parse_number};
