//! Template scanning for bracketed.
//!
//! This crate provides everything that looks at template text:
//! - Delimiter configuration and the version-keyed pattern cache
//! - The [`Splitter`], which cuts a template into literal and expression
//!   segments
//! - The expression language front-end (lexer, AST, Pratt parser)
//!
//! # Example
//!
//! ```
//! use bracketed_parser::{Delimiters, Splitter};
//!
//! let delimiters = Delimiters::parse(Some("[ ]")).unwrap();
//! let parts = Splitter::new(&delimiters).split("a[ x ]b").unwrap();
//! assert_eq!(parts, ["a", " x ", "b"]);
//! ```

pub mod delimiters;
pub mod expr;
pub mod lexer;
pub mod splitter;

pub use delimiters::{DEFAULT_SPEC, Delimiters, PatternCache};
pub use expr::{Expr, parse_expression};
pub use splitter::{Segment, SegmentKind, Splitter};
