//! Delimiter configuration and delimiter-dependent pattern caching.

mod config;
mod pattern;

pub use config::{DEFAULT_SPEC, Delimiters};
pub use pattern::{CLOSE_PLACEHOLDER, OPEN_PLACEHOLDER, PatternCache, has_placeholder, substitute};
