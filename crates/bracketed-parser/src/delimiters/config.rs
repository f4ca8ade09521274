//! Validated delimiter pairs.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use bracketed_core::ConfigError;

/// The delimiter pair used when none is given.
pub const DEFAULT_SPEC: &str = "{ }";

/// A validated pair of expression delimiters together with their
/// pattern-escaped forms.
///
/// Instances are immutable. Every successful construction gets a fresh
/// [`version`](Self::version), which caches use to tell configurations apart
/// even when two of them spell the same pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Delimiters {
    open: String,
    close: String,
    open_escaped: String,
    close_escaped: String,
    version: u64,
}

impl Delimiters {
    /// Parse a `"<open> <close>"` spec.
    ///
    /// `None` and the empty string give the default `{ }` pair. The two tokens
    /// must be separated by exactly one space and may not contain control
    /// characters, ASCII letters or digits, quotes, `,`, `;`, `<`, `>` or a
    /// backslash.
    pub fn parse(spec: Option<&str>) -> Result<Self, ConfigError> {
        let spec = match spec {
            None | Some("") => DEFAULT_SPEC,
            Some(spec) => spec,
        };

        let mut tokens = spec.split(' ');
        let (Some(open), Some(close), None) = (tokens.next(), tokens.next(), tokens.next()) else {
            return Err(ConfigError::unsupported(spec));
        };
        if !is_valid_token(open) || !is_valid_token(close) {
            return Err(ConfigError::unsupported(spec));
        }

        Ok(Self::new(open, close))
    }

    fn new(open: &str, close: &str) -> Self {
        Self {
            open: open.to_string(),
            close: close.to_string(),
            open_escaped: regex::escape(open),
            close_escaped: regex::escape(close),
            version: next_version(),
        }
    }

    /// The opening token.
    #[inline]
    pub fn open(&self) -> &str {
        &self.open
    }

    /// The closing token.
    #[inline]
    pub fn close(&self) -> &str {
        &self.close
    }

    /// The opening token, escaped for use inside a regex.
    #[inline]
    pub fn open_escaped(&self) -> &str {
        &self.open_escaped
    }

    /// The closing token, escaped for use inside a regex.
    #[inline]
    pub fn close_escaped(&self) -> &str {
        &self.close_escaped
    }

    /// Process-unique identity of this configuration.
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// `[open, close]`.
    pub fn pair(&self) -> [String; 2] {
        [self.open.clone(), self.close.clone()]
    }

    /// Whether this is the `{ }` pair.
    pub fn is_default(&self) -> bool {
        self.open == "{" && self.close == "}"
    }

    /// Whether `c` occurs in either token.
    pub fn contains_char(&self, c: char) -> bool {
        self.open.contains(c) || self.close.contains(c)
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self::new("{", "}")
    }
}

impl fmt::Debug for Delimiters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Delimiters({} {} v{})", self.open, self.close, self.version)
    }
}

impl fmt::Display for Delimiters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.open, self.close)
    }
}

fn next_version() -> u64 {
    static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);
    NEXT_VERSION.fetch_add(1, Ordering::Relaxed)
}

fn is_valid_token(token: &str) -> bool {
    !token.is_empty() && !token.chars().any(is_forbidden)
}

fn is_forbidden(c: char) -> bool {
    c.is_ascii_control()
        || c.is_ascii_alphanumeric()
        || matches!(c, '\'' | '"' | ',' | ';' | '<' | '>' | '\\')
}
