//! The delimiter registry.
//!
//! [`Brackets`] owns the current [`Delimiters`] together with the
//! [`PatternCache`] and [`TemplateCache`] compiled for them, so replacing the
//! pair evicts both. The process-wide instance is reached through
//! [`Brackets::global`], which belongs to the global [`Engine`]; any other
//! engine carries its own.

use std::sync::{Arc, PoisonError, RwLock};

use bracketed_core::{ConfigError, TemplateError};
use bracketed_parser::{Delimiters, PatternCache};
use regex::Regex;
use tracing::debug;

use crate::Engine;
use crate::template::TemplateCache;

/// Pattern template for "contains an expression": the open token followed,
/// lazily and across lines, by the close token.
pub(crate) const DETECTOR_TEMPLATE: &str = r"\{(?s:.*?)\}";

/// Selects one of the strings [`Brackets::get`] hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Part {
    Open = 0,
    Close = 1,
    OpenEscaped = 2,
    CloseEscaped = 3,
}

/// The active delimiter pair plus the patterns and templates compiled for it.
#[derive(Debug)]
pub struct Brackets {
    current: RwLock<Arc<Delimiters>>,
    patterns: PatternCache,
    templates: TemplateCache,
}

impl Default for Brackets {
    fn default() -> Self {
        Self::with_delimiters(Delimiters::default())
    }
}

impl Brackets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiters(delimiters: Delimiters) -> Self {
        Self {
            current: RwLock::new(Arc::new(delimiters)),
            patterns: PatternCache::new(),
            templates: TemplateCache::new(),
        }
    }

    /// The process-wide registry used by the crate-level functions.
    pub fn global() -> &'static Brackets {
        Engine::global().brackets()
    }

    /// Replace the current pair.
    ///
    /// `None` and `""` restore `{ }`. An invalid spec leaves the current pair
    /// untouched. Patterns and templates compiled for the old pair are
    /// dropped.
    pub fn set(&self, spec: Option<&str>) -> Result<(), ConfigError> {
        let next = Arc::new(Delimiters::parse(spec)?);
        let previous = {
            let mut current = self
                .current
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *current, Arc::clone(&next))
        };
        let patterns = self.patterns.evict_version(previous.version());
        let templates = self.templates.evict_version(previous.version());
        debug!(
            from = %previous,
            to = %next,
            patterns,
            templates,
            "delimiters changed"
        );
        Ok(())
    }

    /// A snapshot of the current pair.
    pub fn current(&self) -> Arc<Delimiters> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn get(&self, part: Part) -> String {
        let current = self.current();
        match part {
            Part::Open => current.open(),
            Part::Close => current.close(),
            Part::OpenEscaped => current.open_escaped(),
            Part::CloseEscaped => current.close_escaped(),
        }
        .to_string()
    }

    /// `[open, close]` of the current pair.
    pub fn pair(&self) -> [String; 2] {
        self.current().pair()
    }

    /// The "contains an expression" matcher for the current pair.
    ///
    /// This is a heuristic: it does not know about quotes or escapes.
    pub fn detector(&self) -> Result<Arc<Regex>, TemplateError> {
        self.pattern(DETECTOR_TEMPLATE)
    }

    /// The compiled matcher for a pattern template under the current pair.
    ///
    /// Repeated calls with the same template return the same `Arc` until the
    /// pair changes.
    pub fn pattern(&self, template: &str) -> Result<Arc<Regex>, TemplateError> {
        self.patterns.get_or_compile(template, &self.current())
    }

    /// Re-express a matcher written for `{ }` in terms of the current pair.
    pub fn rebind(&self, regex: &Arc<Regex>) -> Result<Arc<Regex>, TemplateError> {
        self.patterns.rebind(regex, &self.current())
    }

    /// Validate a spec without installing it.
    pub fn array(spec: Option<&str>) -> Result<Delimiters, ConfigError> {
        Delimiters::parse(spec)
    }

    pub fn patterns(&self) -> &PatternCache {
        &self.patterns
    }

    pub fn templates(&self) -> &TemplateCache {
        &self.templates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_braces() {
        let brackets = Brackets::new();
        assert_eq!(brackets.pair(), ["{", "}"]);
        assert_eq!(brackets.get(Part::OpenEscaped), r"\{");
        assert_eq!(brackets.get(Part::CloseEscaped), r"\}");
    }

    #[test]
    fn set_and_reset() {
        let brackets = Brackets::new();
        brackets.set(Some("[ ]")).unwrap();
        assert_eq!(brackets.pair(), ["[", "]"]);
        brackets.set(Some("")).unwrap();
        assert_eq!(brackets.pair(), ["{", "}"]);
        brackets.set(Some("{{ }}")).unwrap();
        brackets.set(None).unwrap();
        assert_eq!(brackets.pair(), ["{", "}"]);
    }

    #[test]
    fn rejected_spec_keeps_previous_pair() {
        let brackets = Brackets::new();
        brackets.set(Some("${ }")).unwrap();
        for spec in [", ,", "\" \"", "a[ ]a", "<% %>"] {
            assert!(brackets.set(Some(spec)).is_err(), "{spec} accepted");
        }
        assert_eq!(brackets.pair(), ["${", "}"]);
    }

    #[test]
    fn pattern_identity_per_configuration() {
        let brackets = Brackets::new();
        let a = brackets.pattern(r"\{x\}").unwrap();
        let b = brackets.pattern(r"\{x\}").unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        brackets.set(Some("[ ]")).unwrap();
        let c = brackets.pattern(r"\{x\}").unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(c.as_str(), r"\[x\]");
    }

    #[test]
    fn changing_pair_evicts_old_patterns() {
        let brackets = Brackets::new();
        brackets.pattern(r"\{a\}").unwrap();
        brackets.detector().unwrap();
        assert_eq!(brackets.patterns().len(), 2);
        brackets.set(Some("[ ]")).unwrap();
        assert!(brackets.patterns().is_empty());
    }

    #[test]
    fn changing_pair_evicts_old_templates() {
        let brackets = Brackets::new();
        for spec in ["[ ]", "{{ }}", "${ }"] {
            brackets.templates().get_or_parse("a { b }", &brackets.current()).unwrap();
            brackets.set(Some(spec)).unwrap();
            assert!(brackets.templates().is_empty(), "{spec}");
        }
    }

    #[test]
    fn rebind_without_placeholder_is_identity() {
        let brackets = Brackets::new();
        brackets.set(Some("[ ]")).unwrap();
        let plain = Arc::new(Regex::new("abc").unwrap());
        assert!(Arc::ptr_eq(&brackets.rebind(&plain).unwrap(), &plain));

        let templated = Arc::new(Regex::new(r"\{ \}").unwrap());
        assert_eq!(brackets.rebind(&templated).unwrap().as_str(), r"\[ \]");
    }

    #[test]
    fn detector_matches_expressions() {
        let brackets = Brackets::new();
        let re = brackets.detector().unwrap();
        assert!(re.is_match("{ 123 }"));
        assert!(re.is_match("{}"));
        assert!(re.is_match("\\{}"));
        assert!(re.is_match("{\n}"));
        assert!(!re.is_match("}{"));
        assert!(!re.is_match("{"));
    }

    #[test]
    fn array_is_side_effect_free() {
        let brackets = Brackets::new();
        let pair = Brackets::array(Some("$[ ]")).unwrap();
        assert_eq!(pair.pair(), ["$[", "]"]);
        assert_eq!(brackets.pair(), ["{", "}"]);
    }
}
