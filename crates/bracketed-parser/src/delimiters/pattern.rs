//! Compiled pattern templates keyed by delimiter version.
//!
//! A pattern template is a regex written for the default `{ }` pair: the
//! escaped default tokens `\{` and `\}` act as placeholders and are replaced
//! by the escaped tokens of whatever pair is active. Compiled results are
//! cached per `(template, version)` so a given configuration always hands out
//! the same `Arc`.

use std::borrow::Cow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bracketed_core::TemplateError;
use regex::Regex;
use rustc_hash::FxHashMap;
use tracing::trace;

use super::Delimiters;

/// Placeholder for the opening token.
pub const OPEN_PLACEHOLDER: &str = r"\{";
/// Placeholder for the closing token.
pub const CLOSE_PLACEHOLDER: &str = r"\}";

/// Lookup-or-build cache of compiled pattern templates.
#[derive(Debug, Default)]
pub struct PatternCache {
    entries: Mutex<FxHashMap<(u64, String), Arc<Regex>>>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the matcher for `template` under `delimiters`, compiling it on the
    /// first request.
    pub fn get_or_compile(
        &self,
        template: &str,
        delimiters: &Delimiters,
    ) -> Result<Arc<Regex>, TemplateError> {
        let key = (delimiters.version(), template.to_string());
        if let Some(found) = self.lock().get(&key) {
            return Ok(Arc::clone(found));
        }

        trace!(template, version = delimiters.version(), "compiling pattern template");
        let source = substitute(template, delimiters);
        let compiled = Regex::new(&source)
            .map(Arc::new)
            .map_err(|e| TemplateError::invalid_pattern(source.as_ref(), &e))?;

        // another thread may have won the race; keep whichever landed first
        let mut entries = self.lock();
        Ok(Arc::clone(entries.entry(key).or_insert(compiled)))
    }

    /// Re-express an already compiled matcher for `delimiters`.
    ///
    /// Returns the same `Arc` when the source has no placeholder or the
    /// substitution does not change it.
    pub fn rebind(
        &self,
        regex: &Arc<Regex>,
        delimiters: &Delimiters,
    ) -> Result<Arc<Regex>, TemplateError> {
        let source = regex.as_str();
        if !has_placeholder(source) || substitute(source, delimiters) == source {
            return Ok(Arc::clone(regex));
        }
        self.get_or_compile(source, delimiters)
    }

    /// Drop every entry compiled for `version`.
    pub fn evict_version(&self, version: u64) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|(v, _), _| *v != version);
        before - entries.len()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, FxHashMap<(u64, String), Arc<Regex>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Whether a pattern source mentions either placeholder.
pub fn has_placeholder(source: &str) -> bool {
    let mut chars = source.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some('{' | '}') = chars.next() {
                return true;
            }
        }
    }
    false
}

/// Replace the placeholders of `template` with the escaped tokens of
/// `delimiters`.
///
/// Other escape sequences are copied as they are, so `\\{` (an escaped
/// backslash followed by a brace) is left alone.
pub fn substitute<'a>(template: &'a str, delimiters: &Delimiters) -> Cow<'a, str> {
    if delimiters.is_default() || !has_placeholder(template) {
        return Cow::Borrowed(template);
    }

    let mut out = String::with_capacity(template.len() + 8);
    let mut chars = template.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('{') => out.push_str(delimiters.open_escaped()),
            Some('}') => out.push_str(delimiters.close_escaped()),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    Cow::Owned(out)
}
