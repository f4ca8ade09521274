use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bracketed_core::ParseError;
use bracketed_parser::Delimiters;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use super::Template;

/// Compiled templates keyed by `(delimiter version, source)`.
#[derive(Debug, Default)]
pub struct TemplateCache {
    entries: Mutex<FxHashMap<(u64, String), Arc<Template>>>,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The compiled form of `source` under `delimiters`, splitting it on the
    /// first request.
    pub fn get_or_parse(
        &self,
        source: &str,
        delimiters: &Delimiters,
    ) -> Result<Arc<Template>, ParseError> {
        let key = (delimiters.version(), source.to_string());
        if let Some(found) = self.lock().get(&key) {
            return Ok(Arc::clone(found));
        }

        trace!(version = delimiters.version(), len = source.len(), "compiling template");
        let template = Arc::new(Template::compile(source, delimiters)?);
        let mut entries = self.lock();
        Ok(Arc::clone(entries.entry(key).or_insert(template)))
    }

    /// Drop every template compiled under delimiter `version`, returning how
    /// many were removed.
    pub fn evict_version(&self, version: u64) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|(v, _), _| *v != version);
        before - entries.len()
    }

    pub fn clear(&self) {
        let mut entries = self.lock();
        debug!(count = entries.len(), "clearing template cache");
        entries.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, FxHashMap<(u64, String), Arc<Template>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
