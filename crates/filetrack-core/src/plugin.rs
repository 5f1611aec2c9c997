//! Registry of named metadata extractors and name matchers.
//!
//! Entries are registered once at startup by the embedding application and
//! then shared read-only (behind an `Arc`) with the scanner and query engine.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::ExtractorError;
use crate::record::Metadata;

/// A best-effort metadata source for a single file.
pub trait Extractor: Send + Sync {
    /// Extract key/value metadata for the file at `path`.
    fn extract(&self, path: &Path) -> Result<Metadata, ExtractorError>;
}

impl<F> Extractor for F
where
    F: Fn(&Path) -> Result<Metadata, ExtractorError> + Send + Sync,
{
    fn extract(&self, path: &Path) -> Result<Metadata, ExtractorError> {
        self(path)
    }
}

/// A custom name predicate selectable by search options.
pub trait NameMatcher: Send + Sync {
    /// Return true if `name` matches the search `term`.
    fn matches(&self, term: &str, name: &str) -> bool;
}

impl<F> NameMatcher for F
where
    F: Fn(&str, &str) -> bool + Send + Sync,
{
    fn matches(&self, term: &str, name: &str) -> bool {
        self(term, name)
    }
}

/// Named extractors and matchers, kept in registration order.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    extractors: IndexMap<String, Arc<dyn Extractor>>,
    matchers: IndexMap<String, Arc<dyn NameMatcher>>,
}

impl PluginRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an extractor. A second registration under the same name
    /// replaces the first but keeps its position.
    pub fn register_extractor(
        &mut self,
        name: impl Into<String>,
        extractor: impl Extractor + 'static,
    ) -> &mut Self {
        self.extractors.insert(name.into(), Arc::new(extractor));
        self
    }

    /// Register a name matcher.
    pub fn register_matcher(
        &mut self,
        name: impl Into<String>,
        matcher: impl NameMatcher + 'static,
    ) -> &mut Self {
        self.matchers.insert(name.into(), Arc::new(matcher));
        self
    }

    /// Iterate extractors in registration order.
    pub fn extractors(&self) -> impl Iterator<Item = (&str, &dyn Extractor)> {
        self.extractors
            .iter()
            .map(|(name, extractor)| (name.as_str(), extractor.as_ref()))
    }

    /// Look up a matcher by name.
    pub fn matcher(&self, name: &str) -> Option<Arc<dyn NameMatcher>> {
        self.matchers.get(name).cloned()
    }

    /// Names of registered extractors.
    pub fn extractor_names(&self) -> Vec<&str> {
        self.extractors.keys().map(String::as_str).collect()
    }

    /// Names of registered matchers.
    pub fn matcher_names(&self) -> Vec<&str> {
        self.matchers.keys().map(String::as_str).collect()
    }

    /// Check if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty() && self.matchers.is_empty()
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("extractors", &self.extractor_names())
            .field("matchers", &self.matcher_names())
            .finish()
    }
}
