//! File-name predicates: regex, exact, fuzzy, or a registered matcher.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use regex::{Regex, RegexBuilder};

use filetrack_core::{NameMatcher, PluginRegistry};

use crate::error::QueryError;
use crate::fuzzy::{FUZZY_MATCH_THRESHOLD, fuzzy_matches};
use crate::options::SearchOptions;

/// A compiled name predicate for one search.
#[derive(Clone)]
pub enum NameFilter {
    /// Case-insensitive search anywhere in the name.
    Regex(Regex),
    /// Lowercased term equal to the full name or the name minus its last extension.
    Exact(String),
    /// Partial-ratio similarity at or above `threshold`.
    Fuzzy { term: String, threshold: f64 },
    /// A matcher from the plugin registry.
    Custom {
        name: String,
        term: String,
        matcher: Arc<dyn NameMatcher>,
    },
}

impl NameFilter {
    /// Pick and prepare the name mode. Regex wins over exact, exact over a
    /// registered matcher, and fuzzy is the fallback.
    pub fn build(
        term: &str,
        options: &SearchOptions,
        registry: &PluginRegistry,
    ) -> Result<Self, QueryError> {
        if options.use_regex {
            return RegexBuilder::new(term)
                .case_insensitive(true)
                .build()
                .map(Self::Regex)
                .map_err(|source| QueryError::InvalidPattern {
                    pattern: term.to_string(),
                    source,
                });
        }

        if options.exact_match {
            return Ok(Self::Exact(term.to_lowercase()));
        }

        if let Some(name) = &options.matcher {
            let matcher = registry
                .matcher(name)
                .ok_or_else(|| QueryError::UnknownMatcher { name: name.clone() })?;
            return Ok(Self::Custom {
                name: name.clone(),
                term: term.to_string(),
                matcher,
            });
        }

        Ok(Self::Fuzzy {
            term: term.to_string(),
            threshold: FUZZY_MATCH_THRESHOLD,
        })
    }

    /// Check whether a file name passes.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Regex(regex) => regex.is_match(name),
            Self::Exact(term) => {
                let lowered = name.to_lowercase();
                if lowered == *term {
                    return true;
                }
                Path::new(&lowered)
                    .file_stem()
                    .is_some_and(|stem| stem.to_string_lossy() == term.as_str())
            }
            Self::Fuzzy { term, threshold } => fuzzy_matches(term, name, *threshold),
            Self::Custom { term, matcher, .. } => matcher.matches(term, name),
        }
    }
}

impl fmt::Debug for NameFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regex(regex) => f.debug_tuple("Regex").field(&regex.as_str()).finish(),
            Self::Exact(term) => f.debug_tuple("Exact").field(term).finish(),
            Self::Fuzzy { term, threshold } => f
                .debug_struct("Fuzzy")
                .field("term", term)
                .field("threshold", threshold)
                .finish(),
            Self::Custom { name, term, .. } => f
                .debug_struct("Custom")
                .field("name", name)
                .field("term", term)
                .finish(),
        }
    }
}
