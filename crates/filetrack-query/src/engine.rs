//! Search engine: scan, filter, sort, truncate.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use filetrack_core::{
    CancellationGate, FileRecord, PluginRegistry, ScanWarning, StopReason,
};
use filetrack_scan::{Capabilities, MetadataExtractor, ScanOutput, Scanner};

use crate::cache::{CacheKey, ResultCache};
use crate::error::QueryError;
use crate::matcher::NameFilter;
use crate::options::SearchOptions;
use crate::sort::sort_records;

/// Outcome of one search.
#[derive(Debug, Clone)]
pub struct SearchResults {
    /// Matching records, sorted and truncated as requested.
    pub records: Vec<FileRecord>,
    /// Set when the search ended early; `records` is then partial.
    pub stopped: Option<StopReason>,
    /// Number of records the scan produced before filtering.
    pub scanned: usize,
    pub warnings: Vec<ScanWarning>,
    /// True if the scan was served from the result cache.
    pub from_cache: bool,
    pub duration: Duration,
}

impl SearchResults {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Runs searches against directory trees.
///
/// One engine can serve concurrent searches; they share the cancellation
/// gate and the result cache.
#[derive(Debug)]
pub struct QueryEngine {
    scanner: Scanner,
    registry: Arc<PluginRegistry>,
    cache: ResultCache,
}

impl QueryEngine {
    /// Create an engine with the built-in decoders and no plugins.
    pub fn new() -> Self {
        Self::with_registry(Arc::new(PluginRegistry::new()))
    }

    /// Create an engine using the given plugin registry.
    pub fn with_registry(registry: Arc<PluginRegistry>) -> Self {
        Self::with_capabilities(Capabilities::detect(), registry)
    }

    pub fn with_capabilities(capabilities: Capabilities, registry: Arc<PluginRegistry>) -> Self {
        let extractor = MetadataExtractor::new(capabilities, Arc::clone(&registry));
        Self {
            scanner: Scanner::with_extractor(extractor),
            registry,
            cache: ResultCache::new(),
        }
    }

    /// Replace the result cache (e.g. one with a TTL).
    pub fn with_cache(mut self, cache: ResultCache) -> Self {
        self.cache = cache;
        self
    }

    /// Gate shared by every search on this engine. It stays signaled until
    /// [`CancellationGate::reset`] is called.
    pub fn cancellation_gate(&self) -> &CancellationGate {
        self.scanner.gate()
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    /// Search `location` for files whose name matches `term`.
    pub fn search(
        &self,
        term: &str,
        location: impl AsRef<Path>,
        options: &SearchOptions,
    ) -> Result<SearchResults, QueryError> {
        let start = Instant::now();
        // Validate the name mode before touching the filesystem.
        let filter = NameFilter::build(term, options, &self.registry)?;
        let config = options.scan_config(location.as_ref());
        let checkpoint = self.scanner.gate().checkpoint(options.max_duration);

        let (output, from_cache): (Arc<ScanOutput>, bool) = if options.use_cache {
            self.cache
                .get_or_scan(CacheKey::from_config(&config), || {
                    self.scanner.scan_with(&config, &checkpoint)
                })?
        } else {
            (Arc::new(self.scanner.scan_with(&config, &checkpoint)?), false)
        };

        let mut stopped = output.stopped;
        let mut records = Vec::new();
        for record in &output.records {
            // A stopped scan is already partial; filter what it found.
            if stopped.is_none() {
                stopped = checkpoint.check();
                if stopped.is_some() {
                    break;
                }
            }
            if passes_filters(record, options, &filter) {
                records.push(record.clone());
            }
        }

        sort_records(&mut records, &options.sort_by, options.sort_order);
        if let Some(max) = options.max_results {
            records.truncate(max);
        }

        tracing::info!(
            term,
            matched = records.len(),
            scanned = output.records.len(),
            from_cache,
            stopped = ?stopped,
            "search finished"
        );

        Ok(SearchResults {
            records,
            stopped,
            scanned: output.records.len(),
            warnings: output.warnings.clone(),
            from_cache,
            duration: start.elapsed(),
        })
    }
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Category, size, date, then name.
fn passes_filters(record: &FileRecord, options: &SearchOptions, filter: &NameFilter) -> bool {
    if options
        .content_type
        .is_some_and(|wanted| record.content_type != wanted)
    {
        return false;
    }
    if options
        .size_range
        .is_some_and(|(min, max)| !(min..=max).contains(&record.size_bytes))
    {
        return false;
    }
    if options
        .date_range
        .is_some_and(|(from, to)| record.modified_time < from || record.modified_time > to)
    {
        return false;
    }
    filter.matches(&record.name)
}
