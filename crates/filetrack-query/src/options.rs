//! Search options.

use std::path::Path;
use std::time::Duration;

use derive_builder::Builder;

use filetrack_core::{ContentType, DEFAULT_EXCLUDED_EXTENSIONS, HashAlgorithm, ScanConfig};

use crate::sort::{SortField, SortOrder};

/// Options for [`QueryEngine::search`](crate::QueryEngine::search).
///
/// Filters apply in a fixed order: category, size, date, then name.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), default)]
pub struct SearchOptions {
    /// Keep only this category (None = all).
    pub content_type: Option<ContentType>,

    /// Compare the term against the whole name or the name minus its extension.
    pub exact_match: bool,

    /// Treat the term as a case-insensitive regular expression.
    pub use_regex: bool,

    /// Registered matcher to use instead of fuzzy matching.
    pub matcher: Option<String>,

    /// Inclusive size bounds in bytes.
    pub size_range: Option<(u64, u64)>,

    /// Inclusive modification time bounds, seconds since the epoch.
    pub date_range: Option<(f64, f64)>,

    /// Sort field.
    pub sort_by: SortField,

    pub sort_order: SortOrder,

    /// Truncate results after sorting.
    pub max_results: Option<usize>,

    /// Wall-clock budget for the scan and the filtering together.
    pub max_duration: Option<Duration>,

    pub hash_algorithm: Option<HashAlgorithm>,

    pub extract_metadata: bool,

    pub recursive: bool,

    /// Extensions never recorded by the underlying scan.
    pub excluded_extensions: Vec<String>,

    pub include_hidden: bool,

    pub follow_symlinks: bool,

    /// Worker threads for the scan (0 = auto-detect).
    pub threads: usize,

    /// Registry extractors to run (None = all).
    pub extractors: Option<Vec<String>>,

    /// Reuse a cached scan of the same location and scan options.
    pub use_cache: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            content_type: None,
            exact_match: false,
            use_regex: false,
            matcher: None,
            size_range: None,
            date_range: None,
            sort_by: SortField::Name,
            sort_order: SortOrder::Asc,
            max_results: None,
            max_duration: None,
            hash_algorithm: None,
            extract_metadata: false,
            recursive: true,
            excluded_extensions: DEFAULT_EXCLUDED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            include_hidden: true,
            follow_symlinks: false,
            threads: 0,
            extractors: None,
            use_cache: false,
        }
    }
}

impl SearchOptions {
    /// Create a new options builder.
    pub fn builder() -> SearchOptionsBuilder {
        SearchOptionsBuilder::default()
    }

    /// Scan configuration for `location`. The time budget is not copied;
    /// the engine applies it across scan and filtering.
    pub fn scan_config(&self, location: &Path) -> ScanConfig {
        ScanConfig {
            root: location.to_path_buf(),
            recursive: self.recursive,
            hash_algorithm: self.hash_algorithm,
            extract_metadata: self.extract_metadata,
            excluded_extensions: self.excluded_extensions.clone(),
            threads: self.threads,
            follow_symlinks: self.follow_symlinks,
            include_hidden: self.include_hidden,
            max_duration: None,
            extractors: self.extractors.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_match_default() {
        let built = SearchOptions::builder().build().unwrap();

        assert!(built.recursive);
        assert!(!built.use_regex);
        assert!(!built.use_cache);
        assert_eq!(built.sort_by, SortField::Name);
        assert_eq!(built.sort_order, SortOrder::Asc);
        assert_eq!(built.excluded_extensions, vec!["log", "tmp"]);
    }

    #[test]
    fn test_scan_config_carries_scan_options() {
        let options = SearchOptions::builder()
            .recursive(false)
            .hash_algorithm(Some(HashAlgorithm::Md5))
            .max_duration(Some(Duration::from_secs(5)))
            .build()
            .unwrap();

        let config = options.scan_config(Path::new("/media"));
        assert!(!config.recursive);
        assert_eq!(config.hash_algorithm, Some(HashAlgorithm::Md5));
        assert!(config.max_duration.is_none());
    }
}
