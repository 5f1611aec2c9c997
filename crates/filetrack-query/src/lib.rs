//! Search layer for filetrack.
//!
//! Scans a location with [`filetrack_scan`], then filters the records by
//! category, size, modification date and name, sorts and truncates them.
//!
//! Name matching is one of:
//!
//! - **Regex** - case-insensitive search anywhere in the name
//! - **Exact** - whole name, or name minus its last extension
//! - **Custom** - a matcher registered in the [`PluginRegistry`]
//! - **Fuzzy** - partial-ratio similarity of at least [`FUZZY_MATCH_THRESHOLD`]
//!
//! ```rust,no_run
//! use filetrack_query::{ContentType, QueryEngine, SearchOptions, SortField, SortOrder};
//!
//! let engine = QueryEngine::new();
//! let options = SearchOptions::builder()
//!     .content_type(Some(ContentType::TvShow))
//!     .sort_by(SortField::Size)
//!     .sort_order(SortOrder::Desc)
//!     .build()
//!     .unwrap();
//!
//! let results = engine.search("office", "/media/tv", &options).unwrap();
//! for record in &results.records {
//!     println!("{} ({} bytes)", record.name, record.size_bytes);
//! }
//! ```

mod cache;
mod engine;
mod error;
pub mod fuzzy;
mod matcher;
mod options;
mod sort;

pub use cache::{CacheKey, ResultCache};
pub use engine::{QueryEngine, SearchResults};
pub use error::QueryError;
pub use fuzzy::{FUZZY_MATCH_THRESHOLD, fuzzy_matches, partial_ratio, ratio};
pub use matcher::NameFilter;
pub use options::{SearchOptions, SearchOptionsBuilder};
pub use sort::{SortField, SortOrder, sort_records};

// Re-export core types
pub use filetrack_core::{
    CancellationGate, ContentType, FileRecord, HashAlgorithm, PluginRegistry, StopReason,
};
