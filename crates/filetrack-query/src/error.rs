//! Error types for searches.

use filetrack_core::ScanError;
use thiserror::Error;

/// Errors that abort a search. Raised before any records are filtered.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The search term is not a valid regular expression.
    #[error("Invalid search pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    /// The options name a matcher that was never registered.
    #[error("Unknown matcher: {name}")]
    UnknownMatcher { name: String },

    #[error(transparent)]
    Scan(#[from] ScanError),
}
