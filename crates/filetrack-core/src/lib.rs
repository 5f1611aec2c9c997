//! Core types and traits for filetrack.
//!
//! This crate provides the fundamental data structures shared by the
//! scanner and the query engine: file records, scan configuration,
//! the filename classifier, cooperative cancellation, and the plugin
//! registry of named metadata extractors and matchers.

mod cancel;
mod classify;
mod config;
mod error;
mod plugin;
mod record;
mod stats;

pub use cancel::{CancellationGate, Checkpoint, StopReason};
pub use classify::classify;
pub use config::{HashAlgorithm, ScanConfig, ScanConfigBuilder, DEFAULT_EXCLUDED_EXTENSIONS};
pub use error::{ExtractorError, ScanError, ScanWarning, WarningKind};
pub use plugin::{Extractor, NameMatcher, PluginRegistry};
pub use record::{ContentType, FileRecord, Metadata, UNKNOWN_MIME};
pub use stats::ScanStats;
