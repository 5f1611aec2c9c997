//! Error types for scanning operations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort a scan before it starts.
///
/// Per-file problems never surface here; they become [`ScanWarning`]s.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The location does not exist, is not a directory, or cannot be read.
    #[error("Invalid location {path}: {reason}")]
    InvalidLocation { path: PathBuf, reason: String },

    /// The requested digest algorithm is not recognized.
    #[error("Unsupported hash algorithm: {name}")]
    UnsupportedAlgorithm { name: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl ScanError {
    /// Create an invalid-location error from an I/O failure on the root.
    pub fn location(path: impl Into<PathBuf>, source: &std::io::Error) -> Self {
        let reason = match source.kind() {
            std::io::ErrorKind::PermissionDenied => "permission denied".to_string(),
            std::io::ErrorKind::NotFound => "not found".to_string(),
            _ => source.to_string(),
        };
        Self::InvalidLocation {
            path: path.into(),
            reason,
        }
    }
}

/// Failure reported by a single metadata extractor.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ExtractorError {
    message: String,
}

impl ExtractorError {
    /// Create an extractor error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for ExtractorError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Kind of scan warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Error reading a directory entry.
    ReadError,
    /// Error reading metadata; the file was skipped.
    MetadataError,
    /// File could not be read for hashing; hash is the error sentinel.
    HashError,
    /// A metadata extractor failed; its contribution is empty.
    ExtractorFailure,
}

/// Non-fatal warning encountered during scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl ScanWarning {
    /// Create a new scan warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create a warning for a file that could not be hashed.
    pub fn hash_error(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        let path = path.into();
        Self {
            message: format!("Hash failed: {error}"),
            path,
            kind: WarningKind::HashError,
        }
    }

    /// Create a warning for a failing metadata extractor.
    pub fn extractor_failure(path: impl Into<PathBuf>, extractor: &str, error: &str) -> Self {
        let path = path.into();
        Self {
            message: format!("Extractor '{extractor}' failed: {error}"),
            path,
            kind: WarningKind::ExtractorFailure,
        }
    }
}
