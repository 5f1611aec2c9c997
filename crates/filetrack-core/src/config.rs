//! Scan configuration types.

use std::path::{Path, PathBuf};
use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::ScanError;

/// Extensions skipped by default: transient log and temp artifacts.
pub const DEFAULT_EXCLUDED_EXTENSIONS: &[&str] = &["log", "tmp"];

/// Digest algorithms available for content hashing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Md5,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Blake3,
}

impl HashAlgorithm {
    /// Parse an algorithm name, failing with [`ScanError::UnsupportedAlgorithm`].
    pub fn parse(name: &str) -> Result<Self, ScanError> {
        name.trim()
            .parse()
            .map_err(|_| ScanError::UnsupportedAlgorithm {
                name: name.to_string(),
            })
    }
}

/// Configuration for scanning operations.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanConfig {
    /// Directory to scan.
    pub root: PathBuf,

    /// Descend into subdirectories (false = first level only).
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub recursive: bool,

    /// Digest algorithm to hash files with (None = no hashing).
    #[builder(default)]
    #[serde(default)]
    pub hash_algorithm: Option<HashAlgorithm>,

    /// Extract embedded and filesystem metadata.
    #[builder(default = "false")]
    #[serde(default)]
    pub extract_metadata: bool,

    /// Extensions (without the dot, case-insensitive) that are never recorded.
    #[builder(default = "default_excluded_extensions()")]
    #[serde(default = "default_excluded_extensions")]
    pub excluded_extensions: Vec<String>,

    /// Number of worker threads for per-file work (0 = auto-detect).
    #[builder(default = "0")]
    #[serde(default)]
    pub threads: usize,

    /// Follow symbolic links to directories.
    #[builder(default = "false")]
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Include hidden files (starting with .).
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub include_hidden: bool,

    /// Wall-clock budget for the scan, checked cooperatively.
    #[builder(default)]
    #[serde(default)]
    pub max_duration: Option<Duration>,

    /// Registry extractors to run (None = all registered).
    #[builder(default)]
    #[serde(default)]
    pub extractors: Option<Vec<String>>,
}

fn default_true() -> bool {
    true
}

fn default_excluded_extensions() -> Vec<String> {
    DEFAULT_EXCLUDED_EXTENSIONS
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.root {
            if root.as_os_str().is_empty() {
                return Err("Root path cannot be empty".to_string());
            }
        } else {
            return Err("Root path is required".to_string());
        }
        Ok(())
    }
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Create a recursive, attributes-only config for a path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            recursive: true,
            hash_algorithm: None,
            extract_metadata: false,
            excluded_extensions: default_excluded_extensions(),
            threads: 0,
            follow_symlinks: false,
            include_hidden: true,
            max_duration: None,
            extractors: None,
        }
    }

    /// Check if a file name carries an excluded extension.
    pub fn is_excluded(&self, name: &str) -> bool {
        let Some(ext) = Path::new(name).extension() else {
            return false;
        };
        let ext = ext.to_string_lossy().to_lowercase();
        self.excluded_extensions
            .iter()
            .any(|excluded| normalize_extension(excluded) == ext)
    }

    /// Check if a registry extractor is enabled by this config.
    pub fn extractor_enabled(&self, name: &str) -> bool {
        self.extractors
            .as_ref()
            .is_none_or(|names| names.iter().any(|n| n == name))
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Lowercase an extension and strip any leading dots.
fn normalize_extension(ext: &str) -> String {
    ext.trim_start_matches('.').to_lowercase()
}
