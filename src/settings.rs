//! User settings file.

use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use filetrack_core::{DEFAULT_EXCLUDED_EXTENSIONS, HashAlgorithm};

/// Defaults read from `config.toml`; command-line flags override them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Extensions skipped by every scan.
    pub excluded_extensions: Vec<String>,
    /// Worker threads (0 = auto-detect).
    pub threads: usize,
    /// Algorithm used for `--log-hash` sidecar files.
    pub log_hash_algorithm: HashAlgorithm,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            excluded_extensions: DEFAULT_EXCLUDED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            threads: 0,
            log_hash_algorithm: HashAlgorithm::Sha256,
        }
    }
}

impl Settings {
    /// Get the default config file path.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("filetrack").join("config.toml"))
    }

    /// Load settings. An explicit path must exist and parse; the default
    /// path is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::read(path);
        }
        match Self::config_path() {
            Some(path) if path.is_file() => Self::read(&path),
            _ => Ok(Self::default()),
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read settings file {}", path.display()))?;
        let settings: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid settings file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }
}
