//! Summary statistics for a scan.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Counters collected while walking a location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanStats {
    /// Files seen by the walker (before exclusion).
    pub files_seen: u64,
    /// Files that produced a record.
    pub files_recorded: u64,
    /// Files skipped because of their extension.
    pub files_excluded: u64,
    /// Files skipped because they could not be stat'ed.
    pub files_unreadable: u64,
    /// Directories visited, including the root.
    pub dirs_visited: u64,
    /// Total size of recorded files.
    pub total_size: u64,
    /// Largest recorded file (path, size).
    pub largest_file: Option<(PathBuf, u64)>,
    /// Oldest recorded file (path, mtime seconds).
    pub oldest_file: Option<(PathBuf, f64)>,
    /// Newest recorded file (path, mtime seconds).
    pub newest_file: Option<(PathBuf, f64)>,
}

impl ScanStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update stats with a recorded file.
    pub fn record_file(&mut self, path: &Path, size: u64, modified: f64) {
        self.files_recorded += 1;
        self.total_size += size;

        if self.largest_file.as_ref().is_none_or(|(_, s)| size > *s) {
            self.largest_file = Some((path.to_path_buf(), size));
        }

        if self.oldest_file.as_ref().is_none_or(|(_, t)| modified < *t) {
            self.oldest_file = Some((path.to_path_buf(), modified));
        }

        if self.newest_file.as_ref().is_none_or(|(_, t)| modified > *t) {
            self.newest_file = Some((path.to_path_buf(), modified));
        }
    }

    /// Record a visited directory.
    pub fn record_dir(&mut self) {
        self.dirs_visited += 1;
    }
}
