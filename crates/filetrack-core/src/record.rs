//! File record and content category types.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// MIME type reported when no guess can be made.
pub const UNKNOWN_MIME: &str = "unknown";

/// Extracted metadata, ordered by key for deterministic output.
pub type Metadata = BTreeMap<String, String>;

/// Coarse content category derived from the file name.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum ContentType {
    /// Video container without an episode marker.
    Movie,
    /// Video container whose name carries a season/episode marker.
    #[strum(to_string = "TV Show", serialize = "TVShow", serialize = "tv")]
    #[serde(rename = "TV Show")]
    TvShow,
    /// Everything else.
    #[default]
    Other,
}

/// Attributes of a single scanned file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Base file name.
    pub name: CompactString,

    /// Full path as walked from the scan root.
    pub path: PathBuf,

    /// Size in bytes.
    pub size_bytes: u64,

    /// Modification time in fractional seconds since the Unix epoch.
    pub modified_time: f64,

    /// Best-guess MIME type, or [`UNKNOWN_MIME`].
    pub mime_type: CompactString,

    /// Category assigned by the classifier.
    pub content_type: ContentType,

    /// Hex digest, present only when hashing was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,

    /// Merged extractor output, present only when extraction was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_metadata: Option<Metadata>,
}

impl FileRecord {
    /// Name without its last extension.
    pub fn stem(&self) -> &str {
        let name = self.name.as_str();
        match name.rfind('.') {
            Some(idx) if idx > 0 => &name[..idx],
            _ => name,
        }
    }

    /// Modification time as a UTC datetime.
    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        let secs = self.modified_time.floor();
        let nanos = ((self.modified_time - secs) * 1e9) as u32;
        DateTime::from_timestamp(secs as i64, nanos)
    }

    /// Look up a metadata value by key.
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.extra_metadata
            .as_ref()
            .and_then(|meta| meta.get(key))
            .map(String::as_str)
    }
}
