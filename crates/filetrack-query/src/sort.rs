//! Result ordering.

use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use strum::{Display, EnumString};

use filetrack_core::FileRecord;

/// Field to sort search results by.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Name,
    Path,
    Size,
    Modified,
    MimeType,
    ContentType,
    Hash,
    /// A key in the record's extra metadata.
    Metadata(String),
}

impl FromStr for SortField {
    type Err = Infallible;

    /// Record fields by name (with a few aliases); anything else is
    /// treated as a metadata key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "name" => Self::Name,
            "path" | "raw_path" => Self::Path,
            "size" | "size_bytes" => Self::Size,
            "modified" | "modified_time" | "mtime" => Self::Modified,
            "mime" | "mime_type" => Self::MimeType,
            "content_type" | "category" => Self::ContentType,
            "hash" => Self::Hash,
            _ => Self::Metadata(s.strip_prefix("metadata.").unwrap_or(s).to_string()),
        })
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => f.write_str("name"),
            Self::Path => f.write_str("path"),
            Self::Size => f.write_str("size_bytes"),
            Self::Modified => f.write_str("modified_time"),
            Self::MimeType => f.write_str("mime_type"),
            Self::ContentType => f.write_str("content_type"),
            Self::Hash => f.write_str("hash"),
            Self::Metadata(key) => write!(f, "metadata.{key}"),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortOrder {
    #[default]
    #[strum(to_string = "asc", serialize = "ascending")]
    Asc,
    #[strum(to_string = "desc", serialize = "descending")]
    Desc,
}

impl SortField {
    /// Compare two records on this field. Missing values compare as empty.
    pub fn compare(&self, a: &FileRecord, b: &FileRecord) -> Ordering {
        match self {
            Self::Name => a.name.cmp(&b.name),
            Self::Path => a.path.cmp(&b.path),
            Self::Size => a.size_bytes.cmp(&b.size_bytes),
            Self::Modified => a.modified_time.total_cmp(&b.modified_time),
            Self::MimeType => a.mime_type.cmp(&b.mime_type),
            Self::ContentType => a.content_type.to_string().cmp(&b.content_type.to_string()),
            Self::Hash => a
                .hash
                .as_deref()
                .unwrap_or_default()
                .cmp(b.hash.as_deref().unwrap_or_default()),
            Self::Metadata(key) => a
                .metadata_value(key)
                .unwrap_or_default()
                .cmp(b.metadata_value(key).unwrap_or_default()),
        }
    }
}

/// Stable sort in place. Equal records keep their relative order in both
/// directions.
pub fn sort_records(records: &mut [FileRecord], field: &SortField, order: SortOrder) {
    match order {
        SortOrder::Asc => records.sort_by(|a, b| field.compare(a, b)),
        SortOrder::Desc => records.sort_by(|a, b| field.compare(b, a)),
    }
}
