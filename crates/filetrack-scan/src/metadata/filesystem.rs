//! Filesystem attributes: owner and permission bits.

use std::fs;
use std::path::Path;

use filetrack_core::Metadata;

/// Read owner and permission attributes. Fields the platform cannot
/// provide are omitted; a failed stat yields an empty map.
pub(super) fn extract(path: &Path) -> Metadata {
    match fs::metadata(path) {
        Ok(metadata) => platform_fields(&metadata),
        Err(_) => Metadata::new(),
    }
}

#[cfg(unix)]
fn platform_fields(metadata: &fs::Metadata) -> Metadata {
    use std::os::unix::fs::MetadataExt;

    Metadata::from([
        ("owner".to_string(), metadata.uid().to_string()),
        ("group".to_string(), metadata.gid().to_string()),
        ("permissions".to_string(), format!("{:03o}", metadata.mode() & 0o777)),
    ])
}

#[cfg(not(unix))]
fn platform_fields(metadata: &fs::Metadata) -> Metadata {
    Metadata::from([(
        "readonly".to_string(),
        metadata.permissions().readonly().to_string(),
    )])
}
