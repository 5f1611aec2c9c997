//! Best-effort metadata extraction.
//!
//! Sources run in a fixed order: filesystem attributes, image EXIF tags,
//! audio/video stream properties, then registry extractors in registration
//! order. All results merge into one map and a later source overwrites an
//! earlier one on key collision. A failing source contributes nothing.

mod filesystem;
mod image;
mod media;

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use filetrack_core::{ExtractorError, Metadata, PluginRegistry, ScanConfig, ScanWarning};

/// Whether EXIF decoding is compiled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageCapability {
    Exif,
    Unavailable,
}

/// Whether audio/video property reading is compiled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaCapability {
    TagReader,
    Unavailable,
}

/// Built-in extraction capabilities, decided once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub image: ImageCapability,
    pub media: MediaCapability,
}

impl Capabilities {
    /// Capabilities available in this build.
    pub fn detect() -> Self {
        Self {
            image: if cfg!(feature = "exif") {
                ImageCapability::Exif
            } else {
                ImageCapability::Unavailable
            },
            media: if cfg!(feature = "media") {
                MediaCapability::TagReader
            } else {
                MediaCapability::Unavailable
            },
        }
    }

    /// Filesystem attributes only.
    pub fn none() -> Self {
        Self {
            image: ImageCapability::Unavailable,
            media: MediaCapability::Unavailable,
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::detect()
    }
}

/// Merged metadata for one file plus any extractor failures.
#[derive(Debug, Default)]
pub struct Extraction {
    pub metadata: Metadata,
    pub warnings: Vec<ScanWarning>,
}

/// Runs the built-in sources and the registry extractors for a file.
#[derive(Debug, Clone)]
pub struct MetadataExtractor {
    capabilities: Capabilities,
    registry: Arc<PluginRegistry>,
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new(Capabilities::detect(), Arc::new(PluginRegistry::new()))
    }
}

impl MetadataExtractor {
    pub fn new(capabilities: Capabilities, registry: Arc<PluginRegistry>) -> Self {
        Self {
            capabilities,
            registry,
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }

    /// Extract metadata for `path`. Never fails; see [`Extraction::warnings`].
    pub fn extract(&self, path: &Path, mime_type: &str, config: &ScanConfig) -> Extraction {
        let mut extraction = Extraction {
            metadata: filesystem::extract(path),
            warnings: Vec::new(),
        };

        if mime_type.starts_with("image/") && self.capabilities.image == ImageCapability::Exif {
            run_builtin("exif", path, image::read_exif, &mut extraction);
        }

        let is_media = mime_type.starts_with("audio/") || mime_type.starts_with("video/");
        if is_media && self.capabilities.media == MediaCapability::TagReader {
            run_builtin("media", path, media::read_tags, &mut extraction);
        }

        for (name, extractor) in self.registry.extractors() {
            if !config.extractor_enabled(name) {
                continue;
            }
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| extractor.extract(path)));
            let message = match outcome {
                Ok(Ok(metadata)) => {
                    extraction.metadata.extend(metadata);
                    continue;
                }
                Ok(Err(err)) => err.to_string(),
                Err(_) => "extractor panicked".to_string(),
            };
            tracing::warn!(path = %path.display(), extractor = name, error = %message, "extractor failed");
            extraction
                .warnings
                .push(ScanWarning::extractor_failure(path, name, &message));
        }

        extraction
    }
}

/// Run a built-in decoder. Files it cannot decode are expected and only
/// logged; a panic inside the decoder becomes a warning.
fn run_builtin<F>(source: &str, path: &Path, read: F, extraction: &mut Extraction)
where
    F: FnOnce(&Path) -> Result<Metadata, ExtractorError>,
{
    match panic::catch_unwind(AssertUnwindSafe(|| read(path))) {
        Ok(Ok(metadata)) => extraction.metadata.extend(metadata),
        Ok(Err(err)) => {
            tracing::debug!(path = %path.display(), source, error = %err, "nothing decoded");
        }
        Err(_) => {
            tracing::warn!(path = %path.display(), extractor = source, "decoder panicked");
            extraction.warnings.push(ScanWarning::extractor_failure(
                path,
                source,
                "decoder panicked",
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetrack_core::WarningKind;
    use std::fs;
    use tempfile::TempDir;

    fn constant(
        key: &'static str,
        value: &'static str,
    ) -> impl Fn(&Path) -> Result<Metadata, ExtractorError> {
        move |_path: &Path| Ok(Metadata::from([(key.to_string(), value.to_string())]))
    }

    fn fixture() -> (TempDir, std::path::PathBuf) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("notes.txt");
        fs::write(&path, "hello").unwrap();
        (temp, path)
    }

    #[test]
    fn test_later_extractor_wins() {
        let (_temp, path) = fixture();
        let mut registry = PluginRegistry::new();
        registry
            .register_extractor("first", constant("k", "first"))
            .register_extractor("second", constant("k", "second"));

        let extractor = MetadataExtractor::new(Capabilities::none(), Arc::new(registry));
        let extraction = extractor.extract(&path, "text/plain", &ScanConfig::new("/"));

        assert_eq!(extraction.metadata.get("k").map(String::as_str), Some("second"));
        assert!(extraction.warnings.is_empty());
    }

    #[test]
    fn test_registry_overrides_filesystem_keys() {
        let (_temp, path) = fixture();
        let mut registry = PluginRegistry::new();
        registry.register_extractor("owner", constant("owner", "someone"));

        let extractor = MetadataExtractor::new(Capabilities::none(), Arc::new(registry));
        let metadata = extractor.extract(&path, "text/plain", &ScanConfig::new("/")).metadata;

        assert_eq!(metadata.get("owner").map(String::as_str), Some("someone"));
    }

    #[test]
    fn test_failing_extractor_is_isolated() {
        let (_temp, path) = fixture();
        let mut registry = PluginRegistry::new();
        registry
            .register_extractor("broken", |_: &Path| -> Result<Metadata, ExtractorError> {
                Err(ExtractorError::new("corrupt header"))
            })
            .register_extractor("panics", |_: &Path| -> Result<Metadata, ExtractorError> {
                panic!("boom")
            })
            .register_extractor("ok", constant("ok", "1"));

        let extractor = MetadataExtractor::new(Capabilities::none(), Arc::new(registry));
        let extraction = extractor.extract(&path, "text/plain", &ScanConfig::new("/"));

        assert_eq!(extraction.metadata.get("ok").map(String::as_str), Some("1"));
        assert_eq!(extraction.warnings.len(), 2);
        assert!(
            extraction
                .warnings
                .iter()
                .all(|w| w.kind == WarningKind::ExtractorFailure)
        );
    }

    #[test]
    fn test_allow_list_filters_extractors() {
        let (_temp, path) = fixture();
        let mut registry = PluginRegistry::new();
        registry
            .register_extractor("wanted", constant("wanted", "1"))
            .register_extractor("skipped", constant("skipped", "1"));

        let mut config = ScanConfig::new("/");
        config.extractors = Some(vec!["wanted".to_string()]);

        let extractor = MetadataExtractor::new(Capabilities::none(), Arc::new(registry));
        let metadata = extractor.extract(&path, "text/plain", &config).metadata;

        assert!(metadata.contains_key("wanted"));
        assert!(!metadata.contains_key("skipped"));
    }

    #[test]
    fn test_undecodable_image_contributes_nothing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("photo.jpg");
        fs::write(&path, "not a jpeg").unwrap();

        let extraction =
            MetadataExtractor::default().extract(&path, "image/jpeg", &ScanConfig::new("/"));

        assert!(extraction.warnings.is_empty());
        assert!(!extraction.metadata.contains_key("Make"));
    }

    #[test]
    fn test_decoder_panic_is_isolated() {
        let (_temp, path) = fixture();
        let mut extraction = Extraction {
            metadata: Metadata::from([("owner".to_string(), "me".to_string())]),
            warnings: Vec::new(),
        };

        run_builtin(
            "exif",
            &path,
            |_: &Path| -> Result<Metadata, ExtractorError> { panic!("bad segment") },
            &mut extraction,
        );

        assert_eq!(extraction.metadata.get("owner").map(String::as_str), Some("me"));
        assert_eq!(extraction.warnings.len(), 1);
        assert_eq!(extraction.warnings[0].kind, WarningKind::ExtractorFailure);
    }

    #[test]
    fn test_builtin_overrides_earlier_keys() {
        let (_temp, path) = fixture();
        let mut extraction = Extraction {
            metadata: Metadata::from([("owner".to_string(), "fs".to_string())]),
            warnings: Vec::new(),
        };

        run_builtin(
            "exif",
            &path,
            |_: &Path| -> Result<Metadata, ExtractorError> {
                Ok(Metadata::from([("owner".to_string(), "image".to_string())]))
            },
            &mut extraction,
        );

        assert_eq!(extraction.metadata.get("owner").map(String::as_str), Some("image"));
        assert!(extraction.warnings.is_empty());
    }

    #[cfg(feature = "exif")]
    #[test]
    fn test_exif_merges_after_filesystem_and_before_registry() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("photo.jpg");
        fs::write(&path, image::jpeg_with_exif()).unwrap();

        let mut registry = PluginRegistry::new();
        registry.register_extractor("retag", constant("48879", "registry"));
        let capabilities = Capabilities {
            image: ImageCapability::Exif,
            media: MediaCapability::Unavailable,
        };
        let extractor = MetadataExtractor::new(capabilities, Arc::new(registry));
        let metadata = extractor.extract(&path, "image/jpeg", &ScanConfig::new("/")).metadata;

        assert!(metadata["Make"].contains("Canon"));
        assert_eq!(metadata.get("48879").map(String::as_str), Some("registry"));
        #[cfg(unix)]
        assert!(metadata.contains_key("permissions"));
        #[cfg(not(unix))]
        assert!(metadata.contains_key("readonly"));
    }
}
