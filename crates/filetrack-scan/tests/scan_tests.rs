use std::fs;
use std::path::Path;
use std::sync::Arc;

use filetrack_core::ExtractorError;
use filetrack_scan::{
    Capabilities, HashAlgorithm, Metadata, MetadataExtractor, PluginRegistry, ScanConfig,
    Scanner, WarningKind, hash_file,
};
use tempfile::TempDir;

fn library() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("music")).unwrap();
    fs::write(temp.path().join("music/track.flac"), vec![0u8; 64]).unwrap();
    fs::write(temp.path().join("readme.md"), "# library").unwrap();
    temp
}

fn tagging_registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    registry
        .register_extractor(
            "length",
            |path: &Path| -> Result<Metadata, ExtractorError> {
                let len = fs::metadata(path)?.len();
                Ok(Metadata::from([("length".to_string(), len.to_string())]))
            },
        )
        .register_extractor("flaky", |path: &Path| -> Result<Metadata, ExtractorError> {
            if path.extension().is_some_and(|ext| ext == "md") {
                Err(ExtractorError::new("markdown not supported"))
            } else {
                Ok(Metadata::new())
            }
        });
    registry
}

#[test]
fn test_registry_metadata_flows_into_records() {
    let temp = library();
    let extractor = MetadataExtractor::new(Capabilities::none(), Arc::new(tagging_registry()));
    let scanner = Scanner::with_extractor(extractor);

    let config = ScanConfig::builder()
        .root(temp.path())
        .extract_metadata(true)
        .build()
        .unwrap();
    let output = scanner.scan(&config).unwrap();

    assert_eq!(output.records.len(), 2);
    for record in &output.records {
        let metadata = record.extra_metadata.as_ref().unwrap();
        assert_eq!(metadata["length"], record.size_bytes.to_string());
    }

    let failures: Vec<_> = output
        .warnings
        .iter()
        .filter(|w| w.kind == WarningKind::ExtractorFailure)
        .collect();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].path.ends_with("readme.md"));
}

#[test]
fn test_extractor_allow_list() {
    let temp = library();
    let extractor = MetadataExtractor::new(Capabilities::none(), Arc::new(tagging_registry()));
    let scanner = Scanner::with_extractor(extractor);

    let config = ScanConfig::builder()
        .root(temp.path())
        .extract_metadata(true)
        .extractors(Some(vec!["flaky".to_string(), "not-registered".to_string()]))
        .build()
        .unwrap();
    let output = scanner.scan(&config).unwrap();

    assert!(
        output
            .records
            .iter()
            .all(|r| r.metadata_value("length").is_none())
    );
    assert_eq!(output.warnings.len(), 1);
}

#[test]
fn test_record_hash_matches_direct_hash() {
    let temp = library();
    let config = ScanConfig::builder()
        .root(temp.path())
        .hash_algorithm(HashAlgorithm::Blake3)
        .build()
        .unwrap();

    let output = Scanner::new().scan(&config).unwrap();
    for record in &output.records {
        let direct = hash_file(&record.path, HashAlgorithm::Blake3).unwrap();
        assert_eq!(record.hash.as_deref(), Some(direct.as_str()));
    }
}

#[test]
fn test_stats_summarize_records() {
    let temp = library();
    let output = Scanner::new().scan(&ScanConfig::new(temp.path())).unwrap();

    assert_eq!(output.stats.files_recorded, 2);
    assert_eq!(output.stats.total_size, 64 + "# library".len() as u64);
    let (largest, size) = output.stats.largest_file.clone().unwrap();
    assert!(largest.ends_with("music/track.flac"));
    assert_eq!(size, 64);
}
