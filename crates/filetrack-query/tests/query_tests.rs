use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use filetrack_query::{
    ContentType, FUZZY_MATCH_THRESHOLD, PluginRegistry, QueryEngine, QueryError, ResultCache,
    SearchOptions, SortField, SortOrder, StopReason, fuzzy_matches,
};
use tempfile::TempDir;

fn create_library() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    fs::create_dir_all(root.join("tv/The Office")).unwrap();
    fs::create_dir(root.join("movies")).unwrap();

    fs::write(root.join("report.txt"), "q3 numbers").unwrap();
    fs::write(root.join("report_final.txt"), "q3 numbers, final").unwrap();
    fs::write(root.join("a.log"), "log line").unwrap();
    fs::write(root.join("tv/The Office/The.Office.S02E01.mkv"), vec![0u8; 300]).unwrap();
    fs::write(root.join("tv/The Office/The.Office.S02E02.mkv"), vec![0u8; 200]).unwrap();
    fs::write(root.join("movies/Office.Space.1999.mp4"), vec![0u8; 900]).unwrap();

    temp
}

fn names(results: &filetrack_query::SearchResults) -> Vec<&str> {
    results.records.iter().map(|r| r.name.as_str()).collect()
}

#[test]
fn test_recursive_vs_first_level() {
    let temp = create_library();
    let engine = QueryEngine::new();
    let options = SearchOptions::builder().use_regex(true).build().unwrap();

    let deep = engine.search(".", temp.path(), &options).unwrap();
    assert_eq!(deep.len(), 5);

    let shallow_options = SearchOptions::builder()
        .use_regex(true)
        .recursive(false)
        .build()
        .unwrap();
    let shallow = engine.search(".", temp.path(), &shallow_options).unwrap();
    let mut found = names(&shallow);
    found.sort();
    assert_eq!(found, vec!["report.txt", "report_final.txt"]);

    let deep_paths: HashSet<PathBuf> = deep.records.iter().map(|r| r.path.clone()).collect();
    assert!(shallow.records.iter().all(|r| deep_paths.contains(&r.path)));
}

#[test]
fn test_exact_match_report() {
    let temp = create_library();
    let options = SearchOptions::builder().exact_match(true).build().unwrap();

    let results = QueryEngine::new().search("report", temp.path(), &options).unwrap();
    assert_eq!(names(&results), vec!["report.txt"]);
}

#[test]
fn test_regex_finds_log_when_not_excluded() {
    let temp = create_library();
    let engine = QueryEngine::new();

    let excluded = SearchOptions::builder().use_regex(true).build().unwrap();
    assert!(engine.search(r".*\.log$", temp.path(), &excluded).unwrap().is_empty());

    let included = SearchOptions::builder()
        .use_regex(true)
        .excluded_extensions(Vec::<String>::new())
        .build()
        .unwrap();
    let results = engine.search(r".*\.log$", temp.path(), &included).unwrap();
    assert_eq!(names(&results), vec!["a.log"]);
}

#[test]
fn test_size_range_inclusive() {
    let temp = TempDir::new().unwrap();
    for (name, size) in [("small.bin", 10usize), ("medium.bin", 500), ("large.bin", 2000)] {
        fs::write(temp.path().join(name), vec![1u8; size]).unwrap();
    }

    let options = SearchOptions::builder()
        .use_regex(true)
        .size_range(Some((100, 1000)))
        .build()
        .unwrap();
    let results = QueryEngine::new().search("bin", temp.path(), &options).unwrap();
    assert_eq!(names(&results), vec!["medium.bin"]);

    let bounds = SearchOptions::builder()
        .use_regex(true)
        .size_range(Some((10, 500)))
        .sort_by(SortField::Size)
        .build()
        .unwrap();
    let results = QueryEngine::new().search("bin", temp.path(), &bounds).unwrap();
    assert_eq!(names(&results), vec!["small.bin", "medium.bin"]);
}

#[test]
fn test_date_range() {
    let temp = create_library();
    let engine = QueryEngine::new();

    let past = SearchOptions::builder()
        .use_regex(true)
        .date_range(Some((0.0, 1.0)))
        .build()
        .unwrap();
    assert!(engine.search(".", temp.path(), &past).unwrap().is_empty());

    let always = SearchOptions::builder()
        .use_regex(true)
        .date_range(Some((0.0, f64::MAX)))
        .build()
        .unwrap();
    assert_eq!(engine.search(".", temp.path(), &always).unwrap().len(), 5);
}

#[test]
fn test_results_sorted_by_name_by_default() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("zeta")).unwrap();
    fs::write(temp.path().join("zeta/alpha.txt"), "a").unwrap();
    fs::write(temp.path().join("gamma.txt"), "g").unwrap();
    fs::write(temp.path().join("beta.txt"), "b").unwrap();

    let options = SearchOptions::builder().use_regex(true).build().unwrap();
    assert_eq!(options.sort_by, SortField::Name);

    let results = QueryEngine::new().search("txt", temp.path(), &options).unwrap();
    assert_eq!(names(&results), vec!["alpha.txt", "beta.txt", "gamma.txt"]);
}

#[test]
fn test_category_filter_and_sort() {
    let temp = create_library();
    let options = SearchOptions::builder()
        .content_type(Some(ContentType::TvShow))
        .sort_by(SortField::Size)
        .sort_order(SortOrder::Desc)
        .build()
        .unwrap();

    let results = QueryEngine::new().search("office", temp.path(), &options).unwrap();
    assert_eq!(
        names(&results),
        vec!["The.Office.S02E01.mkv", "The.Office.S02E02.mkv"]
    );
}

#[test]
fn test_max_results_after_sort() {
    let temp = create_library();
    let options = SearchOptions::builder()
        .use_regex(true)
        .sort_by(SortField::Size)
        .sort_order(SortOrder::Desc)
        .max_results(Some(1))
        .build()
        .unwrap();

    let results = QueryEngine::new().search("office", temp.path(), &options).unwrap();
    assert_eq!(names(&results), vec!["Office.Space.1999.mp4"]);
}

#[test]
fn test_fuzzy_threshold_monotonic_over_library() {
    let temp = create_library();
    let results = QueryEngine::new()
        .search(
            ".",
            temp.path(),
            &SearchOptions::builder().use_regex(true).build().unwrap(),
        )
        .unwrap();

    let at = |threshold: f64| -> HashSet<String> {
        results
            .records
            .iter()
            .filter(|r| fuzzy_matches("ofice", &r.name, threshold))
            .map(|r| r.name.to_string())
            .collect()
    };
    let loose = at(60.0);
    let default = at(FUZZY_MATCH_THRESHOLD);
    let strict = at(95.0);

    assert!(strict.is_subset(&default));
    assert!(default.is_subset(&loose));
    assert!(default.contains("Office.Space.1999.mp4"));
}

#[test]
fn test_invalid_regex_is_error() {
    let temp = create_library();
    let options = SearchOptions::builder().use_regex(true).build().unwrap();

    let err = QueryEngine::new().search("(unclosed", temp.path(), &options).unwrap_err();
    assert!(matches!(err, QueryError::InvalidPattern { .. }));
}

#[test]
fn test_invalid_pattern_checked_before_location() {
    let options = SearchOptions::builder().use_regex(true).build().unwrap();
    let err = QueryEngine::new()
        .search("[", "/definitely/not/a/dir", &options)
        .unwrap_err();

    assert!(matches!(err, QueryError::InvalidPattern { .. }));
}

#[test]
fn test_missing_location_is_scan_error() {
    let err = QueryEngine::new()
        .search("x", "/definitely/not/a/dir", &SearchOptions::default())
        .unwrap_err();

    assert!(matches!(err, QueryError::Scan(_)));
}

#[test]
fn test_custom_matcher_through_engine() {
    let temp = create_library();
    let mut registry = PluginRegistry::new();
    registry.register_matcher("contains", |term: &str, name: &str| name.contains(term));
    let engine = QueryEngine::with_registry(Arc::new(registry));

    let options = SearchOptions::builder()
        .matcher(Some("contains".to_string()))
        .build()
        .unwrap();
    let results = engine.search("_final", temp.path(), &options).unwrap();
    assert_eq!(names(&results), vec!["report_final.txt"]);
}

#[test]
fn test_cancellation_yields_subset() {
    let temp = TempDir::new().unwrap();
    for i in 0..300 {
        fs::write(temp.path().join(format!("clip{i:03}.mp4")), "x").unwrap();
    }
    let options = SearchOptions::builder().use_regex(true).build().unwrap();

    let engine = Arc::new(QueryEngine::new());
    let full = engine.search("clip", temp.path(), &options).unwrap();
    assert_eq!(full.len(), 300);

    let gate = engine.cancellation_gate().clone();
    let canceller = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(1));
        gate.cancel();
    });
    let partial = engine.search("clip", temp.path(), &options).unwrap();
    canceller.join().unwrap();

    let all: HashSet<&PathBuf> = full.records.iter().map(|r| &r.path).collect();
    let mut seen = HashSet::new();
    for record in &partial.records {
        assert!(all.contains(&record.path));
        assert!(seen.insert(&record.path));
    }
    if partial.len() < full.len() {
        assert_eq!(partial.stopped, Some(StopReason::Cancelled));
    }

    // The gate stays signaled until reset.
    let after = engine.search("clip", temp.path(), &options).unwrap();
    assert_eq!(after.stopped, Some(StopReason::Cancelled));
    engine.cancellation_gate().reset();
    assert_eq!(engine.search("clip", temp.path(), &options).unwrap().len(), 300);
}

#[test]
fn test_timeout_returns_partial() {
    let temp = create_library();
    let options = SearchOptions::builder()
        .use_regex(true)
        .max_duration(Some(Duration::ZERO))
        .build()
        .unwrap();

    let results = QueryEngine::new().search(".", temp.path(), &options).unwrap();
    assert_eq!(results.stopped, Some(StopReason::TimedOut));
    assert!(results.len() < 5);
}

#[test]
fn test_unbounded_timeout_completes() {
    let temp = create_library();
    let options = SearchOptions::builder()
        .use_regex(true)
        .max_duration(Some(Duration::MAX))
        .build()
        .unwrap();

    let results = QueryEngine::new().search(".", temp.path(), &options).unwrap();
    assert_eq!(results.stopped, None);
    assert_eq!(results.len(), 5);
}

#[test]
fn test_cache_reuses_complete_scan() {
    let temp = create_library();
    let engine = QueryEngine::new().with_cache(ResultCache::new());
    let options = SearchOptions::builder()
        .use_regex(true)
        .use_cache(true)
        .build()
        .unwrap();

    let first = engine.search("report", temp.path(), &options).unwrap();
    assert!(!first.from_cache);

    // New files are invisible until the entry is invalidated.
    fs::write(temp.path().join("report_v2.txt"), "v2").unwrap();
    let second = engine.search("report", temp.path(), &options).unwrap();
    assert!(second.from_cache);
    assert_eq!(second.len(), first.len());

    engine.cache().invalidate(temp.path());
    let third = engine.search("report", temp.path(), &options).unwrap();
    assert!(!third.from_cache);
    assert_eq!(third.len(), first.len() + 1);
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_does_not_abort_search() {
    use filetrack_query::HashAlgorithm;
    use std::os::unix::fs::PermissionsExt;

    let temp = create_library();
    let locked = temp.path().join("report_locked.txt");
    fs::write(&locked, "secret").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    let options = SearchOptions::builder()
        .use_regex(true)
        .hash_algorithm(Some(HashAlgorithm::Sha256))
        .build()
        .unwrap();
    let results = QueryEngine::new().search("report", temp.path(), &options).unwrap();

    assert_eq!(results.len(), 3);
    assert!(results.records.iter().all(|r| r.hash.is_some()));

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
}
