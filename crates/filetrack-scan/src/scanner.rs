//! Directory scanner: serial jwalk enumeration, parallel record building.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use compact_str::CompactString;
use jwalk::{Parallelism, WalkDir};
use rayon::prelude::*;
use tokio::sync::broadcast;

use filetrack_core::{
    CancellationGate, Checkpoint, FileRecord, ScanConfig, ScanError, ScanStats, ScanWarning,
    StopReason, UNKNOWN_MIME, WarningKind, classify,
};

use crate::hasher::{HASH_ERROR_SENTINEL, hash_file};
use crate::metadata::MetadataExtractor;
use crate::progress::{ProgressTracker, ScanProgress};

/// Records and bookkeeping produced by one scan.
#[derive(Debug, Clone)]
pub struct ScanOutput {
    /// Canonicalized scan root.
    pub root: PathBuf,
    /// Records in enumeration order.
    pub records: Vec<FileRecord>,
    pub stats: ScanStats,
    pub warnings: Vec<ScanWarning>,
    /// Set when the scan ended early; `records` is then partial.
    pub stopped: Option<StopReason>,
    pub duration: Duration,
}

impl ScanOutput {
    /// Check if the scan visited every file.
    pub fn is_complete(&self) -> bool {
        self.stopped.is_none()
    }
}

/// A file that survived exclusion and stat, waiting for its record.
struct Candidate {
    name: CompactString,
    path: PathBuf,
    size_bytes: u64,
    modified_time: f64,
}

/// Scanner producing [`FileRecord`]s for a directory tree.
#[derive(Debug)]
pub struct Scanner {
    extractor: MetadataExtractor,
    gate: CancellationGate,
    progress_tx: broadcast::Sender<ScanProgress>,
}

impl Scanner {
    /// Create a scanner with the built-in extractors and a fresh gate.
    pub fn new() -> Self {
        Self::with_extractor(MetadataExtractor::default())
    }

    /// Create a scanner that uses the given metadata extractor.
    pub fn with_extractor(extractor: MetadataExtractor) -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self {
            extractor,
            gate: CancellationGate::new(),
            progress_tx,
        }
    }

    /// Share an existing cancellation gate.
    pub fn with_gate(mut self, gate: CancellationGate) -> Self {
        self.gate = gate;
        self
    }

    /// The gate checked by [`Scanner::scan`].
    pub fn gate(&self) -> &CancellationGate {
        &self.gate
    }

    pub fn extractor(&self) -> &MetadataExtractor {
        &self.extractor
    }

    /// Subscribe to scan progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgress> {
        self.progress_tx.subscribe()
    }

    /// Scan `config.root`, honoring `config.max_duration`.
    pub fn scan(&self, config: &ScanConfig) -> Result<ScanOutput, ScanError> {
        let checkpoint = self.gate.checkpoint(config.max_duration);
        self.scan_with(config, &checkpoint)
    }

    /// Scan using a caller-supplied checkpoint instead of the config budget.
    pub fn scan_with(
        &self,
        config: &ScanConfig,
        checkpoint: &Checkpoint,
    ) -> Result<ScanOutput, ScanError> {
        let root = validate_root(&config.root)?;
        let pool = match config.threads {
            0 => None,
            n => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| ScanError::InvalidConfig {
                        message: format!("cannot start {n} worker threads: {e}"),
                    })?,
            ),
        };

        if let Some(names) = &config.extractors {
            let registered = self.extractor.registry().extractor_names();
            for name in names.iter().filter(|n| !registered.contains(&n.as_str())) {
                tracing::debug!(extractor = %name, "requested extractor is not registered");
            }
        }

        let tracker = ProgressTracker::new(self.progress_tx.clone());
        let mut stats = ScanStats::new();
        let mut warnings = Vec::new();

        let (candidates, mut stopped) =
            self.collect_candidates(config, &root, checkpoint, &tracker, &mut stats, &mut warnings);

        let dropped = AtomicBool::new(false);
        let build = || {
            candidates
                .par_iter()
                .map(|candidate| {
                    if checkpoint.should_stop() {
                        dropped.store(true, Ordering::Relaxed);
                        return None;
                    }
                    let built = self.build_record(candidate, config);
                    tracker.file_processed(&candidate.path, candidate.size_bytes);
                    Some(built)
                })
                .collect::<Vec<_>>()
        };
        let built = match &pool {
            Some(pool) => pool.install(build),
            None => build(),
        };

        if stopped.is_none() && dropped.load(Ordering::Relaxed) {
            // Workers saw the stop; report whichever reason is current.
            stopped = Some(checkpoint.check().unwrap_or(StopReason::Cancelled));
        }

        let mut records = Vec::with_capacity(built.len());
        for (record, record_warnings) in built.into_iter().flatten() {
            stats.record_file(&record.path, record.size_bytes, record.modified_time);
            tracker.warnings(record_warnings.len());
            warnings.extend(record_warnings);
            records.push(record);
        }

        tracker.finish(&root);
        let duration = tracker.elapsed();

        match stopped {
            Some(reason) => tracing::info!(
                root = %root.display(),
                records = records.len(),
                ?reason,
                "scan stopped early"
            ),
            None => tracing::info!(
                root = %root.display(),
                records = records.len(),
                warnings = warnings.len(),
                elapsed_ms = duration.as_millis() as u64,
                "scan finished"
            ),
        }

        Ok(ScanOutput {
            root,
            records,
            stats,
            warnings,
            stopped,
            duration,
        })
    }

    /// Walk the tree on the calling thread, in file-name order.
    fn collect_candidates(
        &self,
        config: &ScanConfig,
        root: &Path,
        checkpoint: &Checkpoint,
        tracker: &ProgressTracker,
        stats: &mut ScanStats,
        warnings: &mut Vec<ScanWarning>,
    ) -> (Vec<Candidate>, Option<StopReason>) {
        let walk_checkpoint = checkpoint.clone();
        let walker = WalkDir::new(root)
            .parallelism(Parallelism::Serial)
            .sort(true)
            .skip_hidden(!config.include_hidden)
            .follow_links(config.follow_symlinks)
            .max_depth(if config.recursive { usize::MAX } else { 1 })
            .process_read_dir(move |_depth, _dir_path, _state, children| {
                // Do not descend once stopped.
                if walk_checkpoint.should_stop() {
                    children.clear();
                }
            });

        let mut candidates = Vec::new();

        for entry_result in walker {
            if let Some(reason) = checkpoint.check() {
                return (candidates, Some(reason));
            }

            let entry = match entry_result {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                    tracing::warn!(path = %path.display(), error = %err, "cannot read entry");
                    warnings.push(ScanWarning::new(path, err.to_string(), WarningKind::ReadError));
                    tracker.warnings(1);
                    continue;
                }
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                stats.record_dir();
                continue;
            }

            let path = entry.path();
            let name = entry.file_name().to_string_lossy();
            stats.files_seen += 1;

            if config.is_excluded(&name) {
                tracing::debug!(path = %path.display(), "excluded by extension");
                stats.files_excluded += 1;
                continue;
            }

            // Follows symlinks; a link is kept only if it resolves to a file.
            let metadata = match fs::metadata(&path) {
                Ok(metadata) => metadata,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "cannot stat file");
                    warnings.push(ScanWarning::new(
                        &path,
                        err.to_string(),
                        WarningKind::MetadataError,
                    ));
                    tracker.warnings(1);
                    stats.files_unreadable += 1;
                    continue;
                }
            };
            if !metadata.is_file() {
                tracing::debug!(path = %path.display(), "not a regular file");
                continue;
            }

            tracker.file_discovered(&path);
            candidates.push(Candidate {
                name: CompactString::new(&name),
                path,
                size_bytes: metadata.len(),
                modified_time: metadata.modified().map(epoch_seconds).unwrap_or(0.0),
            });
        }

        (candidates, None)
    }

    /// Build one record: MIME, category, digest, metadata.
    fn build_record(
        &self,
        candidate: &Candidate,
        config: &ScanConfig,
    ) -> (FileRecord, Vec<ScanWarning>) {
        let mut warnings = Vec::new();
        let mime_type = mime_guess::from_path(&candidate.path)
            .first_raw()
            .unwrap_or(UNKNOWN_MIME);

        let hash = config.hash_algorithm.map(|algorithm| {
            hash_file(&candidate.path, algorithm).unwrap_or_else(|err| {
                tracing::warn!(path = %candidate.path.display(), error = %err, "cannot hash file");
                warnings.push(ScanWarning::hash_error(&candidate.path, &err));
                HASH_ERROR_SENTINEL.to_string()
            })
        });

        let extra_metadata = config.extract_metadata.then(|| {
            let extraction = self.extractor.extract(&candidate.path, mime_type, config);
            warnings.extend(extraction.warnings);
            extraction.metadata
        });

        let record = FileRecord {
            name: candidate.name.clone(),
            path: candidate.path.clone(),
            size_bytes: candidate.size_bytes,
            modified_time: candidate.modified_time,
            mime_type: CompactString::new(mime_type),
            content_type: classify(&candidate.name),
            hash,
            extra_metadata,
        };
        (record, warnings)
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Check that the root exists, is a directory and can be listed.
fn validate_root(root: &Path) -> Result<PathBuf, ScanError> {
    let canonical = root
        .canonicalize()
        .map_err(|err| ScanError::location(root, &err))?;
    if !canonical.is_dir() {
        return Err(ScanError::InvalidLocation {
            path: root.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }
    fs::read_dir(&canonical).map_err(|err| ScanError::location(root, &err))?;
    Ok(canonical)
}

/// Seconds since the Unix epoch; negative for earlier times.
fn epoch_seconds(time: SystemTime) -> f64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => after.as_secs_f64(),
        Err(err) => -err.duration().as_secs_f64(),
    }
}
