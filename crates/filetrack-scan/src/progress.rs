//! Scan progress reporting.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::broadcast;

/// Files between two periodic progress messages.
pub(crate) const PROGRESS_INTERVAL: u64 = 500;

/// Progress information during a scan.
#[derive(Debug, Clone)]
pub struct ScanProgress {
    /// Files found by the walker and not excluded.
    pub files_discovered: u64,
    /// Files whose record has been built.
    pub files_processed: u64,
    /// Total size of processed files.
    pub bytes_processed: u64,
    /// Most recent path seen.
    pub current_path: PathBuf,
    /// Number of warnings so far.
    pub warnings_count: u64,
    /// Time elapsed since scan started.
    pub elapsed: Duration,
}

impl ScanProgress {
    /// Create initial progress state.
    pub fn new() -> Self {
        Self {
            files_discovered: 0,
            files_processed: 0,
            bytes_processed: 0,
            current_path: PathBuf::new(),
            warnings_count: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Calculate processing rate in files per second.
    pub fn files_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.files_processed as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Fraction of discovered files already processed, in `[0, 1]`.
    pub fn fraction_done(&self) -> f64 {
        if self.files_discovered == 0 {
            0.0
        } else {
            (self.files_processed as f64 / self.files_discovered as f64).min(1.0)
        }
    }
}

impl Default for ScanProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared counters for one scan; safe to update from rayon workers.
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    start_time: Instant,
    tx: broadcast::Sender<ScanProgress>,
    files_discovered: AtomicU64,
    files_processed: AtomicU64,
    bytes_processed: AtomicU64,
    warnings_count: AtomicU64,
    current_path: Mutex<PathBuf>,
}

impl ProgressTracker {
    pub fn new(tx: broadcast::Sender<ScanProgress>) -> Self {
        Self {
            start_time: Instant::now(),
            tx,
            files_discovered: AtomicU64::new(0),
            files_processed: AtomicU64::new(0),
            bytes_processed: AtomicU64::new(0),
            warnings_count: AtomicU64::new(0),
            current_path: Mutex::new(PathBuf::new()),
        }
    }

    pub fn file_discovered(&self, path: &Path) {
        let count = self.files_discovered.fetch_add(1, Ordering::Relaxed) + 1;
        if count % PROGRESS_INTERVAL == 0 {
            self.publish(path);
        }
    }

    pub fn file_processed(&self, path: &Path, size: u64) {
        self.bytes_processed.fetch_add(size, Ordering::Relaxed);
        let count = self.files_processed.fetch_add(1, Ordering::Relaxed) + 1;
        if count % PROGRESS_INTERVAL == 0 {
            self.publish(path);
        }
    }

    pub fn warnings(&self, count: usize) {
        self.warnings_count.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Send a final message regardless of the interval.
    pub fn finish(&self, path: &Path) {
        self.publish(path);
    }

    fn publish(&self, path: &Path) {
        if let Ok(mut current) = self.current_path.lock() {
            *current = path.to_path_buf();
        }
        // No receivers is fine.
        let _ = self.tx.send(self.snapshot());
    }

    pub fn snapshot(&self) -> ScanProgress {
        ScanProgress {
            files_discovered: self.files_discovered.load(Ordering::Relaxed),
            files_processed: self.files_processed.load(Ordering::Relaxed),
            bytes_processed: self.bytes_processed.load(Ordering::Relaxed),
            current_path: self
                .current_path
                .lock()
                .map(|p| p.clone())
                .unwrap_or_default(),
            warnings_count: self.warnings_count.load(Ordering::Relaxed),
            elapsed: self.start_time.elapsed(),
        }
    }
}
