//! Shared cache of completed scans.
//!
//! Each key owns its own mutex, so concurrent searches of different
//! locations never wait on each other, while concurrent searches of the
//! same location scan once and share the result.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use dashmap::DashMap;

use filetrack_core::{HashAlgorithm, ScanConfig, ScanError};
use filetrack_scan::ScanOutput;

/// Everything about a scan that changes its records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub location: PathBuf,
    pub recursive: bool,
    pub hash_algorithm: Option<HashAlgorithm>,
    pub extract_metadata: bool,
    pub excluded_extensions: Vec<String>,
    pub include_hidden: bool,
    pub follow_symlinks: bool,
    pub extractors: Option<Vec<String>>,
}

impl CacheKey {
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            location: canonical(&config.root),
            recursive: config.recursive,
            hash_algorithm: config.hash_algorithm,
            extract_metadata: config.extract_metadata,
            excluded_extensions: config.excluded_extensions.clone(),
            include_hidden: config.include_hidden,
            follow_symlinks: config.follow_symlinks,
            extractors: config.extractors.clone(),
        }
    }
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

#[derive(Debug)]
struct CachedScan {
    output: Arc<ScanOutput>,
    stored_at: Instant,
}

type Slot = Arc<Mutex<Option<CachedScan>>>;

/// Cache of complete scans keyed by [`CacheKey`].
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: DashMap<CacheKey, Slot>,
    ttl: Option<Duration>,
}

impl ResultCache {
    /// Create a cache whose entries never expire.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache whose entries expire `ttl` after being stored.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: Some(ttl),
        }
    }

    /// Return the cached scan for `key`, or run `scan` under the key's lock.
    ///
    /// The flag is true on a cache hit. Interrupted scans are returned but
    /// not stored, and a key left with nothing stored is removed.
    pub fn get_or_scan<F>(&self, key: CacheKey, scan: F) -> Result<(Arc<ScanOutput>, bool), ScanError>
    where
        F: FnOnce() -> Result<ScanOutput, ScanError>,
    {
        // Clone the slot so the map shard is released before locking.
        let slot: Slot = Arc::clone(&self.entries.entry(key.clone()).or_default());
        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(cached) = guard.as_ref() {
            if self.is_fresh(cached) {
                return Ok((Arc::clone(&cached.output), true));
            }
            tracing::debug!(root = %cached.output.root.display(), "cached scan expired");
        }

        let output = match scan() {
            Ok(output) => Arc::new(output),
            Err(err) => {
                *guard = None;
                drop(guard);
                self.discard_empty(&key, &slot);
                return Err(err);
            }
        };

        if output.is_complete() {
            *guard = Some(CachedScan {
                output: Arc::clone(&output),
                stored_at: Instant::now(),
            });
        } else {
            *guard = None;
            drop(guard);
            self.discard_empty(&key, &slot);
        }
        Ok((output, false))
    }

    /// Remove an empty slot unless another caller is waiting on it.
    fn discard_empty(&self, key: &CacheKey, slot: &Slot) {
        // One reference is held by the map, one by the caller.
        self.entries.remove_if(key, |_, existing| {
            Arc::ptr_eq(existing, slot) && Arc::strong_count(slot) == 2
        });
    }

    fn is_fresh(&self, cached: &CachedScan) -> bool {
        self.ttl
            .is_none_or(|ttl| cached.stored_at.elapsed() < ttl)
    }

    /// Drop every entry for `location`. Returns the number of keys removed.
    pub fn invalidate(&self, location: &Path) -> usize {
        let location = canonical(location);
        let before = self.entries.len();
        self.entries.retain(|key, _| key.location != location);
        before - self.entries.len()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of keys holding a stored scan.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| {
                entry
                    .value()
                    .lock()
                    .map(|slot| slot.is_some())
                    .unwrap_or(false)
            })
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }
}
