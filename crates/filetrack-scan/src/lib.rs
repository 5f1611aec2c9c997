//! File system scanning engine for filetrack.
//!
//! Walks a directory, turns every non-excluded file into a
//! [`FileRecord`], and optionally hashes it and merges metadata from the
//! built-in decoders and the plugin registry.
//!
//! # Example
//!
//! ```rust,no_run
//! use filetrack_scan::{HashAlgorithm, ScanConfig, Scanner};
//!
//! let config = ScanConfig::builder()
//!     .root("/path/to/media")
//!     .hash_algorithm(HashAlgorithm::Sha256)
//!     .build()
//!     .unwrap();
//! let output = Scanner::new().scan(&config).unwrap();
//!
//! for record in &output.records {
//!     println!("{} {:?}", record.path.display(), record.hash);
//! }
//! ```
//!
//! # Progress Monitoring
//!
//! ```rust,no_run
//! use filetrack_scan::Scanner;
//!
//! let scanner = Scanner::new();
//! let mut progress_rx = scanner.subscribe();
//!
//! std::thread::spawn(move || {
//!     while let Ok(progress) = progress_rx.blocking_recv() {
//!         println!("Processed {} files", progress.files_processed);
//!     }
//! });
//! ```

mod hasher;
mod metadata;
mod progress;
mod scanner;

pub use hasher::{
    HASH_CHUNK_SIZE, HASH_ERROR_SENTINEL, hash_file, hash_file_named, hash_or_sentinel,
};
pub use metadata::{
    Capabilities, Extraction, ImageCapability, MediaCapability, MetadataExtractor,
};
pub use progress::ScanProgress;
pub use scanner::{ScanOutput, Scanner};

// Re-export core types for convenience
pub use filetrack_core::{
    CancellationGate, ContentType, FileRecord, HashAlgorithm, Metadata, PluginRegistry,
    ScanConfig, ScanError, ScanStats, ScanWarning, StopReason, WarningKind,
};
