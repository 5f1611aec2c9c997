//! Streaming content hashing.
//!
//! Files are read in fixed-size chunks so large media files never have to
//! fit in memory. Read failures are reported as [`HASH_ERROR_SENTINEL`]
//! by [`hash_or_sentinel`], so one unreadable file cannot abort a scan.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

use filetrack_core::{HashAlgorithm, ScanError};

/// Bytes read per chunk while hashing.
pub const HASH_CHUNK_SIZE: usize = 4096;

/// Digest value recorded for files that could not be read.
pub const HASH_ERROR_SENTINEL: &str = "error";

/// Running digest for one of the supported algorithms.
enum DigestState {
    Md5(md5::Context),
    Sha224(Sha224),
    Sha256(Sha256),
    Sha384(Sha384),
    Sha512(Sha512),
    Blake3(Box<blake3::Hasher>),
}

impl DigestState {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Md5 => Self::Md5(md5::Context::new()),
            HashAlgorithm::Sha224 => Self::Sha224(Sha224::new()),
            HashAlgorithm::Sha256 => Self::Sha256(Sha256::new()),
            HashAlgorithm::Sha384 => Self::Sha384(Sha384::new()),
            HashAlgorithm::Sha512 => Self::Sha512(Sha512::new()),
            HashAlgorithm::Blake3 => Self::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Md5(ctx) => ctx.consume(data),
            Self::Sha224(h) => h.update(data),
            Self::Sha256(h) => h.update(data),
            Self::Sha384(h) => h.update(data),
            Self::Sha512(h) => h.update(data),
            Self::Blake3(h) => {
                h.update(data);
            }
        }
    }

    fn finalize_hex(self) -> String {
        match self {
            Self::Md5(ctx) => format!("{:x}", ctx.compute()),
            Self::Sha224(h) => hex::encode(h.finalize()),
            Self::Sha256(h) => hex::encode(h.finalize()),
            Self::Sha384(h) => hex::encode(h.finalize()),
            Self::Sha512(h) => hex::encode(h.finalize()),
            Self::Blake3(h) => h.finalize().to_hex().to_string(),
        }
    }
}

/// Hash a file, propagating I/O errors.
pub fn hash_file(path: &Path, algorithm: HashAlgorithm) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut state = DigestState::new(algorithm);
    let mut buffer = [0u8; HASH_CHUNK_SIZE];

    loop {
        let bytes_read = match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        state.update(&buffer[..bytes_read]);
    }

    Ok(state.finalize_hex())
}

/// Hash a file, returning [`HASH_ERROR_SENTINEL`] if it cannot be read.
pub fn hash_or_sentinel(path: &Path, algorithm: HashAlgorithm) -> String {
    hash_file(path, algorithm).unwrap_or_else(|err| {
        tracing::debug!(path = %path.display(), error = %err, "hash failed");
        HASH_ERROR_SENTINEL.to_string()
    })
}

/// Hash a file with an algorithm given by name.
///
/// The name is validated before the file is touched; an unknown name fails
/// with [`ScanError::UnsupportedAlgorithm`] even if the path does not exist.
pub fn hash_file_named(path: &Path, algorithm: &str) -> Result<String, ScanError> {
    let algorithm = HashAlgorithm::parse(algorithm)?;
    Ok(hash_or_sentinel(path, algorithm))
}
