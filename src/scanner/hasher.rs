//! BLAKE3 file hasher with streaming support.
//!
//! # Overview
//!
//! The comparison engine only needs a checksum string per file, so hashing
//! sits behind the [`ContentHasher`] trait. [`Hasher`] is the BLAKE3
//! implementation: small files are streamed through a fixed buffer, large
//! files are memory-mapped and hashed across the rayon pool.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use super::ChecksumError;

/// Files at least this large are hashed through a memory map.
pub const MMAP_THRESHOLD: u64 = 16 * 1024 * 1024;

/// Read buffer for streamed hashing.
const BUFFER_SIZE: usize = 64 * 1024;

/// Computes content checksums.
///
/// Implementations must be usable from several threads at once, since
/// checksum prefetch runs on a worker pool.
pub trait ContentHasher: Send + Sync {
    /// Compute the checksum of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ChecksumError`] when the file cannot be read.
    fn checksum(&self, path: &Path) -> Result<String, ChecksumError>;

    /// Check that `path` is still a readable regular file.
    ///
    /// # Errors
    ///
    /// Returns [`ChecksumError`] when the file is gone or unreadable.
    fn probe(&self, path: &Path) -> Result<(), ChecksumError> {
        match std::fs::metadata(path) {
            Ok(metadata) if metadata.is_file() => File::open(path)
                .map(drop)
                .map_err(|e| ChecksumError::from_io(path, e)),
            Ok(_) => Err(ChecksumError::Io {
                path: path.to_path_buf(),
                source: Arc::new(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "not a regular file",
                )),
            }),
            Err(e) => Err(ChecksumError::from_io(path, e)),
        }
    }
}

/// BLAKE3 content hasher.
#[derive(Debug, Clone)]
pub struct Hasher {
    mmap_threshold: u64,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher with the default memory-map threshold.
    #[must_use]
    pub fn new() -> Self {
        Self {
            mmap_threshold: MMAP_THRESHOLD,
        }
    }

    /// Override the size at which files are memory-mapped.
    #[must_use]
    pub fn with_mmap_threshold(mut self, bytes: u64) -> Self {
        self.mmap_threshold = bytes;
        self
    }

    /// Hash the full content of a file.
    ///
    /// # Errors
    ///
    /// Returns [`ChecksumError`] if the file cannot be opened or read.
    pub fn hash_file(&self, path: &Path) -> Result<blake3::Hash, ChecksumError> {
        let mut file = File::open(path).map_err(|e| ChecksumError::from_io(path, e))?;
        let len = file
            .metadata()
            .map_err(|e| ChecksumError::from_io(path, e))?
            .len();

        let mut hasher = blake3::Hasher::new();

        if len >= self.mmap_threshold {
            log::trace!("Hashing {} via mmap ({} bytes)", path.display(), len);
            hasher
                .update_mmap_rayon(path)
                .map_err(|e| ChecksumError::from_io(path, e))?;
            return Ok(hasher.finalize());
        }

        let mut buffer = vec![0u8; BUFFER_SIZE];
        loop {
            let read = match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(ChecksumError::from_io(path, e)),
            };
            hasher.update(&buffer[..read]);
        }

        Ok(hasher.finalize())
    }
}

impl ContentHasher for Hasher {
    fn checksum(&self, path: &Path) -> Result<String, ChecksumError> {
        self.hash_file(path).map(|hash| hash.to_hex().to_string())
    }
}
