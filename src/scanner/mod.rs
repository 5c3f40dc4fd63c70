//! Scanner module for directory traversal, filtering and content hashing.
//!
//! This module provides functionality for:
//! - Parallel directory walking using jwalk
//! - Include/exclude filtering on directory components and file names
//! - Content checksums with BLAKE3
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`filter`]: Compiled scan filters (hidden, zero-length, regexes)
//! - [`walker`]: Directory traversal and file inspection
//! - [`outcome`]: Step-wise accumulation of scan results
//! - [`hasher`]: BLAKE3 file hashing behind the [`ContentHasher`] trait
//!
//! # Example
//!
//! ```no_run
//! use canonmatch::scanner::{CompiledFilter, ScanFilter, WalkItem, Walker};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let filter = ScanFilter {
//!     skip_hidden: true,
//!     ..Default::default()
//! };
//! let filter = Arc::new(CompiledFilter::new(&filter).unwrap());
//!
//! for item in Walker::directory(Path::new("."), filter).walk() {
//!     match item {
//!         WalkItem::Included(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         WalkItem::Failed(e) => eprintln!("Warning: {}", e),
//!         WalkItem::Skipped(_) => {}
//!     }
//! }
//! ```

pub mod filter;
pub mod hasher;
pub mod outcome;
pub mod walker;

use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

// Re-export main types
pub use filter::{CompiledFilter, PatternError, ScanFilter, SkipReason};
pub use hasher::{ContentHasher, Hasher, MMAP_THRESHOLD};
pub use outcome::{ScanOutcome, ScanStats, ScanSteps};
pub use walker::{WalkItem, Walker};

/// Snapshot of a scanned file.
///
/// Taken once at scan time and never mutated afterwards. Checksums are not
/// stored here; they live in [`crate::cache::ChecksumCache`], addressed by
/// [`FileRecord::identity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Absolute path to the file
    pub path: PathBuf,
    /// File name (lossy UTF-8)
    pub name: String,
    /// Name of the directory containing the file
    pub parent: String,
    /// File size in bytes
    pub size: u64,
    /// Creation time, when the platform reports one
    pub created: Option<SystemTime>,
    /// Last modification time
    pub modified: SystemTime,
    /// Extension without the leading dot, empty when there is none
    pub file_type: String,
    /// Path relative to the scan root the file was found under
    pub rel_path: PathBuf,
}

/// The identity of a file content snapshot: `(path, size, modified)`.
///
/// Two records with equal identity refer to the same underlying file, which
/// is what self-match detection and checksum caching key on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileIdentity {
    /// Absolute path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modification time
    pub modified: SystemTime,
}

impl FileRecord {
    /// Create a record from a path, size and modification time.
    ///
    /// Name, parent and file type are derived from the path. The relative
    /// path defaults to the file name, as if the file's own directory was
    /// the scan root; use [`FileRecord::with_root`] to change it.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the file
    /// * `size` - File size in bytes
    /// * `modified` - Last modification time
    #[must_use]
    pub fn new(path: PathBuf, size: u64, modified: SystemTime) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let parent = path
            .parent()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file_type = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        let rel_path = PathBuf::from(&name);

        Self {
            path,
            name,
            parent,
            size,
            created: None,
            modified,
            file_type,
            rel_path,
        }
    }

    /// Build a record from filesystem metadata gathered during a scan.
    #[must_use]
    pub fn from_metadata(path: PathBuf, root: &Path, metadata: &Metadata) -> Self {
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let created = metadata.created().ok();
        Self::new(path, metadata.len(), modified)
            .with_root(root)
            .with_created(created)
    }

    /// Recompute the relative path against the given scan root.
    ///
    /// Paths outside the root keep their previous relative path.
    #[must_use]
    pub fn with_root(mut self, root: &Path) -> Self {
        if let Ok(rel) = self.path.strip_prefix(root) {
            self.rel_path = rel.to_path_buf();
        }
        self
    }

    /// Set the creation time.
    #[must_use]
    pub fn with_created(mut self, created: Option<SystemTime>) -> Self {
        self.created = created;
        self
    }

    /// The `(path, size, modified)` identity of this snapshot.
    #[must_use]
    pub fn identity(&self) -> FileIdentity {
        FileIdentity {
            path: self.path.clone(),
            size: self.size,
            modified: self.modified,
        }
    }
}

/// Errors that can occur during directory scanning.
///
/// These are recorded per file; traversal always continues.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Classify an I/O error by kind.
    #[must_use]
    pub fn from_io(path: &Path, error: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Path the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::PermissionDenied(p) | Self::NotFound(p) => p,
            Self::Io { path, .. } => path,
        }
    }
}

/// Errors that can occur while computing a content checksum.
///
/// Cloneable so that a failure can be stored as the reason a query file
/// could not be classified.
#[derive(thiserror::Error, Debug, Clone)]
pub enum ChecksumError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl ChecksumError {
    /// Classify an I/O error by kind.
    #[must_use]
    pub fn from_io(path: &Path, error: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: Arc::new(error),
            },
        }
    }

    /// Path of the file that could not be hashed.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) => p,
            Self::Io { path, .. } => path,
        }
    }
}
