//! Comparison switches and the composite key built from them.
//!
//! Size always takes part in the key. Every other attribute only takes part
//! when its switch is on; a disabled attribute is stored as `None` so that
//! it never separates two records. Names are NFC-normalized first, so
//! `café.txt` written on macOS (NFD) and on Linux (NFC) share a key.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::scanner::FileRecord;

/// Which attributes must agree for two files to be considered duplicates.
///
/// # Example
///
/// ```
/// use canonmatch::duplicates::ComparisonConfig;
///
/// let config = ComparisonConfig::default().with_name(true).with_parent(true);
/// assert!(config.verify_checksum);
/// assert!(!config.mtime);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    /// File names must match.
    pub name: bool,
    /// Extensions must match.
    pub file_type: bool,
    /// Names of the containing directories must match.
    pub parent: bool,
    /// Paths relative to the scan roots must match.
    pub rel_path: bool,
    /// Creation times must match.
    pub ctime: bool,
    /// Modification times must match.
    pub mtime: bool,
    /// Content checksums must match.
    pub verify_checksum: bool,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            name: false,
            file_type: false,
            parent: false,
            rel_path: false,
            ctime: false,
            mtime: false,
            verify_checksum: true,
        }
    }
}

impl ComparisonConfig {
    /// Require matching file names.
    #[must_use]
    pub fn with_name(mut self, enabled: bool) -> Self {
        self.name = enabled;
        self
    }

    /// Require matching extensions.
    #[must_use]
    pub fn with_file_type(mut self, enabled: bool) -> Self {
        self.file_type = enabled;
        self
    }

    /// Require matching parent directory names.
    #[must_use]
    pub fn with_parent(mut self, enabled: bool) -> Self {
        self.parent = enabled;
        self
    }

    /// Require matching relative paths.
    #[must_use]
    pub fn with_rel_path(mut self, enabled: bool) -> Self {
        self.rel_path = enabled;
        self
    }

    /// Require matching creation times.
    #[must_use]
    pub fn with_ctime(mut self, enabled: bool) -> Self {
        self.ctime = enabled;
        self
    }

    /// Require matching modification times.
    #[must_use]
    pub fn with_mtime(mut self, enabled: bool) -> Self {
        self.mtime = enabled;
        self
    }

    /// Require matching content checksums.
    #[must_use]
    pub fn with_verify_checksum(mut self, enabled: bool) -> Self {
        self.verify_checksum = enabled;
        self
    }

    /// Whether two configs build identical keys.
    ///
    /// Checksum verification does not take part in the key, so an index
    /// built under one config can serve the other.
    #[must_use]
    pub fn same_key_as(&self, other: &Self) -> bool {
        self.with_verify_checksum(false) == other.with_verify_checksum(false)
    }

    /// Build the composite key of a record.
    #[must_use]
    pub fn key_for(&self, record: &FileRecord) -> CompositeKey {
        CompositeKey {
            size: record.size,
            name: self.name.then(|| record.name.nfc().collect()),
            file_type: self.file_type.then(|| record.file_type.clone()),
            parent: self.parent.then(|| record.parent.nfc().collect()),
            rel_path: self
                .rel_path
                .then(|| record.rel_path.to_string_lossy().nfc().collect()),
            created: self.ctime.then_some(record.created),
            modified: self.mtime.then_some(record.modified),
        }
    }
}

/// Hash/equality key of a record under a [`ComparisonConfig`].
///
/// Equal keys make two files *candidates*; only checksum verification says
/// anything about content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeKey {
    size: u64,
    name: Option<String>,
    file_type: Option<String>,
    parent: Option<String>,
    rel_path: Option<String>,
    // Outer None: attribute disabled. Inner None: platform has no birth time.
    created: Option<Option<SystemTime>>,
    modified: Option<SystemTime>,
}

impl CompositeKey {
    /// File size, the one attribute every key carries.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }
}
