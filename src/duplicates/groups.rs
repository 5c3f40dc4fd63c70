//! Composite-key grouping of the canonical population.
//!
//! # Overview
//!
//! The [`ScanIndex`] is built once per key configuration in a single linear
//! pass over the canonical records. Every query file is then answered by one
//! hash lookup: files whose keys differ can never be duplicates, so only the
//! records in the matching group are ever checksummed.
//!
//! Within a group, records keep canonical scan order, which is the order
//! matches are reported in.
//!
//! # Example
//!
//! ```
//! use canonmatch::duplicates::{ComparisonConfig, ScanIndex};
//! use canonmatch::scanner::FileRecord;
//! use std::path::PathBuf;
//! use std::time::SystemTime;
//!
//! let records = vec![
//!     FileRecord::new(PathBuf::from("/canon/a.txt"), 1024, SystemTime::now()),
//!     FileRecord::new(PathBuf::from("/canon/b.txt"), 1024, SystemTime::now()),
//!     FileRecord::new(PathBuf::from("/canon/c.txt"), 2048, SystemTime::now()),
//! ];
//!
//! let index = ScanIndex::build(&records, ComparisonConfig::default());
//! assert_eq!(index.len(), 3);
//! assert_eq!(index.group_count(), 2);
//!
//! let query = FileRecord::new(PathBuf::from("/query/x.txt"), 1024, SystemTime::now());
//! assert_eq!(index.candidates_for(&query).len(), 2);
//! ```

use std::collections::HashMap;

use super::{ComparisonConfig, CompositeKey};
use crate::scanner::FileRecord;

/// Canonical records grouped by [`CompositeKey`].
#[derive(Debug, Clone)]
pub struct ScanIndex {
    config: ComparisonConfig,
    groups: HashMap<CompositeKey, Vec<FileRecord>>,
    len: usize,
}

impl ScanIndex {
    /// Group `records` by their key under `config`.
    #[must_use]
    pub fn build(records: &[FileRecord], config: ComparisonConfig) -> Self {
        let mut groups: HashMap<CompositeKey, Vec<FileRecord>> = HashMap::new();
        for record in records {
            groups
                .entry(config.key_for(record))
                .or_default()
                .push(record.clone());
        }

        log::debug!(
            "Indexed {} canonical files into {} key groups",
            records.len(),
            groups.len()
        );

        Self {
            config,
            groups,
            len: records.len(),
        }
    }

    /// Records sharing `key`, in canonical scan order. Empty if none.
    #[must_use]
    pub fn lookup(&self, key: &CompositeKey) -> &[FileRecord] {
        self.groups.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Records sharing the key of `record` under this index's config.
    #[must_use]
    pub fn candidates_for(&self, record: &FileRecord) -> &[FileRecord] {
        self.lookup(&self.config.key_for(record))
    }

    /// The configuration the keys were built with.
    #[must_use]
    pub fn config(&self) -> &ComparisonConfig {
        &self.config
    }

    /// Number of indexed records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the index holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Size of the largest group, the worst case candidate count of a query.
    #[must_use]
    pub fn largest_group(&self) -> usize {
        self.groups.values().map(Vec::len).max().unwrap_or(0)
    }
}
