//! Classification of query files.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::scanner::{ChecksumError, FileRecord};

/// Why a query file could not be classified.
#[derive(thiserror::Error, Debug, Clone)]
pub enum SourceError {
    /// The query file could no longer be read when its turn came.
    #[error("Query file is unreadable: {0}")]
    Unreadable(#[source] ChecksumError),

    /// The checksum of the query file failed.
    #[error("Failed to checksum query file: {0}")]
    QueryChecksum(#[source] ChecksumError),

    /// The checksum of a canonical candidate failed.
    #[error("Failed to checksum candidate {}: {source}", candidate.display())]
    CandidateChecksum {
        /// The canonical file that could not be hashed
        candidate: PathBuf,
        /// The underlying checksum error
        #[source]
        source: ChecksumError,
    },
}

impl SourceError {
    /// The canonical file at fault, if the failure was on the candidate side.
    #[must_use]
    pub fn candidate(&self) -> Option<&Path> {
        match self {
            Self::CandidateChecksum { candidate, .. } => Some(candidate),
            Self::Unreadable(_) | Self::QueryChecksum(_) => None,
        }
    }
}

/// Outcome of a comparison pass.
///
/// After a complete pass every query path is in exactly one of
/// `actual_matches`, `unique` and `source_error_files`.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// Query path to its canonical duplicates, in canonical scan order
    pub actual_matches: BTreeMap<PathBuf, Vec<FileRecord>>,
    /// Query paths with no canonical duplicate
    pub unique: BTreeSet<PathBuf>,
    /// Query paths that could not be classified, with the reason
    pub source_error_files: BTreeMap<PathBuf, SourceError>,
    /// Canonical files whose checksum failed during comparison
    pub possible_match_error_files: BTreeSet<PathBuf>,
    /// Times a query file met itself among its candidates
    pub skipped_self: usize,
    /// Query files processed so far
    pub compared: usize,
}

impl Classification {
    /// Reset to the empty state.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Number of query files with at least one duplicate.
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.actual_matches.len()
    }

    /// Number of query files placed in any category.
    #[must_use]
    pub fn classified_count(&self) -> usize {
        self.actual_matches.len() + self.unique.len() + self.source_error_files.len()
    }

    /// Whether `path` has been placed in some category.
    #[must_use]
    pub fn is_classified(&self, path: &Path) -> bool {
        self.actual_matches.contains_key(path)
            || self.unique.contains(path)
            || self.source_error_files.contains_key(path)
    }

    /// Total size of the query files that have duplicates.
    #[must_use]
    pub fn duplicate_bytes(&self) -> u64 {
        self.actual_matches
            .values()
            .filter_map(|matches| matches.first())
            .map(|record| record.size)
            .sum()
    }
}
