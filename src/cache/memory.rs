//! In-memory checksum cache keyed by file identity.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rayon::prelude::*;

use super::CacheEntry;
use crate::scanner::{ChecksumError, ContentHasher, FileIdentity, FileRecord};

type Slot = Arc<Mutex<CacheEntry>>;

/// Memoized content checksums with a reuse counter.
///
/// A map mutex guards the slot table only; each identity has its own slot
/// mutex, held while that file is hashed. Concurrent lookups of the same
/// identity therefore wait for one computation, while different identities
/// hash in parallel.
///
/// Failed computations are not stored.
///
/// # Example
///
/// ```no_run
/// use canonmatch::cache::ChecksumCache;
/// use canonmatch::scanner::{FileRecord, Hasher};
/// use std::path::PathBuf;
/// use std::sync::Arc;
/// use std::time::SystemTime;
///
/// let cache = ChecksumCache::new(Arc::new(Hasher::new()));
/// let record = FileRecord::new(PathBuf::from("/tmp/a.txt"), 5, SystemTime::now());
///
/// let first = cache.get_or_compute(&record).unwrap();
/// let second = cache.get_or_compute(&record).unwrap();
/// assert_eq!(first, second);
/// assert_eq!(cache.reuse_count(), 1);
/// ```
pub struct ChecksumCache {
    hasher: Arc<dyn ContentHasher>,
    slots: Mutex<HashMap<FileIdentity, Slot>>,
    reused: AtomicUsize,
    computed: AtomicUsize,
}

impl std::fmt::Debug for ChecksumCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChecksumCache")
            .field("entries", &self.len())
            .field("reused", &self.reuse_count())
            .field("computed", &self.computed_count())
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ChecksumCache {
    /// Create an empty cache backed by `hasher`.
    #[must_use]
    pub fn new(hasher: Arc<dyn ContentHasher>) -> Self {
        Self {
            hasher,
            slots: Mutex::new(HashMap::new()),
            reused: AtomicUsize::new(0),
            computed: AtomicUsize::new(0),
        }
    }

    fn slot(&self, identity: FileIdentity) -> Slot {
        Arc::clone(lock(&self.slots).entry(identity).or_default())
    }

    /// Return the checksum of `record`, computing it on first use.
    ///
    /// A hit on a value some earlier lookup already received counts as one
    /// reuse.
    ///
    /// # Errors
    ///
    /// Returns the hasher's [`ChecksumError`]; nothing is stored in that case.
    pub fn get_or_compute(&self, record: &FileRecord) -> Result<String, ChecksumError> {
        let slot = self.slot(record.identity());
        let mut entry = lock(&slot);

        if let Some((checksum, reused)) = entry.serve() {
            if reused {
                self.reused.fetch_add(1, Ordering::Relaxed);
                log::trace!("Checksum reused: {}", record.path.display());
            }
            return Ok(checksum);
        }

        let checksum = self.compute(record)?;
        entry.fill(checksum.clone(), true);
        Ok(checksum)
    }

    /// Compute the missing checksums of `records` on `pool`.
    ///
    /// Values computed here are not counted as served, so the first
    /// [`get_or_compute`](Self::get_or_compute) for each of them is not a
    /// reuse. Failures are logged and left for the later lookup to report.
    pub fn prefetch(&self, records: &[&FileRecord], pool: &rayon::ThreadPool) {
        if records.is_empty() {
            return;
        }
        log::trace!("Prefetching up to {} checksums", records.len());

        pool.install(|| {
            records.par_iter().for_each(|record| {
                let slot = self.slot(record.identity());
                let mut entry = lock(&slot);
                if entry.is_filled() {
                    return;
                }
                // Failures surface again on lookup
                if let Ok(checksum) = self.compute(record) {
                    entry.fill(checksum, false);
                }
            });
        });
    }

    /// Check that the file behind `record` can still be read.
    ///
    /// # Errors
    ///
    /// Returns the hasher's [`ChecksumError`] when it cannot.
    pub fn probe(&self, record: &FileRecord) -> Result<(), ChecksumError> {
        self.hasher.probe(&record.path)
    }

    /// The stored checksum of `identity`, without computing or counting.
    #[must_use]
    pub fn peek(&self, identity: &FileIdentity) -> Option<String> {
        let slot = lock(&self.slots).get(identity).cloned()?;
        let entry = lock(&slot);
        entry.checksum.clone()
    }

    /// Number of lookups answered from a value an earlier lookup received.
    #[must_use]
    pub fn reuse_count(&self) -> usize {
        self.reused.load(Ordering::Relaxed)
    }

    /// Number of successful hasher invocations.
    #[must_use]
    pub fn computed_count(&self) -> usize {
        self.computed.load(Ordering::Relaxed)
    }

    /// Number of stored checksums.
    #[must_use]
    pub fn len(&self) -> usize {
        let slots: Vec<Slot> = lock(&self.slots).values().cloned().collect();
        slots.iter().filter(|slot| lock(slot).is_filled()).count()
    }

    /// Whether no checksum is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn compute(&self, record: &FileRecord) -> Result<String, ChecksumError> {
        match self.hasher.checksum(&record.path) {
            Ok(checksum) => {
                self.computed.fetch_add(1, Ordering::Relaxed);
                log::trace!("Checksum computed: {}", record.path.display());
                Ok(checksum)
            }
            Err(e) => {
                log::debug!("Failed to checksum {}: {}", record.path.display(), e);
                Err(e)
            }
        }
    }
}
