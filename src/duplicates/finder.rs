//! Query-versus-canonical matching.
//!
//! # Overview
//!
//! For every query file the [`ComparisonEngine`]:
//!
//! 1. Probes the file; an unreadable query is a source error.
//! 2. Looks up canonical candidates sharing its composite key.
//! 3. Walks the candidates in canonical scan order, skipping the query's
//!    own identity, and, when checksum verification is on, keeps only the
//!    candidates whose checksum equals the query's.
//! 4. Records the query as matched, unique or failed.
//!
//! A checksum failure on either side discards the matches accepted so far
//! and stops the candidate walk for that query.
//!
//! [`CompareSteps`] runs the engine over a query list in batches of
//! `report_frequency` files. Before a batch, checksums it will need are
//! computed on the optional rayon pool; classification itself is always
//! sequential, so results never depend on worker scheduling.

use super::{Classification, ComparisonConfig, ScanIndex, SourceError};
use crate::cache::ChecksumCache;
use crate::scanner::FileRecord;
use crate::session::Step;

/// Classifies query files against a [`ScanIndex`].
#[derive(Debug, Clone, Copy)]
pub struct ComparisonEngine<'a> {
    index: &'a ScanIndex,
    cache: &'a ChecksumCache,
    config: ComparisonConfig,
    pool: Option<&'a rayon::ThreadPool>,
}

impl<'a> ComparisonEngine<'a> {
    /// Create an engine over `index`, hashing through `cache`.
    ///
    /// `config` must build the same keys as the index's config; only its
    /// `verify_checksum` switch may differ.
    #[must_use]
    pub fn new(index: &'a ScanIndex, cache: &'a ChecksumCache, config: ComparisonConfig) -> Self {
        debug_assert!(
            config.same_key_as(index.config()),
            "comparison config does not match the index keys"
        );
        Self {
            index,
            cache,
            config,
            pool: None,
        }
    }

    /// Prefetch checksums of each batch on `pool`.
    #[must_use]
    pub fn with_pool(mut self, pool: Option<&'a rayon::ThreadPool>) -> Self {
        self.pool = pool;
        self
    }

    /// Classify one query file into `out`.
    pub fn classify(&self, query: &FileRecord, out: &mut Classification) {
        out.compared += 1;

        if let Err(e) = self.cache.probe(query) {
            log::warn!("Skipping unreadable query file: {}", e);
            out.source_error_files
                .insert(query.path.clone(), SourceError::Unreadable(e));
            return;
        }

        let identity = query.identity();
        let mut accepted = Vec::new();
        let mut failure = None;

        for candidate in self.index.lookup(&self.config.key_for(query)) {
            if candidate.identity() == identity {
                log::trace!("Skipping self match: {}", query.path.display());
                out.skipped_self += 1;
                continue;
            }

            if !self.config.verify_checksum {
                accepted.push(candidate.clone());
                continue;
            }

            match self.verify(query, candidate) {
                Ok(true) => accepted.push(candidate.clone()),
                Ok(false) => {}
                Err(e) => {
                    if let Some(path) = e.candidate() {
                        out.possible_match_error_files.insert(path.to_path_buf());
                    }
                    failure = Some(e);
                    break;
                }
            }
        }

        if let Some(e) = failure {
            log::warn!("Cannot classify {}: {}", query.path.display(), e);
            out.source_error_files.insert(query.path.clone(), e);
        } else if accepted.is_empty() {
            out.unique.insert(query.path.clone());
        } else {
            log::debug!(
                "{} has {} canonical duplicate(s)",
                query.path.display(),
                accepted.len()
            );
            out.actual_matches.insert(query.path.clone(), accepted);
        }
    }

    fn verify(&self, query: &FileRecord, candidate: &FileRecord) -> Result<bool, SourceError> {
        let expected = self
            .cache
            .get_or_compute(query)
            .map_err(SourceError::QueryChecksum)?;
        let actual =
            self.cache
                .get_or_compute(candidate)
                .map_err(|source| SourceError::CandidateChecksum {
                    candidate: candidate.path.clone(),
                    source,
                })?;
        Ok(expected == actual)
    }

    /// Compute, in parallel, the checksums `batch` will ask for.
    fn prefetch(&self, batch: &[FileRecord]) {
        let Some(pool) = self.pool else {
            return;
        };
        if !self.config.verify_checksum {
            return;
        }

        let mut wanted: Vec<&FileRecord> = Vec::new();
        for query in batch {
            let identity = query.identity();
            let before = wanted.len();
            wanted.extend(
                self.index
                    .lookup(&self.config.key_for(query))
                    .iter()
                    .filter(|candidate| candidate.identity() != identity),
            );
            if wanted.len() > before {
                wanted.push(query);
            }
        }
        self.cache.prefetch(&wanted, pool);
    }

    /// Classify `queries` into `out` step by step.
    ///
    /// `out` is cleared first. Each step covers at most `report_frequency`
    /// query files.
    pub fn compare(
        self,
        queries: &'a [FileRecord],
        out: &'a mut Classification,
        report_frequency: usize,
    ) -> CompareSteps<'a> {
        out.clear();
        CompareSteps {
            engine: self,
            queries,
            out,
            position: 0,
            report_frequency: report_frequency.max(1),
            finished: false,
        }
    }
}

/// A comparison pass in progress. See [`ComparisonEngine::compare`].
///
/// Yields a [`Step`] per batch; the last one has `done` set. Dropping the
/// iterator early keeps the classifications made so far.
pub struct CompareSteps<'a> {
    engine: ComparisonEngine<'a>,
    queries: &'a [FileRecord],
    out: &'a mut Classification,
    position: usize,
    report_frequency: usize,
    finished: bool,
}

impl CompareSteps<'_> {
    /// Run the pass to completion, returning the final step.
    pub fn finish(self) -> Step {
        self.last().unwrap_or_default()
    }
}

impl Iterator for CompareSteps<'_> {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        if self.finished {
            return None;
        }

        let end = (self.position + self.report_frequency).min(self.queries.len());
        let batch = &self.queries[self.position..end];
        self.engine.prefetch(batch);
        for query in batch {
            self.engine.classify(query, self.out);
        }
        self.position = end;

        if self.position < self.queries.len() {
            return Some(Step::progress(self.position));
        }

        self.finished = true;
        log::info!(
            "Compared {} files: {} with duplicates, {} unique, {} errors",
            self.out.compared,
            self.out.actual_matches.len(),
            self.out.unique.len(),
            self.out.source_error_files.len()
        );
        Some(Step::done(self.position))
    }
}
