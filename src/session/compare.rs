//! The comparison session.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{SessionOptions, Step};
use crate::cache::ChecksumCache;
use crate::duplicates::{
    Classification, CompareSteps, ComparisonConfig, ComparisonEngine, ScanIndex, SourceError,
};
use crate::scanner::{
    CompiledFilter, ContentHasher, FileRecord, Hasher, PatternError, ScanOutcome, ScanSteps,
    Walker,
};

/// Invalid session options. Nothing is scanned when these occur.
#[derive(thiserror::Error, Debug)]
pub enum ConfigurationError {
    /// An include or exclude pattern does not compile.
    #[error(transparent)]
    InvalidRegex(#[from] PatternError),

    /// The canonical directory does not exist.
    #[error("Canonical directory not found: {}", .0.display())]
    CanonicalNotFound(PathBuf),

    /// The canonical path exists but is not a directory.
    #[error("Canonical path is not a directory: {}", .0.display())]
    CanonicalNotADirectory(PathBuf),

    /// The report frequency is zero.
    #[error("Report frequency must be at least 1")]
    InvalidReportFrequency,
}

/// Session operations called out of order.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Comparison needs both scans to have run to completion.
    #[error("The {0} scan has not completed")]
    ScanIncomplete(&'static str),

    /// Without the checksum, size alone would decide a match.
    #[error("Skipping the checksum requires the name check")]
    UnverifiedSizeOnly,
}

/// One query-versus-canonical comparison.
///
/// # Example
///
/// ```no_run
/// use canonmatch::duplicates::ComparisonConfig;
/// use canonmatch::session::{CompareSession, SessionOptions};
/// use std::path::PathBuf;
///
/// let options = SessionOptions::new(vec![PathBuf::from("/incoming")], "/archive");
/// let mut session = CompareSession::new(options)?;
///
/// session.run_query_scan().finish();
/// session.run_canonical_scan().finish();
/// session.run_compare(ComparisonConfig::default())?.finish();
///
/// for (query, matches) in session.actual_matches() {
///     println!("{} duplicates {}", query.display(), matches[0].path.display());
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct CompareSession {
    query_items: Vec<PathBuf>,
    canonical_dir: PathBuf,
    filter: Arc<CompiledFilter>,
    report_frequency: usize,
    cache: ChecksumCache,
    pool: Option<rayon::ThreadPool>,
    query: ScanOutcome,
    canonical: ScanOutcome,
    index: Option<ScanIndex>,
    classification: Classification,
}

impl CompareSession {
    /// Validate `options` and create a session hashing with BLAKE3.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if the canonical directory is missing
    /// or not a directory, the report frequency is zero, or a pattern does
    /// not compile.
    pub fn new(options: SessionOptions) -> Result<Self, ConfigurationError> {
        Self::with_hasher(options, Arc::new(Hasher::new()))
    }

    /// Validate `options` and create a session using `hasher` for checksums.
    ///
    /// # Errors
    ///
    /// See [`CompareSession::new`].
    pub fn with_hasher(
        options: SessionOptions,
        hasher: Arc<dyn ContentHasher>,
    ) -> Result<Self, ConfigurationError> {
        if options.report_frequency == 0 {
            return Err(ConfigurationError::InvalidReportFrequency);
        }

        let canonical_dir = absolute(&options.canonical_dir);
        match fs::metadata(&canonical_dir) {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => return Err(ConfigurationError::CanonicalNotADirectory(canonical_dir)),
            Err(_) => return Err(ConfigurationError::CanonicalNotFound(canonical_dir)),
        }

        let filter = Arc::new(CompiledFilter::new(&options.filter)?);

        let pool = if options.io_threads > 1 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(options.io_threads)
                .thread_name(|i| format!("canonmatch-io-{i}"))
                .build()
            {
                Ok(pool) => Some(pool),
                Err(e) => {
                    log::warn!("Failed to create I/O thread pool, hashing sequentially: {}", e);
                    None
                }
            }
        } else {
            None
        };

        log::debug!(
            "Session: {} query item(s) against {}",
            options.query_items.len(),
            canonical_dir.display()
        );

        Ok(Self {
            query_items: options.query_items.iter().map(|p| absolute(p)).collect(),
            canonical_dir,
            filter,
            report_frequency: options.report_frequency,
            cache: ChecksumCache::new(hasher),
            pool,
            query: ScanOutcome::default(),
            canonical: ScanOutcome::default(),
            index: None,
            classification: Classification::default(),
        })
    }

    /// Scan the query items.
    ///
    /// Directories, and links to them, are walked; any other item is
    /// inspected as a single file. A missing item is recorded as a scan
    /// error. Any previous query scan and classification are discarded.
    pub fn run_query_scan(&mut self) -> ScanSteps<'_> {
        self.classification.clear();

        let filter = Arc::clone(&self.filter);
        let items = self.query_items.clone().into_iter().flat_map(move |item| {
            // A link to a directory is walked; links below it are not followed
            let is_dir = fs::metadata(&item).is_ok_and(|m| m.is_dir());
            if is_dir {
                Walker::directory(&item, Arc::clone(&filter)).walk()
            } else {
                Walker::files(vec![item], Arc::clone(&filter)).walk()
            }
        });

        log::info!("Scanning {} query item(s)", self.query_items.len());
        ScanSteps::new(Box::new(items), &mut self.query, self.report_frequency)
    }

    /// Scan the canonical directory.
    ///
    /// Any previous canonical scan, index and classification are discarded.
    pub fn run_canonical_scan(&mut self) -> ScanSteps<'_> {
        self.classification.clear();
        self.index = None;

        log::info!("Scanning canonical directory {}", self.canonical_dir.display());
        let items = Walker::directory(&self.canonical_dir, Arc::clone(&self.filter)).walk();
        ScanSteps::new(items, &mut self.canonical, self.report_frequency)
    }

    /// Classify every query file under `config`.
    ///
    /// The canonical index is rebuilt only when `config` builds different
    /// keys than the current one. Checksums computed by earlier runs are
    /// reused.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnverifiedSizeOnly`] if `config` skips the
    /// checksum without the name check, and [`SessionError::ScanIncomplete`]
    /// unless both scans have run to completion.
    pub fn run_compare(
        &mut self,
        config: ComparisonConfig,
    ) -> Result<CompareSteps<'_>, SessionError> {
        if !config.verify_checksum && !config.name {
            return Err(SessionError::UnverifiedSizeOnly);
        }
        if !self.query.is_complete() {
            return Err(SessionError::ScanIncomplete("query"));
        }
        if !self.canonical.is_complete() {
            return Err(SessionError::ScanIncomplete("canonical"));
        }

        if self
            .index
            .as_ref()
            .is_some_and(|index| !index.config().same_key_as(&config))
        {
            log::debug!("Comparison keys changed, rebuilding index");
            self.index = None;
        }
        let records = &self.canonical.records;
        let index = self
            .index
            .get_or_insert_with(|| ScanIndex::build(records, config));

        log::info!(
            "Comparing {} query files against {} canonical files",
            self.query.records.len(),
            index.len()
        );

        let engine =
            ComparisonEngine::new(index, &self.cache, config).with_pool(self.pool.as_ref());
        Ok(engine.compare(
            &self.query.records,
            &mut self.classification,
            self.report_frequency,
        ))
    }

    /// Query path to its canonical duplicates.
    #[must_use]
    pub fn actual_matches(&self) -> &std::collections::BTreeMap<PathBuf, Vec<FileRecord>> {
        &self.classification.actual_matches
    }

    /// Query paths with no canonical duplicate.
    #[must_use]
    pub fn unique(&self) -> &std::collections::BTreeSet<PathBuf> {
        &self.classification.unique
    }

    /// Query paths that could not be classified.
    #[must_use]
    pub fn source_error_files(&self) -> &std::collections::BTreeMap<PathBuf, SourceError> {
        &self.classification.source_error_files
    }

    /// Canonical files whose checksum failed during comparison.
    #[must_use]
    pub fn possible_match_error_files(&self) -> &std::collections::BTreeSet<PathBuf> {
        &self.classification.possible_match_error_files
    }

    /// Times a query file met itself among its candidates.
    #[must_use]
    pub fn skipped_self(&self) -> usize {
        self.classification.skipped_self
    }

    /// Checksum lookups answered from the cache. Accumulates over runs.
    #[must_use]
    pub fn pre_computed_checksum_count(&self) -> usize {
        self.cache.reuse_count()
    }

    /// The full classification of the last comparison.
    #[must_use]
    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    /// Records of the query scan.
    #[must_use]
    pub fn query_files(&self) -> &[FileRecord] {
        &self.query.records
    }

    /// Records of the canonical scan.
    #[must_use]
    pub fn canonical_files(&self) -> &[FileRecord] {
        &self.canonical.records
    }

    /// The query scan with its counters and errors.
    #[must_use]
    pub fn query_scan(&self) -> &ScanOutcome {
        &self.query
    }

    /// The canonical scan with its counters and errors.
    #[must_use]
    pub fn canonical_scan(&self) -> &ScanOutcome {
        &self.canonical
    }

    /// The cached checksum of `record`, if one has been computed.
    #[must_use]
    pub fn checksum_of(&self, record: &FileRecord) -> Option<String> {
        self.cache.peek(&record.identity())
    }

    /// The checksum cache.
    #[must_use]
    pub fn cache(&self) -> &ChecksumCache {
        &self.cache
    }

    /// The canonical directory, made absolute.
    #[must_use]
    pub fn canonical_dir(&self) -> &Path {
        &self.canonical_dir
    }

    /// Items between progress steps.
    #[must_use]
    pub fn report_frequency(&self) -> usize {
        self.report_frequency
    }

    /// Run both scans and one comparison to completion.
    ///
    /// # Errors
    ///
    /// Propagates [`CompareSession::run_compare`] errors.
    pub fn run_all(&mut self, config: ComparisonConfig) -> Result<Step, SessionError> {
        self.run_query_scan().finish();
        self.run_canonical_scan().finish();
        Ok(self.run_compare(config)?.finish())
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
