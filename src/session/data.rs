//! Data structures for comparison sessions.

use std::path::PathBuf;

use crate::scanner::ScanFilter;

/// Default number of items between progress steps.
pub const DEFAULT_REPORT_FREQUENCY: usize = 10;

/// A progress checkpoint yielded by a scan or a comparison pass.
///
/// `count` is the number of items processed so far. The last step of a pass
/// has `done` set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Step {
    /// Items processed so far.
    pub count: usize,
    /// Whether the pass has finished.
    pub done: bool,
}

impl Step {
    /// An intermediate checkpoint.
    #[must_use]
    pub fn progress(count: usize) -> Self {
        Self { count, done: false }
    }

    /// The final checkpoint of a pass.
    #[must_use]
    pub fn done(count: usize) -> Self {
        Self { count, done: true }
    }
}

/// Inputs of a [`CompareSession`](super::CompareSession).
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Query files and directories.
    pub query_items: Vec<PathBuf>,
    /// Root of the canonical population.
    pub canonical_dir: PathBuf,
    /// Filters shared by both scans.
    pub filter: ScanFilter,
    /// Items between progress steps. Must be positive.
    pub report_frequency: usize,
    /// Worker threads for checksum prefetch; 1 disables the pool.
    pub io_threads: usize,
}

impl SessionOptions {
    /// Options with default filters, report frequency and a single I/O thread.
    #[must_use]
    pub fn new(query_items: Vec<PathBuf>, canonical_dir: impl Into<PathBuf>) -> Self {
        Self {
            query_items,
            canonical_dir: canonical_dir.into(),
            filter: ScanFilter::default(),
            report_frequency: DEFAULT_REPORT_FREQUENCY,
            io_threads: 1,
        }
    }

    /// Replace the scan filter.
    #[must_use]
    pub fn with_filter(mut self, filter: ScanFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set the number of items between progress steps.
    #[must_use]
    pub fn with_report_frequency(mut self, report_frequency: usize) -> Self {
        self.report_frequency = report_frequency;
        self
    }

    /// Set the number of checksum prefetch threads.
    #[must_use]
    pub fn with_io_threads(mut self, io_threads: usize) -> Self {
        self.io_threads = io_threads;
        self
    }
}
