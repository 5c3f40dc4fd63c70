//! Output formatters for comparison results.
//!
//! Every format renders the same [`CompareReport`]:
//! - Text for people, colored when the terminal allows
//! - JSON for automation and scripting
//! - CSV for spreadsheet import, one row per query file
//!
//! # Example
//!
//! ```no_run
//! use canonmatch::duplicates::ComparisonConfig;
//! use canonmatch::output::{CompareReport, JsonOutput};
//! use canonmatch::session::{CompareSession, SessionOptions};
//! use std::path::PathBuf;
//! use std::time::Duration;
//!
//! let options = SessionOptions::new(vec![PathBuf::from("incoming")], "archive");
//! let mut session = CompareSession::new(options).unwrap();
//! session.run_all(ComparisonConfig::default()).unwrap();
//!
//! let report = CompareReport::from_session(&session, Duration::ZERO, false);
//! println!("{}", JsonOutput::new(&report).to_json_pretty().unwrap());
//! ```

pub mod csv;
pub mod json;
pub mod text;

use std::time::Duration;

pub use self::csv::CsvOutput;
pub use self::json::JsonOutput;
pub use self::text::TextOutput;

use crate::duplicates::Classification;
use crate::error::ExitCode;
use crate::scanner::{ScanError, ScanStats};
use crate::session::CompareSession;

/// Everything a report shows about one comparison run.
#[derive(Debug, Clone, Copy)]
pub struct CompareReport<'a> {
    /// The classification of the query files
    pub classification: &'a Classification,
    /// Counters of the query scan
    pub query_stats: &'a ScanStats,
    /// Counters of the canonical scan
    pub canonical_stats: &'a ScanStats,
    /// Files of the query scan that could not be read
    pub query_errors: &'a [ScanError],
    /// Files of the canonical scan that could not be read
    pub canonical_errors: &'a [ScanError],
    /// Checksum lookups answered from the cache
    pub pre_computed_checksums: usize,
    /// Wall time of the run
    pub duration: Duration,
    /// Whether Ctrl+C cut the comparison short
    pub interrupted: bool,
}

impl<'a> CompareReport<'a> {
    /// Gather the report of `session`'s last comparison.
    #[must_use]
    pub fn from_session(
        session: &'a CompareSession,
        duration: Duration,
        interrupted: bool,
    ) -> Self {
        Self {
            classification: session.classification(),
            query_stats: &session.query_scan().stats,
            canonical_stats: &session.canonical_scan().stats,
            query_errors: &session.query_scan().errors,
            canonical_errors: &session.canonical_scan().errors,
            pre_computed_checksums: session.pre_computed_checksum_count(),
            duration,
            interrupted,
        }
    }

    /// Number of files either scan could not read.
    #[must_use]
    pub fn scan_error_count(&self) -> usize {
        self.query_errors.len() + self.canonical_errors.len()
    }

    /// The process exit code this outcome maps to.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        if self.interrupted {
            ExitCode::Interrupted
        } else if self.scan_error_count() > 0
            || !self.classification.source_error_files.is_empty()
        {
            ExitCode::PartialSuccess
        } else if self.classification.actual_matches.is_empty() {
            ExitCode::NoDuplicates
        } else {
            ExitCode::Success
        }
    }
}
