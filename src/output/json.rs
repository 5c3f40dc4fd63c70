//! JSON output formatter for comparison results.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "matches": [
//!     { "query": "/q/copy.txt", "size": 2048, "canonical": ["/c/a/copy.txt"] }
//!   ],
//!   "unique": ["/q/new.txt"],
//!   "source_errors": [{ "path": "/q/locked.txt", "error": "..." }],
//!   "possible_match_errors": [],
//!   "scan_errors": [{ "path": "/q/ghost.txt", "error": "..." }],
//!   "summary": {
//!     "query_files": 3,
//!     "canonical_files": 2,
//!     "compared": 3,
//!     "duplicates": 1,
//!     "unique": 1,
//!     "source_errors": 1,
//!     "skipped_self": 0,
//!     "pre_computed_checksums": 5,
//!     "duplicate_bytes": 2048,
//!     "duration_ms": 1500,
//!     "interrupted": false,
//!     "exit_code": 3,
//!     "exit_code_name": "CM003",
//!     "generated_at": "2024-01-01T00:00:00Z"
//!   }
//! }
//! ```

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::CompareReport;

/// A query file and its canonical duplicates.
#[derive(Debug, Clone, Serialize)]
pub struct JsonMatch {
    /// Query file path
    pub query: String,
    /// Size shared by the query and its matches
    pub size: u64,
    /// Canonical duplicates, in canonical scan order
    pub canonical: Vec<String>,
}

/// A path with the error that concerns it.
#[derive(Debug, Clone, Serialize)]
pub struct JsonPathError {
    /// The affected file
    pub path: String,
    /// Error message
    pub error: String,
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Files included by the query scan
    pub query_files: usize,
    /// Files included by the canonical scan
    pub canonical_files: usize,
    /// Query files processed by the comparison
    pub compared: usize,
    /// Query files with at least one canonical duplicate
    pub duplicates: usize,
    /// Query files with no canonical duplicate
    pub unique: usize,
    /// Query files that could not be classified
    pub source_errors: usize,
    /// Times a query file was its own candidate
    pub skipped_self: usize,
    /// Checksum lookups answered from the cache
    pub pre_computed_checksums: usize,
    /// Total size of the duplicated query files
    pub duplicate_bytes: u64,
    /// Wall time of the run in milliseconds
    pub duration_ms: u64,
    /// Whether the comparison was interrupted
    pub interrupted: bool,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "CM000")
    pub exit_code_name: String,
    /// When the report was produced
    pub generated_at: DateTime<Utc>,
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Query files with duplicates
    pub matches: Vec<JsonMatch>,
    /// Query files without duplicates
    pub unique: Vec<String>,
    /// Query files that could not be classified
    pub source_errors: Vec<JsonPathError>,
    /// Canonical files whose checksum failed
    pub possible_match_errors: Vec<String>,
    /// Files either scan could not read
    pub scan_errors: Vec<JsonPathError>,
    /// Summary statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Build the JSON document of `report`.
    #[must_use]
    pub fn new(report: &CompareReport<'_>) -> Self {
        let classification = report.classification;
        let exit_code = report.exit_code();

        Self {
            matches: classification
                .actual_matches
                .iter()
                .map(|(query, matches)| JsonMatch {
                    query: path_string(query),
                    size: matches.first().map_or(0, |m| m.size),
                    canonical: matches.iter().map(|m| path_string(&m.path)).collect(),
                })
                .collect(),
            unique: classification.unique.iter().map(|p| path_string(p)).collect(),
            source_errors: classification
                .source_error_files
                .iter()
                .map(|(path, error)| JsonPathError {
                    path: path_string(path),
                    error: error.to_string(),
                })
                .collect(),
            possible_match_errors: classification
                .possible_match_error_files
                .iter()
                .map(|p| path_string(p))
                .collect(),
            scan_errors: report
                .query_errors
                .iter()
                .chain(report.canonical_errors)
                .map(|e| JsonPathError {
                    path: path_string(e.path()),
                    error: e.to_string(),
                })
                .collect(),
            summary: JsonSummary {
                query_files: report.query_stats.included,
                canonical_files: report.canonical_stats.included,
                compared: classification.compared,
                duplicates: classification.actual_matches.len(),
                unique: classification.unique.len(),
                source_errors: classification.source_error_files.len(),
                skipped_self: classification.skipped_self,
                pre_computed_checksums: report.pre_computed_checksums,
                duplicate_bytes: classification.duplicate_bytes(),
                duration_ms: u64::try_from(report.duration.as_millis()).unwrap_or(u64::MAX),
                interrupted: report.interrupted,
                exit_code: exit_code.as_i32(),
                exit_code_name: exit_code.code_prefix().to_string(),
                generated_at: Utc::now(),
            },
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
