//! CSV output formatter for comparison results.
//!
//! One row per classified query file, sorted by path.
//!
//! # Columns
//!
//! - `query`: Path of the query file
//! - `status`: `duplicate`, `unique` or `error`
//! - `size`: File size in bytes (duplicates only)
//! - `match_count`: Number of canonical duplicates
//! - `canonical`: First canonical duplicate, in canonical scan order
//! - `canonical_modified`: Its last modified time (RFC 3339)
//! - `detail`: Error message for `error` rows
//!
//! # Example
//!
//! ```no_run
//! use canonmatch::output::{CompareReport, CsvOutput};
//! # fn show(report: &CompareReport<'_>) {
//! CsvOutput::new(report).write_to(std::io::stdout()).unwrap();
//! # }
//! ```

use std::io;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use super::CompareReport;

/// Errors that can occur during CSV output generation.
#[derive(Debug, Error)]
pub enum CsvOutputError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Serialize)]
struct CsvRow {
    query: String,
    status: &'static str,
    size: Option<u64>,
    match_count: usize,
    canonical: Option<String>,
    canonical_modified: Option<String>,
    detail: Option<String>,
}

impl CsvRow {
    fn new(query: &std::path::Path, status: &'static str) -> Self {
        Self {
            query: query.to_string_lossy().into_owned(),
            status,
            size: None,
            match_count: 0,
            canonical: None,
            canonical_modified: None,
            detail: None,
        }
    }
}

/// CSV output formatter.
pub struct CsvOutput<'a> {
    report: &'a CompareReport<'a>,
}

impl<'a> CsvOutput<'a> {
    /// Create a new CSV output formatter.
    #[must_use]
    pub fn new(report: &'a CompareReport<'a>) -> Self {
        Self { report }
    }

    fn rows(&self) -> Vec<CsvRow> {
        let classification = self.report.classification;
        let mut rows = Vec::with_capacity(classification.classified_count());

        for (query, matches) in &classification.actual_matches {
            let mut row = CsvRow::new(query, "duplicate");
            row.match_count = matches.len();
            if let Some(first) = matches.first() {
                let modified: DateTime<Utc> = first.modified.into();
                row.size = Some(first.size);
                row.canonical = Some(first.path.to_string_lossy().into_owned());
                row.canonical_modified = Some(modified.to_rfc3339());
            }
            rows.push(row);
        }
        rows.extend(
            classification
                .unique
                .iter()
                .map(|query| CsvRow::new(query, "unique")),
        );
        rows.extend(classification.source_error_files.iter().map(|(query, e)| {
            let mut row = CsvRow::new(query, "error");
            row.detail = Some(e.to_string());
            row
        }));

        rows.sort_by(|a, b| a.query.cmp(&b.query));
        rows
    }

    /// Write the CSV output to the given writer.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), CsvOutputError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for row in self.rows() {
            csv_writer.serialize(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Generate CSV output as a string.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if serialization fails.
    pub fn to_string(&self) -> Result<String, CsvOutputError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
