//! Human-readable report.

use std::io::{self, Write};

use bytesize::ByteSize;
use yansi::Paint;

use super::CompareReport;

/// Plain or colored text report.
///
/// Colors follow yansi's global switch, which the binary turns off for
/// `--no-color` or when stdout is not a terminal.
pub struct TextOutput<'a> {
    report: &'a CompareReport<'a>,
    list_unique: bool,
}

impl<'a> TextOutput<'a> {
    /// Create a text report. Unique files are listed only when `list_unique`.
    #[must_use]
    pub fn new(report: &'a CompareReport<'a>, list_unique: bool) -> Self {
        Self {
            report,
            list_unique,
        }
    }

    /// Write the report.
    ///
    /// # Errors
    ///
    /// Returns any error of the underlying writer.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let report = self.report;
        let c = report.classification;

        if !c.actual_matches.is_empty() {
            writeln!(w, "{}", "Duplicates".bold())?;
            for (query, matches) in &c.actual_matches {
                let size = matches.first().map_or(0, |m| m.size);
                writeln!(
                    w,
                    "  {} ({})",
                    query.display().yellow(),
                    ByteSize::b(size)
                )?;
                for m in matches {
                    writeln!(w, "    = {}", m.path.display())?;
                }
            }
            writeln!(w)?;
        }

        if self.list_unique && !c.unique.is_empty() {
            writeln!(w, "{}", "Unique".bold())?;
            for path in &c.unique {
                writeln!(w, "  {}", path.display().green())?;
            }
            writeln!(w)?;
        }

        let scan_errors = report.query_errors.iter().chain(report.canonical_errors);
        if !c.source_error_files.is_empty() || report.scan_error_count() > 0 {
            writeln!(w, "{}", "Errors".bold().red())?;
            for e in c.source_error_files.values() {
                writeln!(w, "  {}", e.red())?;
            }
            for e in scan_errors {
                writeln!(w, "  {}", e.red())?;
            }
            for path in &c.possible_match_error_files {
                writeln!(w, "  unreadable canonical file: {}", path.display())?;
            }
            writeln!(w)?;
        }

        writeln!(
            w,
            "Scanned {} query and {} canonical files in {:.2}s",
            report.query_stats.included,
            report.canonical_stats.included,
            report.duration.as_secs_f64()
        )?;
        writeln!(
            w,
            "{} duplicate ({}), {} unique, {} unclassified",
            c.actual_matches.len().to_string().yellow(),
            ByteSize::b(c.duplicate_bytes()),
            c.unique.len().to_string().green(),
            c.source_error_files.len()
        )?;
        writeln!(
            w,
            "Skipped {} self match(es); {} checksum(s) reused",
            c.skipped_self, report.pre_computed_checksums
        )?;
        if report.interrupted {
            writeln!(
                w,
                "{}",
                format!("Interrupted after {} query files", c.compared).red()
            )?;
        }
        Ok(())
    }

    /// Render the report to a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        // Writing to a Vec cannot fail
        let _ = self.write_to(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}
