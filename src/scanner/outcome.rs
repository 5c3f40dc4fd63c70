//! Step-wise accumulation of scan results.
//!
//! [`ScanSteps`] drives a [`WalkItem`] stream into a [`ScanOutcome`],
//! pausing every `report_frequency` checked files so the caller can report
//! progress or stop. Stopping early leaves the outcome marked incomplete.

use std::collections::HashSet;
use std::path::PathBuf;

use super::{FileRecord, ScanError, SkipReason, WalkItem};
use crate::session::Step;

/// Counters for one scanned population.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Files looked at, whatever the result
    pub checked: usize,
    /// Files that became records
    pub included: usize,
    /// Symbolic links skipped
    pub skipped_links: usize,
    /// Hidden files skipped
    pub skipped_hidden: usize,
    /// Files rejected by an include pattern
    pub skipped_include: usize,
    /// Files rejected by an exclude pattern
    pub skipped_exclude: usize,
    /// Empty files skipped
    pub skipped_zero_len: usize,
    /// Fifos, sockets and devices skipped
    pub skipped_special: usize,
    /// Files reached twice through overlapping scan roots
    pub skipped_repeat: usize,
    /// Files or directories that could not be read
    pub errors: usize,
}

impl ScanStats {
    fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::Symlink => self.skipped_links += 1,
            SkipReason::NotRegular => self.skipped_special += 1,
            SkipReason::Hidden => self.skipped_hidden += 1,
            SkipReason::NotIncluded => self.skipped_include += 1,
            SkipReason::Excluded => self.skipped_exclude += 1,
            SkipReason::ZeroLength => self.skipped_zero_len += 1,
        }
    }
}

/// Records, counters and errors of one scanned population.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Included files, in scan order
    pub records: Vec<FileRecord>,
    /// Scan counters
    pub stats: ScanStats,
    /// Per-file errors, in the order they were met
    pub errors: Vec<ScanError>,
    complete: bool,
    seen: HashSet<PathBuf>,
}

impl ScanOutcome {
    /// Whether the scan ran to the end.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Drop everything gathered so far.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn absorb(&mut self, item: WalkItem) {
        self.stats.checked += 1;
        match item {
            WalkItem::Included(record) => {
                if self.seen.insert(record.path.clone()) {
                    self.stats.included += 1;
                    self.records.push(record);
                } else {
                    log::debug!("Already scanned: {}", record.path.display());
                    self.stats.skipped_repeat += 1;
                }
            }
            WalkItem::Skipped(reason) => self.stats.record_skip(reason),
            WalkItem::Failed(error) => {
                self.stats.errors += 1;
                self.errors.push(error);
            }
        }
    }
}

/// A scan in progress, yielding a [`Step`] every `report_frequency` files.
///
/// The last step has `done` set; after it the iterator is exhausted.
pub struct ScanSteps<'a> {
    items: Box<dyn Iterator<Item = WalkItem>>,
    outcome: &'a mut ScanOutcome,
    report_frequency: usize,
    finished: bool,
}

impl<'a> ScanSteps<'a> {
    /// Start feeding `items` into `outcome`, which is cleared first.
    #[must_use]
    pub fn new(
        items: Box<dyn Iterator<Item = WalkItem>>,
        outcome: &'a mut ScanOutcome,
        report_frequency: usize,
    ) -> Self {
        outcome.clear();
        Self {
            items,
            outcome,
            report_frequency: report_frequency.max(1),
            finished: false,
        }
    }

    /// Run the scan to completion, returning the final step.
    pub fn finish(self) -> Step {
        self.last().unwrap_or_default()
    }
}

impl Iterator for ScanSteps<'_> {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        if self.finished {
            return None;
        }

        for item in self.items.by_ref() {
            self.outcome.absorb(item);
            if self.outcome.stats.checked % self.report_frequency == 0 {
                return Some(Step::progress(self.outcome.stats.checked));
            }
        }

        self.finished = true;
        self.outcome.complete = true;
        log::debug!(
            "Scan complete: {} checked, {} included, {} errors",
            self.outcome.stats.checked,
            self.outcome.stats.included,
            self.outcome.stats.errors
        );
        Some(Step::done(self.outcome.stats.checked))
    }
}
