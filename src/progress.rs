//! Progress reporting utilities using indicatif.
//!
//! The session yields a [`Step`] every `report_frequency` items; the CLI
//! forwards each one to a [`ProgressCallback`]. [`Progress`] renders them as
//! a spinner while scanning and a bar while comparing.

use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::session::Step;

/// The phases of a comparison run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Scanning the query items
    QueryScan,
    /// Scanning the canonical directory
    CanonicalScan,
    /// Classifying query files
    Compare,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::QueryScan => "Scanning query files",
            Self::CanonicalScan => "Scanning canonical files",
            Self::Compare => "Comparing",
        })
    }
}

/// Receives progress of each phase.
pub trait ProgressCallback: Send + Sync {
    /// A phase starts. `total` is known for the compare phase only.
    fn on_phase_start(&self, phase: Phase, total: Option<usize>);

    /// A step of the current phase completed.
    fn on_step(&self, phase: Phase, step: Step);

    /// The phase ended, normally or because it was interrupted.
    fn on_phase_end(&self, phase: Phase);
}

/// Terminal progress display.
pub struct Progress {
    multi: MultiProgress,
    bar: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a progress display. Nothing is drawn when `quiet` is set.
    ///
    /// # Examples
    ///
    /// ```
    /// use canonmatch::progress::Progress;
    ///
    /// let progress = Progress::new(true);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            bar: Mutex::new(None),
            quiet,
        }
    }

    fn scan_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn compare_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn with_bar(&self, f: impl FnOnce(&mut Option<ProgressBar>)) {
        let mut bar = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut bar);
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: Phase, total: Option<usize>) {
        if self.quiet {
            return;
        }
        let pb = match total {
            Some(len) => {
                let pb = self.multi.add(ProgressBar::new(len as u64));
                pb.set_style(Self::compare_style());
                pb
            }
            None => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::scan_style());
                pb.enable_steady_tick(Duration::from_millis(100));
                pb
            }
        };
        pb.set_message(phase.to_string());
        self.with_bar(|bar| *bar = Some(pb));
    }

    fn on_step(&self, _phase: Phase, step: Step) {
        self.with_bar(|bar| {
            if let Some(pb) = bar {
                pb.set_position(step.count as u64);
            }
        });
    }

    fn on_phase_end(&self, phase: Phase) {
        self.with_bar(|bar| {
            if let Some(pb) = bar.take() {
                pb.finish_with_message(format!("{phase}: done"));
            }
        });
    }
}

/// Pull `steps` to the end of the phase, reporting each one.
///
/// `stop` is checked after every intermediate step; once it returns true no
/// further step is pulled. Returns whether the phase completed.
pub fn drive<I, F>(
    steps: I,
    phase: Phase,
    total: Option<usize>,
    progress: &dyn ProgressCallback,
    stop: F,
) -> bool
where
    I: IntoIterator<Item = Step>,
    F: Fn() -> bool,
{
    progress.on_phase_start(phase, total);
    let mut completed = false;
    for step in steps {
        progress.on_step(phase, step);
        if step.done {
            completed = true;
            break;
        }
        if stop() {
            log::info!("{} stopped after {} files", phase, step.count);
            break;
        }
    }
    progress.on_phase_end(phase);
    completed
}

/// Discards all progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_phase_start(&self, _phase: Phase, _total: Option<usize>) {}
    fn on_step(&self, _phase: Phase, _step: Step) {}
    fn on_phase_end(&self, _phase: Phase) {}
}
