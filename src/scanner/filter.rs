//! Scan filters: hidden files, empty files, and include/exclude regexes.
//!
//! Patterns are anchored at the start of the item they are tested against,
//! so `tmp` excludes `tmp_cache` but not `old_tmp`. Directory patterns are
//! tested against every component of a file's parent path; file patterns
//! against the file name only.

use std::path::{Component, Path};

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Filter switches and raw patterns shared by the query and canonical scans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanFilter {
    /// Only scan the top level of each directory.
    pub skip_sub_dir: bool,
    /// Skip files whose name starts with `.`.
    pub skip_hidden: bool,
    /// Skip files of zero length.
    pub skip_zero_len: bool,
    /// A file is kept only if some parent directory matches one of these.
    pub incl_dir_regexes: Vec<String>,
    /// A file is dropped if any parent directory matches one of these.
    pub excl_dir_regexes: Vec<String>,
    /// A file is kept only if its name matches one of these.
    pub incl_file_regexes: Vec<String>,
    /// A file is dropped if its name matches one of these.
    pub excl_file_regexes: Vec<String>,
}

impl Default for ScanFilter {
    fn default() -> Self {
        Self {
            skip_sub_dir: false,
            skip_hidden: false,
            skip_zero_len: true,
            incl_dir_regexes: Vec::new(),
            excl_dir_regexes: Vec::new(),
            incl_file_regexes: Vec::new(),
            excl_file_regexes: Vec::new(),
        }
    }
}

/// An invalid include/exclude pattern.
#[derive(thiserror::Error, Debug)]
#[error("Invalid pattern '{pattern}': {source}")]
pub struct PatternError {
    /// The pattern as given by the user
    pub pattern: String,
    /// The regex compilation error
    #[source]
    pub source: regex::Error,
}

/// Why a file was left out of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Symbolic links are never followed.
    Symlink,
    /// Not a regular file (fifo, socket, device).
    NotRegular,
    /// Hidden file with `skip_hidden` set.
    Hidden,
    /// No include pattern matched.
    NotIncluded,
    /// An exclude pattern matched.
    Excluded,
    /// Empty file with `skip_zero_len` set.
    ZeroLength,
}

/// A [`ScanFilter`] with its patterns compiled.
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    /// Only scan the top level of each directory.
    pub skip_sub_dir: bool,
    /// Skip files whose name starts with `.`.
    pub skip_hidden: bool,
    /// Skip files of zero length.
    pub skip_zero_len: bool,
    incl_dir: Vec<Regex>,
    excl_dir: Vec<Regex>,
    incl_file: Vec<Regex>,
    excl_file: Vec<Regex>,
}

impl CompiledFilter {
    /// Compile every pattern of the filter.
    ///
    /// # Errors
    ///
    /// Returns the first pattern that fails to compile.
    pub fn new(filter: &ScanFilter) -> Result<Self, PatternError> {
        Ok(Self {
            skip_sub_dir: filter.skip_sub_dir,
            skip_hidden: filter.skip_hidden,
            skip_zero_len: filter.skip_zero_len,
            incl_dir: compile_all(&filter.incl_dir_regexes)?,
            excl_dir: compile_all(&filter.excl_dir_regexes)?,
            incl_file: compile_all(&filter.incl_file_regexes)?,
            excl_file: compile_all(&filter.excl_file_regexes)?,
        })
    }

    /// Check the name and parent-directory filters, in scan order.
    ///
    /// Size is checked separately once metadata is available.
    pub fn check_path(&self, path: &Path, name: &str) -> Result<(), SkipReason> {
        if self.skip_hidden && name.starts_with('.') {
            return Err(SkipReason::Hidden);
        }

        if !self.incl_dir.is_empty() || !self.excl_dir.is_empty() {
            let components: Vec<String> = path
                .parent()
                .map(|parent| {
                    parent
                        .components()
                        .filter_map(|c| match c {
                            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                            _ => None,
                        })
                        .collect()
                })
                .unwrap_or_default();

            if !self.incl_dir.is_empty() && !matches_any(&self.incl_dir, &components) {
                return Err(SkipReason::NotIncluded);
            }
            if matches_any(&self.excl_dir, &components) {
                return Err(SkipReason::Excluded);
            }
        }

        let name = [name];
        if !self.incl_file.is_empty() && !matches_any(&self.incl_file, &name) {
            return Err(SkipReason::NotIncluded);
        }
        if matches_any(&self.excl_file, &name) {
            return Err(SkipReason::Excluded);
        }

        Ok(())
    }

    /// Check the zero-length filter.
    pub fn check_size(&self, size: u64) -> Result<(), SkipReason> {
        if self.skip_zero_len && size == 0 {
            Err(SkipReason::ZeroLength)
        } else {
            Ok(())
        }
    }
}

fn compile_all(patterns: &[String]) -> Result<Vec<Regex>, PatternError> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(&format!(r"\A(?:{pattern})")).map_err(|source| PatternError {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

fn matches_any<S: AsRef<str>>(regexes: &[Regex], items: &[S]) -> bool {
    regexes
        .iter()
        .any(|re| items.iter().any(|item| re.is_match(item.as_ref())))
}
