//! Directory walker implementation using jwalk for parallel traversal.
//!
//! # Overview
//!
//! [`Walker`] turns either a directory tree or an explicit list of files
//! into a stream of [`WalkItem`]s. Every file that is looked at produces
//! exactly one item, so callers can count checked files, skips and errors.
//!
//! # Features
//!
//! - Parallel directory reading via jwalk, children sorted by name
//! - Symbolic links are reported as skipped, never followed
//! - Hidden directories are descended; only hidden *files* are filtered
//! - Per-file errors are yielded as [`ScanError`] values and never stop the walk

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use jwalk::WalkDir;

use super::{CompiledFilter, FileRecord, ScanError, SkipReason};

/// One inspected file.
#[derive(Debug)]
pub enum WalkItem {
    /// The file passed every filter.
    Included(FileRecord),
    /// The file was filtered out.
    Skipped(SkipReason),
    /// The file or directory could not be read.
    Failed(ScanError),
}

#[derive(Debug)]
enum WalkSource {
    Directory(PathBuf),
    Files(Vec<PathBuf>),
}

/// File discovery over a directory tree or a list of files.
#[derive(Debug)]
pub struct Walker {
    source: WalkSource,
    filter: Arc<CompiledFilter>,
}

impl Walker {
    /// Walk the tree rooted at `root`.
    ///
    /// Relative paths of the resulting records are relative to `root`.
    #[must_use]
    pub fn directory(root: &Path, filter: Arc<CompiledFilter>) -> Self {
        Self {
            source: WalkSource::Directory(root.to_path_buf()),
            filter,
        }
    }

    /// Inspect an explicit list of files.
    ///
    /// Each file's scan root is its own parent directory.
    #[must_use]
    pub fn files(paths: Vec<PathBuf>, filter: Arc<CompiledFilter>) -> Self {
        Self {
            source: WalkSource::Files(paths),
            filter,
        }
    }

    /// Consume the walker, yielding one [`WalkItem`] per inspected file.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use canonmatch::scanner::{CompiledFilter, ScanFilter, WalkItem, Walker};
    /// use std::path::Path;
    /// use std::sync::Arc;
    ///
    /// let filter = Arc::new(CompiledFilter::new(&ScanFilter::default()).unwrap());
    /// let included = Walker::directory(Path::new("."), filter)
    ///     .walk()
    ///     .filter(|item| matches!(item, WalkItem::Included(_)))
    ///     .count();
    /// println!("Found {} files", included);
    /// ```
    pub fn walk(self) -> Box<dyn Iterator<Item = WalkItem>> {
        let filter = self.filter;
        match self.source {
            WalkSource::Directory(root) => {
                let max_depth = if filter.skip_sub_dir { 1 } else { usize::MAX };

                let walk_dir = WalkDir::new(&root)
                    .follow_links(false)
                    .skip_hidden(false)
                    .max_depth(max_depth)
                    .process_read_dir(move |_depth, _path, _read_dir_state, children| {
                        // Sort children for deterministic output
                        children.sort_by(|a, b| match (a, b) {
                            (Ok(a), Ok(b)) => a.file_name().cmp(b.file_name()),
                            (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                            (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                            (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                        });
                    });

                Box::new(walk_dir.into_iter().filter_map(move |entry_result| {
                    match entry_result {
                        Ok(entry) => {
                            // The root is always read, even when it is a link
                            if entry.depth() == 0 || entry.file_type().is_dir() {
                                return None;
                            }
                            Some(inspect(&entry.path(), &root, &filter))
                        }
                        Err(e) => {
                            let path = e
                                .path()
                                .map_or_else(|| root.clone(), std::borrow::ToOwned::to_owned);
                            log::warn!("Walker error for {}: {}", path.display(), e);
                            let error = match e.io_error() {
                                Some(io) => ScanError::from_io(
                                    &path,
                                    std::io::Error::new(io.kind(), io.to_string()),
                                ),
                                None => ScanError::Io {
                                    path,
                                    source: std::io::Error::other(e.to_string()),
                                },
                            };
                            Some(WalkItem::Failed(error))
                        }
                    }
                }))
            }
            WalkSource::Files(paths) => Box::new(paths.into_iter().map(move |path| {
                let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
                inspect(&path, &root, &filter)
            })),
        }
    }
}

/// Apply every filter to a single file, in scan order.
fn inspect(path: &Path, root: &Path, filter: &CompiledFilter) -> WalkItem {
    let metadata = match fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) => return WalkItem::Failed(io_failure(path, e)),
    };

    // Links are checked before access, a dangling link is never readable
    if metadata.file_type().is_symlink() {
        log::trace!("Skipping symlink: {}", path.display());
        return WalkItem::Skipped(SkipReason::Symlink);
    }
    if !metadata.is_file() {
        log::trace!("Skipping non-regular file: {}", path.display());
        return WalkItem::Skipped(SkipReason::NotRegular);
    }

    if let Err(e) = fs::File::open(path) {
        return WalkItem::Failed(io_failure(path, e));
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    if let Err(reason) = filter.check_path(path, &name) {
        log::trace!("Skipping {} ({:?})", path.display(), reason);
        return WalkItem::Skipped(reason);
    }
    if let Err(reason) = filter.check_size(metadata.len()) {
        log::debug!("Skipping empty file: {}", path.display());
        return WalkItem::Skipped(reason);
    }

    WalkItem::Included(FileRecord::from_metadata(path.to_path_buf(), root, &metadata))
}

fn io_failure(path: &Path, error: std::io::Error) -> ScanError {
    let error = ScanError::from_io(path, error);
    match &error {
        ScanError::NotFound(_) => {
            log::debug!("File not found (may have been deleted): {}", path.display());
        }
        _ => log::warn!("{}", error),
    }
    error
}
