//! Command-line interface definitions for canonmatch.
//!
//! # Example
//!
//! ```bash
//! # Which downloads already exist somewhere in the archive?
//! canonmatch compare ~/Downloads --canonical /mnt/archive
//!
//! # Same name and same content, JSON for scripting
//! canonmatch compare ~/Downloads/*.jpg --canonical /mnt/photos --name --output json
//!
//! # Trust names and sizes, skip hashing
//! canonmatch compare ./incoming --canonical ./library --name --skip-checksum
//!
//! # Print the effective configuration
//! canonmatch config
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::Config;
use crate::duplicates::ComparisonConfig;
use crate::scanner::ScanFilter;

/// Find which query files already exist in a canonical directory.
///
/// Files are candidates when their size (and any attributes selected with
/// the comparison flags) agree; candidates are confirmed by BLAKE3 checksum
/// unless --skip-checksum is given.
#[derive(Debug, Parser)]
#[command(name = "canonmatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors and the report
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Report errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Configuration file to use instead of the default location
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compare query files against a canonical directory
    Compare(CompareArgs),
    /// Print the effective configuration as TOML
    Config,
}

/// Arguments for the compare subcommand.
#[derive(Debug, Args)]
pub struct CompareArgs {
    /// Query files or directories
    #[arg(value_name = "QUERY", required = true)]
    pub queries: Vec<PathBuf>,

    /// Directory holding the canonical copies
    #[arg(short, long, value_name = "DIR")]
    pub canonical: PathBuf,

    /// Only scan the top level of each directory
    #[arg(long)]
    pub skip_sub_dir: bool,

    /// Skip files whose name starts with '.'
    #[arg(long)]
    pub skip_hidden: bool,

    /// Include empty files (skipped by default)
    #[arg(long)]
    pub include_empty: bool,

    /// Keep only files below a directory matching this regex (repeatable)
    #[arg(long, value_name = "REGEX")]
    pub incl_dir: Vec<String>,

    /// Drop files below a directory matching this regex (repeatable)
    #[arg(long, value_name = "REGEX")]
    pub excl_dir: Vec<String>,

    /// Keep only files whose name matches this regex (repeatable)
    #[arg(long, value_name = "REGEX")]
    pub incl_file: Vec<String>,

    /// Drop files whose name matches this regex (repeatable)
    #[arg(long, value_name = "REGEX")]
    pub excl_file: Vec<String>,

    /// Require matching file names
    #[arg(long)]
    pub name: bool,

    /// Require matching extensions
    #[arg(long)]
    pub file_type: bool,

    /// Require matching parent directory names
    #[arg(long)]
    pub parent: bool,

    /// Require matching paths relative to the scanned directory
    #[arg(long)]
    pub rel_path: bool,

    /// Require matching creation times
    #[arg(long)]
    pub ctime: bool,

    /// Require matching modification times
    #[arg(long)]
    pub mtime: bool,

    /// Do not verify content; matching attributes are enough
    #[arg(long, requires = "name")]
    pub skip_checksum: bool,

    /// Files between progress updates
    #[arg(long, value_name = "N")]
    pub report_frequency: Option<usize>,

    /// Threads used to hash files ahead of the compare pass
    #[arg(long, value_name = "N")]
    pub io_threads: Option<usize>,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(long, value_name = "PATH")]
    pub output_file: Option<PathBuf>,
}

impl CompareArgs {
    /// The scan filter: configuration switches, raised by any flag given.
    #[must_use]
    pub fn scan_filter(&self, config: &Config) -> ScanFilter {
        let base = config.scan_filter();
        ScanFilter {
            skip_sub_dir: base.skip_sub_dir || self.skip_sub_dir,
            skip_hidden: base.skip_hidden || self.skip_hidden,
            skip_zero_len: base.skip_zero_len && !self.include_empty,
            incl_dir_regexes: self.incl_dir.clone(),
            excl_dir_regexes: self.excl_dir.clone(),
            incl_file_regexes: self.incl_file.clone(),
            excl_file_regexes: self.excl_file.clone(),
        }
    }

    /// The comparison switches: configuration defaults, raised by any flag
    /// given.
    #[must_use]
    pub fn comparison(&self, config: &Config) -> ComparisonConfig {
        let base = config.compare;
        ComparisonConfig {
            name: base.name || self.name,
            file_type: base.file_type || self.file_type,
            parent: base.parent || self.parent,
            rel_path: base.rel_path || self.rel_path,
            ctime: base.ctime || self.ctime,
            mtime: base.mtime || self.mtime,
            verify_checksum: base.verify_checksum && !self.skip_checksum,
        }
    }
}

/// Report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Text,
    /// JSON for scripting
    Json,
    /// CSV, one row per query file
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
