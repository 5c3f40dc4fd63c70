//! The command line application end to end: reports and exit codes.

use super::config_tests::clean_env;
use canonmatch::cli::{Cli, Commands};
use canonmatch::config::Config;
use canonmatch::error::{exit_code_for, ExitCode};
use canonmatch::progress::{Phase, Progress, ProgressCallback};
use canonmatch::session::Step;
use canonmatch::signal::ShutdownHandler;
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

struct Dirs {
    query: TempDir,
    canonical: TempDir,
    out: TempDir,
}

impl Dirs {
    fn new() -> Self {
        Self {
            query: tempdir().unwrap(),
            canonical: tempdir().unwrap(),
            out: tempdir().unwrap(),
        }
    }

    fn report(&self) -> PathBuf {
        self.out.path().join("report")
    }

    /// Parse a compare command line reading no user configuration.
    fn cli(&self, extra: &[&str]) -> Cli {
        let mut argv: Vec<String> = vec![
            "canonmatch".into(),
            "-q".into(),
            "--config".into(),
            self.out.path().join("none.toml").display().to_string(),
            "compare".into(),
            self.query.path().display().to_string(),
            "--canonical".into(),
            self.canonical.path().display().to_string(),
            "--output-file".into(),
            self.report().display().to_string(),
        ];
        argv.extend(extra.iter().map(|s| (*s).to_string()));
        Cli::try_parse_from(argv).unwrap()
    }
}

fn write(dir: &Path, rel: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_duplicates_exit_success_with_json_report() {
    let _lock = clean_env();
    let dirs = Dirs::new();
    let q = write(dirs.query.path(), "a.txt", b"duplicate me");
    let c = write(dirs.canonical.path(), "keep/a.txt", b"duplicate me");
    write(dirs.query.path(), "b.txt", b"only here");

    let code = canonmatch::run_app(dirs.cli(&["--output", "json"])).unwrap();
    assert_eq!(code, ExitCode::Success);

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dirs.report()).unwrap()).unwrap();
    assert_eq!(json["matches"][0]["query"], q.display().to_string());
    assert_eq!(json["matches"][0]["canonical"][0], c.display().to_string());
    assert_eq!(json["unique"].as_array().unwrap().len(), 1);
    assert_eq!(json["summary"]["interrupted"], false);
}

#[test]
fn test_all_unique_exits_no_duplicates() {
    let _lock = clean_env();
    let dirs = Dirs::new();
    write(dirs.query.path(), "a.txt", b"new");
    write(dirs.canonical.path(), "b.txt", b"old");

    let code = canonmatch::run_app(dirs.cli(&[])).unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);
    let text = fs::read_to_string(dirs.report()).unwrap();
    assert!(!text.is_empty());
}

#[test]
fn test_missing_query_item_exits_partial_success() {
    let _lock = clean_env();
    let dirs = Dirs::new();
    write(dirs.query.path(), "a.txt", b"x");
    let missing = dirs.query.path().join("missing.txt");

    let code = canonmatch::run_app(dirs.cli(&[
        missing.to_str().unwrap(),
        "--output",
        "csv",
    ]))
    .unwrap();
    assert_eq!(code, ExitCode::PartialSuccess);

    let csv = fs::read_to_string(dirs.report()).unwrap();
    assert!(csv.starts_with("query,status"));
    assert!(csv.contains("unique"));
}

#[test]
fn test_invalid_canonical_is_general_error() {
    let _lock = clean_env();
    let dirs = Dirs::new();
    let cli = Cli::try_parse_from([
        "canonmatch",
        "-q",
        "compare",
        dirs.query.path().to_str().unwrap(),
        "--canonical",
        dirs.canonical.path().join("nope").to_str().unwrap(),
    ])
    .unwrap();

    let err = canonmatch::run_app(cli).unwrap_err();
    assert_eq!(exit_code_for(&err), ExitCode::GeneralError);
    assert!(format!("{err:#}").contains("not found"));
}

#[test]
fn test_configured_size_only_match_is_rejected() {
    let _lock = clean_env();
    let dirs = Dirs::new();
    write(dirs.query.path(), "a.txt", b"aaaa");
    write(dirs.canonical.path(), "b.txt", b"bbbb");
    let args = compare_args(dirs.cli(&[]));
    let mut config = Config::default();
    config.compare.verify_checksum = false;

    let shutdown = ShutdownHandler::new();
    let progress = Progress::new(true);
    let err = canonmatch::run_compare(&args, &config, &progress, &shutdown, false).unwrap_err();
    assert_eq!(exit_code_for(&err), ExitCode::GeneralError);
    assert!(format!("{err:#}").contains("requires the name check"));
    assert!(!dirs.report().exists());

    config.compare.name = true;
    let code = canonmatch::run_compare(&args, &config, &progress, &shutdown, false).unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);
}

#[test]
fn test_invalid_regex_is_general_error() {
    let _lock = clean_env();
    let dirs = Dirs::new();
    let err = canonmatch::run_app(dirs.cli(&["--excl-file", "[oops"])).unwrap_err();
    assert_eq!(exit_code_for(&err), ExitCode::GeneralError);
    assert!(format!("{err:#}").contains("[oops"));
}

/// Presses Ctrl+C as soon as the given phase starts.
struct InterruptAt {
    phase: Phase,
    shutdown: ShutdownHandler,
}

impl ProgressCallback for InterruptAt {
    fn on_phase_start(&self, phase: Phase, _total: Option<usize>) {
        if phase == self.phase {
            self.shutdown.request_shutdown();
        }
    }
    fn on_step(&self, _phase: Phase, _step: Step) {}
    fn on_phase_end(&self, _phase: Phase) {}
}

fn compare_args(cli: Cli) -> canonmatch::cli::CompareArgs {
    match cli.command {
        Commands::Compare(args) => args,
        Commands::Config => panic!("Expected Compare command"),
    }
}

#[test]
fn test_interrupted_scan_is_an_error() {
    let _lock = clean_env();
    let dirs = Dirs::new();
    for i in 0..4 {
        write(dirs.query.path(), &format!("{i}.txt"), b"data");
    }
    let args = compare_args(dirs.cli(&["--report-frequency", "1"]));
    let shutdown = ShutdownHandler::new();
    let progress = InterruptAt {
        phase: Phase::QueryScan,
        shutdown: shutdown.clone(),
    };

    let err = canonmatch::run_compare(&args, &Config::default(), &progress, &shutdown, false)
        .unwrap_err();
    assert_eq!(exit_code_for(&err), ExitCode::Interrupted);
    assert!(!dirs.report().exists());
}

#[test]
fn test_interrupted_compare_reports_partial_results() {
    let _lock = clean_env();
    let dirs = Dirs::new();
    for i in 0..6 {
        write(dirs.query.path(), &format!("{i}.txt"), b"data");
    }
    write(dirs.canonical.path(), "orig.txt", b"data");
    let args = compare_args(dirs.cli(&["--report-frequency", "2", "--output", "json"]));
    let shutdown = ShutdownHandler::new();
    let progress = InterruptAt {
        phase: Phase::Compare,
        shutdown: shutdown.clone(),
    };

    let code = canonmatch::run_compare(&args, &Config::default(), &progress, &shutdown, false)
        .unwrap();
    assert_eq!(code, ExitCode::Interrupted);

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dirs.report()).unwrap()).unwrap();
    assert_eq!(json["summary"]["interrupted"], true);
    assert_eq!(json["matches"].as_array().unwrap().len(), 2);
}

#[test]
fn test_config_command_prints_defaults() {
    let _lock = clean_env();
    let dir = tempdir().unwrap();
    let config = dir.path().join("none.toml");
    let cli = Cli::try_parse_from([
        "canonmatch",
        "--config",
        config.to_str().unwrap(),
        "config",
    ])
    .unwrap();
    assert_eq!(canonmatch::run_app(cli).unwrap(), ExitCode::Success);
}
