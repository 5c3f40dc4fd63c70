//! Configuration layering: defaults, TOML file, environment, CLI flags.

use canonmatch::cli::{Cli, Commands};
use canonmatch::config::{Config, ENV_PREFIX};
use clap::Parser;
use std::fs;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tempfile::tempdir;

// =============================================================================
// Helper Functions
// =============================================================================

/// Serializes tests that read or write `CANONMATCH_*` variables.
pub(super) static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Take the environment lock and clear every `CANONMATCH_*` variable.
pub(super) fn clean_env() -> MutexGuard<'static, ()> {
    let guard = ENV_MUTEX.lock().unwrap_or_else(PoisonError::into_inner);
    for (key, _) in std::env::vars() {
        if key.starts_with(ENV_PREFIX) {
            std::env::remove_var(key);
        }
    }
    guard
}

// =============================================================================
// Layering
// =============================================================================

#[test]
fn test_missing_file_gives_defaults() {
    let _lock = clean_env();
    let dir = tempdir().unwrap();
    let config = Config::load(Some(dir.path().join("absent.toml").as_path()));
    assert_eq!(config, Config::default());
}

#[test]
fn test_file_overrides_defaults() {
    let _lock = clean_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
report_frequency = 25
skip_hidden = true

[compare]
parent = true
"#,
    )
    .unwrap();

    let config = Config::load(Some(path.as_path()));
    assert_eq!(config.report_frequency, 25);
    assert!(config.skip_hidden);
    assert!(config.compare.parent);
    assert!(config.compare.verify_checksum);
    assert_eq!(config.io_threads, 4);
}

#[test]
fn test_environment_overrides_file() {
    let _lock = clean_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "io_threads = 2\n[compare]\nname = false\n").unwrap();

    std::env::set_var("CANONMATCH_IO_THREADS", "6");
    std::env::set_var("CANONMATCH_COMPARE__NAME", "true");
    let config = Config::load(Some(path.as_path()));
    std::env::remove_var("CANONMATCH_IO_THREADS");
    std::env::remove_var("CANONMATCH_COMPARE__NAME");

    assert_eq!(config.io_threads, 6);
    assert!(config.compare.name);
}

#[test]
fn test_invalid_file_falls_back_to_defaults() {
    let _lock = clean_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "report_frequency = \"often\"\n").unwrap();

    assert_eq!(Config::load(Some(path.as_path())), Config::default());
}

#[test]
fn test_figment_reports_invalid_values() {
    let _lock = clean_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[compare]\nmtime = 3\n").unwrap();

    assert!(Config::figment(&path).extract::<Config>().is_err());
}

#[test]
fn test_cli_flags_override_config() {
    let _lock = clean_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "skip_zero_len = true\n[compare]\nfile_type = true\n").unwrap();
    let config = Config::load(Some(path.as_path()));

    let cli = Cli::try_parse_from([
        "canonmatch",
        "compare",
        "/q",
        "-c",
        "/c",
        "--include-empty",
        "--ctime",
        "--report-frequency",
        "3",
    ])
    .unwrap();
    let Commands::Compare(args) = cli.command else {
        panic!("Expected Compare command");
    };

    let filter = args.scan_filter(&config);
    assert!(!filter.skip_zero_len);
    let comparison = args.comparison(&config);
    assert!(comparison.file_type);
    assert!(comparison.ctime);
    assert_eq!(args.report_frequency, Some(3));
}

#[test]
fn test_default_path_ends_with_config_toml() {
    if let Some(path) = Config::default_path() {
        assert!(path.ends_with("config.toml"));
    }
}
