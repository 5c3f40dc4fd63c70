//! End-to-end classification scenarios on real directories.

use canonmatch::duplicates::{ComparisonConfig, SourceError};
use canonmatch::scanner::ScanFilter;
use canonmatch::session::{CompareSession, SessionOptions};
use filetime::FileTime;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

fn write(dir: &Path, rel: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn session(query: &TempDir, canonical: &TempDir) -> CompareSession {
    CompareSession::new(SessionOptions::new(
        vec![query.path().to_path_buf()],
        canonical.path(),
    ))
    .unwrap()
}

#[test]
fn test_same_content_different_name_is_unique_when_names_compared() {
    let query = tempdir().unwrap();
    let canonical = tempdir().unwrap();
    let q = write(query.path(), "holiday.jpg", b"same bytes");
    write(canonical.path(), "IMG_0001.jpg", b"same bytes");

    let mut session = session(&query, &canonical);
    session
        .run_all(ComparisonConfig::default().with_name(true))
        .unwrap();
    assert!(session.unique().contains(&q));
    assert!(session.actual_matches().is_empty());

    // Without the name switch the content decides
    session.run_compare(ComparisonConfig::default()).unwrap().finish();
    assert!(session.actual_matches().contains_key(&q));
}

#[test]
fn test_skip_checksum_trusts_name_and_size() {
    let query = tempdir().unwrap();
    let canonical = tempdir().unwrap();
    let q = write(query.path(), "report.txt", b"aaaa");
    let c = write(canonical.path(), "archive/report.txt", b"bbbb");

    let mut session = session(&query, &canonical);
    let trusting = ComparisonConfig::default()
        .with_name(true)
        .with_verify_checksum(false);
    session.run_all(trusting).unwrap();

    let matches = &session.actual_matches()[&q];
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].path, c);
    assert_eq!(session.cache().computed_count(), 0);

    session
        .run_compare(trusting.with_verify_checksum(true))
        .unwrap()
        .finish();
    assert!(session.unique().contains(&q));
}

#[test]
fn test_query_removed_after_scan_is_source_error() {
    let query = tempdir().unwrap();
    let canonical = tempdir().unwrap();
    let q = write(query.path(), "a.txt", b"content");
    write(canonical.path(), "a.txt", b"content");

    let mut session = session(&query, &canonical);
    session.run_query_scan().finish();
    session.run_canonical_scan().finish();
    fs::remove_file(&q).unwrap();
    session.run_compare(ComparisonConfig::default()).unwrap().finish();

    assert!(matches!(
        session.source_error_files().get(&q),
        Some(SourceError::Unreadable(_))
    ));
    assert!(!session.unique().contains(&q));
    assert!(session.actual_matches().is_empty());
}

#[test]
fn test_candidate_removed_after_scan_is_possible_match_error() {
    let query = tempdir().unwrap();
    let canonical = tempdir().unwrap();
    let q = write(query.path(), "a.txt", b"content");
    let c = write(canonical.path(), "a.txt", b"content");

    let mut session = session(&query, &canonical);
    session.run_query_scan().finish();
    session.run_canonical_scan().finish();
    fs::remove_file(&c).unwrap();
    session.run_compare(ComparisonConfig::default()).unwrap().finish();

    match session.source_error_files().get(&q) {
        Some(SourceError::CandidateChecksum { candidate, .. }) => assert_eq!(candidate, &c),
        other => panic!("Expected candidate failure, got {other:?}"),
    }
    assert!(session.possible_match_error_files().contains(&c));
}

#[test]
fn test_query_inside_canonical_skips_itself() {
    let canonical = tempdir().unwrap();
    let inbox = write(canonical.path(), "inbox/a.txt", b"one copy");
    let lone = write(canonical.path(), "inbox/b.txt", b"lonely");
    let archived = write(canonical.path(), "archive/a.txt", b"one copy");

    let mut session = CompareSession::new(SessionOptions::new(
        vec![canonical.path().join("inbox")],
        canonical.path(),
    ))
    .unwrap();
    session.run_all(ComparisonConfig::default()).unwrap();

    let matches: Vec<_> = session.actual_matches()[&inbox]
        .iter()
        .map(|r| r.path.clone())
        .collect();
    assert_eq!(matches, vec![archived]);
    assert!(session.unique().contains(&lone));
    assert_eq!(session.skipped_self(), 2);
}

#[test]
fn test_all_matches_reported_in_scan_order() {
    let query = tempdir().unwrap();
    let canonical = tempdir().unwrap();
    let q = write(query.path(), "song.mp3", b"la la la");
    write(canonical.path(), "b/song.mp3", b"la la la");
    write(canonical.path(), "a/song.mp3", b"la la la");
    write(canonical.path(), "c/other.mp3", b"la la lo");

    let mut session = session(&query, &canonical);
    session.run_all(ComparisonConfig::default()).unwrap();

    let parents: Vec<_> = session.actual_matches()[&q]
        .iter()
        .map(|r| r.parent.clone())
        .collect();
    assert_eq!(parents, vec!["a", "b"]);
}

#[test]
fn test_parent_and_rel_path_switches() {
    let query = tempdir().unwrap();
    let canonical = tempdir().unwrap();
    let q = write(query.path(), "docs/notes.txt", b"notes");
    write(canonical.path(), "misc/notes.txt", b"notes");

    let mut session = session(&query, &canonical);
    session
        .run_all(ComparisonConfig::default().with_parent(true))
        .unwrap();
    assert!(session.unique().contains(&q));

    let c = write(canonical.path(), "docs/notes.txt", b"notes");
    session.run_canonical_scan().finish();
    session
        .run_compare(ComparisonConfig::default().with_rel_path(true))
        .unwrap()
        .finish();
    let matches = &session.actual_matches()[&q];
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].path, c);
}

#[test]
fn test_mtime_switch() {
    let query = tempdir().unwrap();
    let canonical = tempdir().unwrap();
    let q = write(query.path(), "a.txt", b"timed");
    let c = write(canonical.path(), "a.txt", b"timed");
    filetime::set_file_mtime(&q, FileTime::from_unix_time(1_000_000, 0)).unwrap();
    filetime::set_file_mtime(&c, FileTime::from_unix_time(2_000_000, 0)).unwrap();

    let mut session = session(&query, &canonical);
    session
        .run_all(ComparisonConfig::default().with_mtime(true))
        .unwrap();
    assert!(session.unique().contains(&q));

    filetime::set_file_mtime(&c, FileTime::from_unix_time(1_000_000, 0)).unwrap();
    session.run_canonical_scan().finish();
    session
        .run_compare(ComparisonConfig::default().with_mtime(true))
        .unwrap()
        .finish();
    assert!(session.actual_matches().contains_key(&q));
}

#[test]
fn test_filters_apply_to_both_scans() {
    let query = tempdir().unwrap();
    let canonical = tempdir().unwrap();
    let kept = write(query.path(), "photo.jpg", b"pixels");
    write(query.path(), "photo.tmp", b"pixels");
    write(query.path(), "cache/thumb.jpg", b"pixels");
    write(canonical.path(), "photo.tmp", b"pixels");
    write(canonical.path(), "cache/photo.jpg", b"pixels");

    let filter = ScanFilter {
        excl_file_regexes: vec![r".*\.tmp".to_string()],
        excl_dir_regexes: vec!["cache".to_string()],
        ..Default::default()
    };
    let mut session = CompareSession::new(
        SessionOptions::new(vec![query.path().to_path_buf()], canonical.path())
            .with_filter(filter),
    )
    .unwrap();
    session.run_all(ComparisonConfig::default()).unwrap();

    assert_eq!(session.query_files().len(), 1);
    assert!(session.canonical_files().is_empty());
    assert!(session.unique().contains(&kept));
    assert_eq!(session.query_scan().stats.skipped_exclude, 2);
    assert_eq!(session.canonical_scan().stats.skipped_exclude, 2);
}

#[test]
fn test_empty_files_are_skipped_unless_asked() {
    let query = tempdir().unwrap();
    let canonical = tempdir().unwrap();
    let q = write(query.path(), "empty.txt", b"");
    write(canonical.path(), "empty.txt", b"");

    let mut session = session(&query, &canonical);
    session.run_all(ComparisonConfig::default()).unwrap();
    assert!(session.query_files().is_empty());
    assert_eq!(session.query_scan().stats.skipped_zero_len, 1);

    let mut session = CompareSession::new(
        SessionOptions::new(vec![query.path().to_path_buf()], canonical.path()).with_filter(
            ScanFilter {
                skip_zero_len: false,
                ..Default::default()
            },
        ),
    )
    .unwrap();
    session.run_all(ComparisonConfig::default()).unwrap();
    assert!(session.actual_matches().contains_key(&q));
}

#[test]
fn test_explicit_query_files_and_missing_items() {
    let query = tempdir().unwrap();
    let canonical = tempdir().unwrap();
    let q = write(query.path(), "sub/a.txt", b"abc");
    write(canonical.path(), "sub/a.txt", b"abc");
    let missing = query.path().join("missing.txt");

    let mut session = CompareSession::new(SessionOptions::new(
        vec![q.clone(), missing.clone()],
        canonical.path(),
    ))
    .unwrap();
    session
        .run_all(ComparisonConfig::default().with_rel_path(true))
        .unwrap();

    // An explicit file is its own scan root, so its relative path is its name
    assert!(session.unique().contains(&q));
    assert_eq!(session.query_scan().stats.errors, 1);
    assert_eq!(session.query_scan().errors[0].path(), missing.as_path());

    session
        .run_compare(ComparisonConfig::default().with_name(true))
        .unwrap()
        .finish();
    assert!(session.actual_matches().contains_key(&q));
}

#[cfg(unix)]
#[test]
fn test_query_item_linking_to_a_directory_is_walked() {
    let query = tempdir().unwrap();
    let canonical = tempdir().unwrap();
    let q = write(query.path(), "real/a.txt", b"abc");
    write(query.path(), "real/nested/b.txt", b"xyz");
    std::os::unix::fs::symlink(&q, query.path().join("real/nested/link.txt")).unwrap();
    let c = write(canonical.path(), "a.txt", b"abc");
    let link = query.path().join("qlink");
    std::os::unix::fs::symlink(query.path().join("real"), &link).unwrap();

    let mut session =
        CompareSession::new(SessionOptions::new(vec![link.clone()], canonical.path())).unwrap();
    session.run_all(ComparisonConfig::default()).unwrap();

    // Links inside the linked directory are still not followed
    assert_eq!(session.query_files().len(), 2);
    assert_eq!(session.query_scan().stats.skipped_links, 1);
    let matches = &session.actual_matches()[&link.join("a.txt")];
    assert_eq!(matches[0].path, c);
    assert!(session.unique().contains(&link.join("nested/b.txt")));
}

#[test]
fn test_every_query_file_is_classified_once() {
    let query = tempdir().unwrap();
    let canonical = tempdir().unwrap();
    for i in 0..20 {
        write(query.path(), &format!("q{i}.bin"), format!("{}", i % 7).as_bytes());
    }
    for i in 0..5 {
        write(canonical.path(), &format!("c{i}.bin"), format!("{i}").as_bytes());
    }

    let mut session = session(&query, &canonical);
    session.run_all(ComparisonConfig::default()).unwrap();

    let classification = session.classification();
    assert_eq!(classification.classified_count(), 20);
    assert_eq!(classification.compared, 20);
    for record in session.query_files() {
        let hits = usize::from(classification.actual_matches.contains_key(&record.path))
            + usize::from(classification.unique.contains(&record.path))
            + usize::from(classification.source_error_files.contains_key(&record.path));
        assert_eq!(hits, 1, "{} classified {} times", record.path.display(), hits);
    }
    // q0..q4 and q7..q11 and q14..q18 hold "0".."4"
    assert_eq!(session.actual_matches().len(), 15);
}
