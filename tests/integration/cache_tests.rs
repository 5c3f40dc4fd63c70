use canonmatch::cache::ChecksumCache;
use canonmatch::scanner::{ChecksumError, FileRecord, Hasher};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

fn record(path: &Path) -> FileRecord {
    let metadata = fs::metadata(path).unwrap();
    FileRecord::from_metadata(path.to_path_buf(), path.parent().unwrap(), &metadata)
}

#[test]
fn test_cache_computes_blake3_once() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("a.txt");
    fs::write(&path, b"cached").unwrap();
    let file = record(&path);

    let cache = ChecksumCache::new(Arc::new(Hasher::new()));
    assert!(cache.peek(&file.identity()).is_none());

    let first = cache.get_or_compute(&file).unwrap();
    assert_eq!(first, blake3::hash(b"cached").to_hex().to_string());
    assert_eq!(cache.get_or_compute(&file).unwrap(), first);
    assert_eq!(cache.computed_count(), 1);
    assert_eq!(cache.reuse_count(), 1);
    assert_eq!(cache.peek(&file.identity()), Some(first));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_failures_are_not_cached() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("later.txt");
    let file = FileRecord::new(path.clone(), 5, std::time::SystemTime::UNIX_EPOCH);

    let cache = ChecksumCache::new(Arc::new(Hasher::new()));
    assert!(matches!(
        cache.get_or_compute(&file),
        Err(ChecksumError::NotFound(_))
    ));
    assert!(cache.is_empty());

    fs::write(&path, b"hello").unwrap();
    assert!(cache.get_or_compute(&file).is_ok());
    assert_eq!(cache.reuse_count(), 0);
}

#[test]
fn test_changed_file_gets_new_identity() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("a.txt");
    fs::write(&path, b"v1").unwrap();
    let before = record(&path);

    fs::write(&path, b"version two").unwrap();
    let after = record(&path);
    assert_ne!(before.identity(), after.identity());

    let cache = ChecksumCache::new(Arc::new(Hasher::new()));
    let sum = cache.get_or_compute(&after).unwrap();
    assert_eq!(sum, blake3::hash(b"version two").to_hex().to_string());
    assert!(cache.peek(&before.identity()).is_none());
}

#[test]
fn test_prefetch_on_pool_is_not_a_reuse() {
    let dir = tempdir().unwrap();
    let records: Vec<FileRecord> = (0..8)
        .map(|i| {
            let path = dir.path().join(format!("{i}.bin"));
            fs::write(&path, vec![i as u8; 100]).unwrap();
            record(&path)
        })
        .collect();
    let refs: Vec<&FileRecord> = records.iter().collect();

    let pool = rayon::ThreadPoolBuilder::new().num_threads(3).build().unwrap();
    let cache = ChecksumCache::new(Arc::new(Hasher::new()));
    cache.prefetch(&refs, &pool);
    assert_eq!(cache.computed_count(), 8);

    for file in &records {
        cache.get_or_compute(file).unwrap();
    }
    assert_eq!(cache.reuse_count(), 0);
    assert_eq!(cache.computed_count(), 8);

    cache.get_or_compute(&records[0]).unwrap();
    assert_eq!(cache.reuse_count(), 1);
}
