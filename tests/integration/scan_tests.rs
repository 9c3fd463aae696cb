use dupfind::duplicates::{find_duplicates, DuplicateFinder, FinderConfig};
use dupfind::scanner::{enumerate_files, WalkerConfig};
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn create(path: &Path, content: &[u8]) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap().write_all(content).unwrap();
    path.to_path_buf()
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();

    assert!(find_duplicates(dir.path(), false).unwrap().is_empty());
    assert!(enumerate_files(dir.path()).unwrap().is_empty());
}

#[test]
fn test_scan_two_equal_one_different() {
    let dir = tempdir().unwrap();
    let a = create(&dir.path().join("a.txt"), b"hello");
    let b = create(&dir.path().join("b.txt"), b"hello");
    let c = create(&dir.path().join("c.txt"), b"world");

    let groups = find_duplicates(dir.path(), false).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].representative(), a.as_path());
    assert_eq!(groups[0].duplicates(), &[b]);
    assert!(!groups.iter().any(|g| g.contains(&c)));
}

#[test]
fn test_scan_three_identical_files() {
    let dir = tempdir().unwrap();
    for name in ["one", "two", "three"] {
        create(&dir.path().join(name), b"triplicate");
    }

    let groups = find_duplicates(dir.path(), false).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 3);
    assert_eq!(groups[0].duplicate_count(), 2);
}

#[test]
fn test_scan_empty_files_are_duplicates() {
    let dir = tempdir().unwrap();
    create(&dir.path().join("empty1"), b"");
    create(&dir.path().join("empty2"), b"");

    let groups = find_duplicates(dir.path(), false).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
    assert_eq!(groups[0].size, 0);
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    let expected: BTreeSet<PathBuf> = [
        "copy.bin",
        "a/copy.bin",
        "a/b/copy.bin",
        "a/b/c/d/e/copy.bin",
        "z/copy.bin",
    ]
    .iter()
    .map(|rel| create(&dir.path().join(rel), b"nested content"))
    .collect();

    let groups = find_duplicates(dir.path(), false).unwrap();

    assert_eq!(groups.len(), 1);
    let found: BTreeSet<PathBuf> = groups[0].paths.iter().cloned().collect();
    assert_eq!(found, expected);
}

#[test]
fn test_scan_file_root_is_empty_not_error() {
    let dir = tempdir().unwrap();
    let file = create(&dir.path().join("plain.txt"), b"not a directory");

    assert!(find_duplicates(&file, false).unwrap().is_empty());
    assert!(enumerate_files(&file).unwrap().is_empty());
}

#[test]
fn test_scan_nonexistent_root_is_empty() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");

    assert!(find_duplicates(&missing, false).unwrap().is_empty());
}

#[test]
fn test_scan_is_idempotent() {
    let dir = tempdir().unwrap();
    create(&dir.path().join("x/1.txt"), b"alpha");
    create(&dir.path().join("y/2.txt"), b"alpha");
    create(&dir.path().join("3.txt"), b"beta");
    create(&dir.path().join("x/4.txt"), b"beta");
    create(&dir.path().join("5.txt"), b"gamma");

    let first = find_duplicates(dir.path(), false).unwrap();
    let second = find_duplicates(dir.path(), false).unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
}

#[test]
fn test_groups_ordered_by_representative_walk_position() {
    let dir = tempdir().unwrap();
    create(&dir.path().join("a/first.txt"), b"second group");
    create(&dir.path().join("b.txt"), b"first group?");
    create(&dir.path().join("c/1.txt"), b"first group?");
    create(&dir.path().join("d.txt"), b"second group");

    let walk = enumerate_files(dir.path()).unwrap();
    let groups = find_duplicates(dir.path(), false).unwrap();

    assert_eq!(groups.len(), 2);
    let positions: Vec<usize> = groups
        .iter()
        .map(|g| walk.iter().position(|p| p == g.representative()).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(groups[0].representative().ends_with("a/first.txt"));
}

#[test]
fn test_summary_counts() {
    let dir = tempdir().unwrap();
    create(&dir.path().join("a"), &[1u8; 100]);
    create(&dir.path().join("b"), &[1u8; 100]);
    create(&dir.path().join("c"), &[1u8; 100]);
    create(&dir.path().join("d"), &[2u8; 50]);

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(summary.total_files, 4);
    assert_eq!(summary.total_size, 350);
    assert_eq!(summary.duplicate_groups, 1);
    assert_eq!(summary.duplicate_files, 2);
    assert_eq!(summary.reclaimable_space, 200);
    assert_eq!(summary.digest_collisions, 0);
    assert!(summary.skipped_files.is_empty());
}

#[test]
fn test_scan_with_hidden_and_ignored_files() {
    let dir = tempdir().unwrap();
    create(&dir.path().join("keep1.txt"), b"same");
    create(&dir.path().join(".hidden.txt"), b"same");
    create(&dir.path().join("build/out.txt"), b"same");
    create(&dir.path().join("keep2.txt"), b"other");
    create(&dir.path().join("notes.tmp"), b"other");

    let config = FinderConfig::default().with_walker_config(WalkerConfig::new(
        false,
        true,
        vec!["build/".to_string(), "*.tmp".to_string()],
    ));
    let (groups, summary) = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 2);
}

#[test]
fn test_parallel_and_sequential_agree() {
    let dir = tempdir().unwrap();
    for i in 0..60 {
        create(
            &dir.path().join(format!("dir{}/file{:03}", i % 4, i)),
            format!("payload-{}", i % 9).as_bytes(),
        );
    }

    let sequential = DuplicateFinder::new(FinderConfig::default().with_io_threads(1))
        .find_duplicates(dir.path())
        .unwrap()
        .0;
    let parallel = DuplicateFinder::new(FinderConfig::default().with_io_threads(6))
        .find_duplicates(dir.path())
        .unwrap()
        .0;

    assert_eq!(sequential.len(), 9);
    assert_eq!(sequential, parallel);
}
