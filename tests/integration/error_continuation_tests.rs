use super::common::{expected, group_sets, scan, write};
use crossbeam_channel::Receiver;
use dupsift::duplicates::{ContentHasher, DuplicateGroup, FinderConfig, HashGrouper, SizeGrouper};
use dupsift::scanner::{FileDescriptor, HashAlgorithm, Hasher};
use std::path::PathBuf;
use tempfile::tempdir;

fn feed(files: Vec<FileDescriptor>) -> Receiver<FileDescriptor> {
    let (tx, rx) = crossbeam_channel::unbounded();
    for file in files {
        tx.send(file).unwrap();
    }
    rx
}

/// Run the size, hash and group stages over a fixed list of descriptors.
fn group_descriptors(files: Vec<FileDescriptor>) -> (Vec<DuplicateGroup>, usize) {
    let (candidates, size_join) = SizeGrouper::new(false, None)
        .spawn(feed(files), 0)
        .unwrap()
        .into_parts();
    let (hashed, hash_join) = ContentHasher::new(Hasher::new(HashAlgorithm::Md5), 2, None)
        .spawn(candidates, 0)
        .unwrap()
        .into_parts();
    let (groups, stats) = HashGrouper::new(false, None)
        .spawn(hashed, 0)
        .unwrap()
        .collect()
        .unwrap();

    size_join.join().unwrap();
    let hashing = hash_join.join().unwrap();
    assert_eq!(stats.duplicate_groups, groups.len());
    (groups, hashing.failed)
}

#[test]
fn test_missing_root_does_not_abort_scan() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a", b"same");
    let b = write(dir.path(), "b", b"same");
    let missing = dir.path().join("gone");

    let (groups, summary) = scan(FinderConfig::default(), &[missing.as_path(), dir.path()]);

    assert_eq!(group_sets(&groups), expected(&[vec![&a, &b]]));
    assert_eq!(summary.enumeration_errors, 1);
    assert!(summary.has_errors());
}

#[test]
fn test_unreadable_candidate_is_excluded() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a", b"hello");
    let b = write(dir.path(), "b", b"hello");
    let vanished = dir.path().join("vanished");

    let files = vec![
        FileDescriptor::new(a.clone(), 5, 0o644),
        FileDescriptor::new(b.clone(), 5, 0o644),
        FileDescriptor::new(vanished, 5, 0o644),
    ];
    let (groups, failed) = group_descriptors(files);

    assert_eq!(group_sets(&groups), expected(&[vec![&a, &b]]));
    assert_eq!(failed, 1);
}

#[test]
fn test_lone_survivor_is_not_emitted() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a", b"hello");

    // Same size class as `a`, but the file disappeared before hashing
    let files = vec![
        FileDescriptor::new(a, 5, 0o644),
        FileDescriptor::new(dir.path().join("vanished"), 5, 0o644),
    ];
    let (groups, failed) = group_descriptors(files);

    assert!(groups.is_empty());
    assert_eq!(failed, 1);
}

#[test]
fn test_all_candidates_fail() {
    let files = vec![
        FileDescriptor::new(PathBuf::from("nonexistent_1.txt"), 100, 0o644),
        FileDescriptor::new(PathBuf::from("nonexistent_2.txt"), 100, 0o644),
    ];
    let (groups, failed) = group_descriptors(files);

    assert!(groups.is_empty());
    assert_eq!(failed, 2);
}

#[cfg(unix)]
#[test]
fn test_unreadable_subdirectory_skips_only_its_subtree() {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let a = write(dir.path(), "open/a", b"same");
    let b = write(dir.path(), "open/b", b"same");
    write(dir.path(), "locked/c", b"same");
    let locked = dir.path().join("locked");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    let (groups, summary) = scan(super::common::recursive(), &[dir.path()]);

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    // Privileged users can read the directory anyway
    if summary.enumeration_errors > 0 {
        assert_eq!(group_sets(&groups), expected(&[vec![&a, &b]]));
    } else {
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 3);
    }
}
