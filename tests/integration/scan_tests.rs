use super::common::{expected, group_sets, recursive, scan, write};
use dupsift::duplicates::FinderConfig;
use dupsift::scanner::{HashAlgorithm, WalkMode, WalkerConfig};
use tempfile::tempdir;

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();

    let (groups, summary) = scan(FinderConfig::default(), &[dir.path()]);

    assert!(groups.is_empty());
    assert_eq!(summary.files_enumerated, 0);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_scan_hello_hello_world() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.txt", b"hello");
    let b = write(dir.path(), "b.txt", b"hello");
    write(dir.path(), "c.txt", b"world");

    let (groups, summary) = scan(FinderConfig::default(), &[dir.path()]);

    assert_eq!(group_sets(&groups), expected(&[vec![&a, &b]]));
    assert_eq!(summary.files_enumerated, 3);
    assert_eq!(summary.size_candidates, 3);
    assert_eq!(summary.files_hashed, 3);
    assert_eq!(summary.duplicate_files, 1);
    assert_eq!(summary.reclaimable_space, 5);
}

#[test]
fn test_scan_three_identical_files() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "one", b"triplicate");
    let b = write(dir.path(), "two", b"triplicate");
    let c = write(dir.path(), "three", b"triplicate");

    let (groups, _) = scan(FinderConfig::default(), &[dir.path()]);

    assert_eq!(group_sets(&groups), expected(&[vec![&a, &b, &c]]));
    assert_eq!(groups[0].size, 10);
}

#[test]
fn test_scan_same_size_different_content() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"aaaa");
    write(dir.path(), "b", b"bbbb");
    write(dir.path(), "c", b"cccc");

    let (groups, summary) = scan(FinderConfig::default(), &[dir.path()]);

    assert!(groups.is_empty());
    assert_eq!(summary.files_hashed, 3);
}

#[test]
fn test_unique_sizes_are_never_hashed() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"1");
    write(dir.path(), "b", b"22");
    write(dir.path(), "c", b"333");

    let (groups, summary) = scan(FinderConfig::default(), &[dir.path()]);

    assert!(groups.is_empty());
    assert_eq!(summary.size_candidates, 0);
    assert_eq!(summary.files_hashed, 0);
}

#[test]
fn test_shallow_ignores_subdirectories() {
    let dir = tempdir().unwrap();
    write(dir.path(), "top.txt", b"same");
    write(dir.path(), "sub/nested.txt", b"same");
    write(dir.path(), "sub/deeper/again.txt", b"same");

    let shallow = FinderConfig::default().with_walker_config(WalkerConfig {
        mode: WalkMode::Shallow,
        ..Default::default()
    });
    let (groups, summary) = scan(shallow, &[dir.path()]);

    assert!(groups.is_empty());
    assert_eq!(summary.files_enumerated, 1);
}

#[test]
fn test_recursive_finds_nested_duplicates() {
    let dir = tempdir().unwrap();
    let top = write(dir.path(), "top.txt", b"same");
    let nested = write(dir.path(), "sub/nested.txt", b"same");
    let deeper = write(dir.path(), "sub/deeper/again.txt", b"same");

    let (groups, summary) = scan(recursive(), &[dir.path()]);

    assert_eq!(group_sets(&groups), expected(&[vec![&top, &nested, &deeper]]));
    assert_eq!(summary.files_enumerated, 3);
}

#[test]
fn test_sha1_finds_same_groups_as_md5() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"alpha");
    write(dir.path(), "b", b"alpha");
    write(dir.path(), "c", b"gamma");
    write(dir.path(), "d", b"gamma");
    write(dir.path(), "e", b"omega");

    let (md5, _) = scan(FinderConfig::default(), &[dir.path()]);
    let (sha1, _) = scan(
        FinderConfig::default().with_algorithm(HashAlgorithm::Sha1),
        &[dir.path()],
    );

    assert_eq!(group_sets(&md5), group_sets(&sha1));
    assert_eq!(md5.len(), 2);
    assert!(md5.iter().all(|g| g.hash.len() == 32));
    assert!(sha1.iter().all(|g| g.hash.len() == 40));
}

#[test]
fn test_rescan_is_idempotent() {
    let dir = tempdir().unwrap();
    for i in 0..20 {
        write(dir.path(), &format!("d{}/f{}", i % 3, i), format!("{}", i % 4).as_bytes());
    }

    let (first, _) = scan(recursive(), &[dir.path()]);
    let (second, _) = scan(recursive(), &[dir.path()]);

    assert!(!first.is_empty());
    assert_eq!(group_sets(&first), group_sets(&second));
}

#[cfg(unix)]
#[test]
fn test_perm_splits_identical_content() {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a", b"content");
    let b = write(dir.path(), "b", b"content");
    let c = write(dir.path(), "c", b"content");
    fs::set_permissions(&a, fs::Permissions::from_mode(0o644)).unwrap();
    fs::set_permissions(&b, fs::Permissions::from_mode(0o644)).unwrap();
    fs::set_permissions(&c, fs::Permissions::from_mode(0o600)).unwrap();

    let (without_perm, _) = scan(FinderConfig::default(), &[dir.path()]);
    assert_eq!(group_sets(&without_perm), expected(&[vec![&a, &b, &c]]));
    assert_eq!(without_perm[0].mode, None);

    let (with_perm, _) = scan(FinderConfig::default().with_perm(true), &[dir.path()]);
    assert_eq!(group_sets(&with_perm), expected(&[vec![&a, &b]]));
    assert_eq!(with_perm[0].mode, Some(0o644));
}
