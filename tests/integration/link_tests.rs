#![cfg(unix)]

use super::common::{expected, group_sets, scan, write};
use dupsift::duplicates::FinderConfig;
use dupsift::scanner::{WalkMode, WalkerConfig};
use std::os::unix::fs::symlink;
use tempfile::tempdir;

fn config(follow_symlinks: bool) -> FinderConfig {
    FinderConfig::default().with_walker_config(WalkerConfig {
        mode: WalkMode::Recursive,
        follow_symlinks,
        ..Default::default()
    })
}

#[test]
fn test_symlinks_not_followed_by_default() {
    let dir = tempdir().unwrap();
    let target = write(dir.path(), "target", b"linked content");
    symlink(&target, dir.path().join("link")).unwrap();

    let (groups, summary) = scan(config(false), &[dir.path()]);

    assert!(groups.is_empty());
    assert_eq!(summary.files_enumerated, 1);
}

#[test]
fn test_followed_symlink_matches_its_target() {
    let dir = tempdir().unwrap();
    let target = write(dir.path(), "target", b"linked content");
    let link = dir.path().join("link");
    symlink(&target, &link).unwrap();

    let (groups, _) = scan(config(true), &[dir.path()]);

    assert_eq!(group_sets(&groups), expected(&[vec![&target, &link]]));
}

#[test]
fn test_dangling_symlink_is_skipped() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a", b"pair");
    let b = write(dir.path(), "b", b"pair");
    symlink(dir.path().join("nowhere"), dir.path().join("dangling")).unwrap();

    let (groups, _) = scan(config(true), &[dir.path()]);

    assert_eq!(group_sets(&groups), expected(&[vec![&a, &b]]));
}

#[test]
fn test_symlinked_directory_loop_terminates() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "sub/a", b"pair");
    let b = write(dir.path(), "sub/b", b"pair");
    symlink(dir.path(), dir.path().join("sub/loop")).unwrap();

    let (groups, summary) = scan(config(true), &[dir.path()]);

    assert_eq!(group_sets(&groups), expected(&[vec![&a, &b]]));
    assert!(summary.enumeration_errors >= 1);
}
