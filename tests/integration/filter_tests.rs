use super::common::{expected, group_sets, scan, write};
use dupsift::duplicates::FinderConfig;
use dupsift::scanner::{WalkMode, WalkerConfig};
use tempfile::tempdir;

fn config(skip_hidden: bool, skip_empty: bool) -> FinderConfig {
    FinderConfig::default().with_walker_config(WalkerConfig::new(
        WalkMode::Recursive,
        false,
        skip_hidden,
        skip_empty,
    ))
}

#[test]
fn test_empty_files_grouped_by_default() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "empty1", b"");
    let b = write(dir.path(), "empty2", b"");

    let (groups, _) = scan(config(false, false), &[dir.path()]);

    assert_eq!(group_sets(&groups), expected(&[vec![&a, &b]]));
    assert_eq!(groups[0].size, 0);
}

#[test]
fn test_no_empty_excludes_zero_length_files() {
    let dir = tempdir().unwrap();
    write(dir.path(), "empty1", b"");
    write(dir.path(), "empty2", b"");
    let a = write(dir.path(), "full1", b"x");
    let b = write(dir.path(), "full2", b"x");

    let (groups, summary) = scan(config(false, true), &[dir.path()]);

    assert_eq!(group_sets(&groups), expected(&[vec![&a, &b]]));
    assert!(groups.iter().all(|g| g.size > 0));
    assert_eq!(summary.files_enumerated, 2);
}

#[test]
fn test_hidden_files_grouped_by_default() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), ".hidden", b"dot");
    let b = write(dir.path(), "visible", b"dot");

    let (groups, _) = scan(config(false, false), &[dir.path()]);

    assert_eq!(group_sets(&groups), expected(&[vec![&a, &b]]));
}

#[test]
fn test_no_hidden_excludes_dot_files() {
    let dir = tempdir().unwrap();
    write(dir.path(), ".hidden", b"dot");
    write(dir.path(), ".also-hidden", b"dot");
    write(dir.path(), "visible", b"dot");

    let (groups, summary) = scan(config(true, false), &[dir.path()]);

    assert!(groups.is_empty());
    assert_eq!(summary.files_enumerated, 1);
}

#[test]
fn test_no_hidden_still_enters_dot_directories() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), ".config/settings", b"value");
    let b = write(dir.path(), "backup/settings", b"value");

    let (groups, _) = scan(config(true, false), &[dir.path()]);

    assert_eq!(group_sets(&groups), expected(&[vec![&a, &b]]));
    for group in &groups {
        for path in &group.paths {
            let name = path.file_name().unwrap().to_string_lossy();
            assert!(!name.starts_with('.'));
        }
    }
}

#[test]
fn test_both_filters_together() {
    let dir = tempdir().unwrap();
    write(dir.path(), ".empty-hidden", b"");
    write(dir.path(), "empty", b"");
    write(dir.path(), ".dup", b"dup");
    let a = write(dir.path(), "dup1", b"dup");
    let b = write(dir.path(), "dup2", b"dup");

    let (groups, _) = scan(config(true, true), &[dir.path()]);

    assert_eq!(group_sets(&groups), expected(&[vec![&a, &b]]));
}
