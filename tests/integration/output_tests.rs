use super::common::{recursive, write};
use dupsift::duplicates::DuplicateFinder;
use dupsift::output::TextEmitter;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tempfile::tempdir;

fn render(root: PathBuf) -> String {
    let finder = DuplicateFinder::new(recursive());
    let mut emitter = TextEmitter::new(Vec::new());
    finder.run(&[root], &mut emitter).unwrap();
    String::from_utf8(emitter.into_inner()).unwrap()
}

fn as_set(paths: &[&PathBuf]) -> BTreeSet<String> {
    paths.iter().map(|p| p.display().to_string()).collect()
}

#[test]
fn test_listing_format() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a", b"first");
    let b = write(dir.path(), "b", b"first");
    let c = write(dir.path(), "c", b"second!");
    let d = write(dir.path(), "d", b"second!");
    let e = write(dir.path(), "e", b"second!");
    write(dir.path(), "f", b"lonely");

    let out = render(dir.path().to_path_buf());

    assert!(!out.starts_with('\n'));
    assert!(out.ends_with('\n'));
    assert!(!out.ends_with("\n\n"));

    let blocks: BTreeSet<BTreeSet<String>> = out
        .trim_end_matches('\n')
        .split("\n\n")
        .map(|block| block.lines().map(str::to_string).collect())
        .collect();
    let expected: BTreeSet<BTreeSet<String>> =
        [as_set(&[&a, &b]), as_set(&[&c, &d, &e])].into();

    assert_eq!(blocks, expected);
}

#[test]
fn test_no_duplicates_prints_nothing() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"one");
    write(dir.path(), "b", b"two!");

    assert_eq!(render(dir.path().to_path_buf()), "");
}
