#![allow(dead_code)]

use dupsift::duplicates::{DuplicateFinder, DuplicateGroup, FinderConfig, ScanSummary};
use dupsift::scanner::{WalkMode, WalkerConfig};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Write `content` to `dir/name`, creating parent directories.
pub fn write(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Groups as sets of paths, independent of emission order.
pub fn group_sets(groups: &[DuplicateGroup]) -> BTreeSet<BTreeSet<PathBuf>> {
    groups.iter().map(DuplicateGroup::path_set).collect()
}

/// Build the expected set of groups from lists of paths.
pub fn expected(groups: &[Vec<&PathBuf>]) -> BTreeSet<BTreeSet<PathBuf>> {
    groups
        .iter()
        .map(|members| members.iter().map(|p| (*p).clone()).collect())
        .collect()
}

pub fn recursive() -> FinderConfig {
    FinderConfig::default().with_walker_config(WalkerConfig {
        mode: WalkMode::Recursive,
        ..Default::default()
    })
}

pub fn scan(config: FinderConfig, roots: &[&Path]) -> (Vec<DuplicateGroup>, ScanSummary) {
    let roots: Vec<PathBuf> = roots.iter().map(|r| r.to_path_buf()).collect();
    DuplicateFinder::new(config).find_duplicates(&roots).unwrap()
}
