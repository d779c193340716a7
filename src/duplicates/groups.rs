//! Equivalence keys and grouping of duplicate candidates.
//!
//! # Overview
//!
//! Duplicate detection groups files twice:
//!
//! 1. **Coarse grouping** by [`CoarseKey`] (size, plus permission bits when
//!    `perm` is enabled). Files alone in their coarse group cannot have a
//!    duplicate and are never hashed.
//! 2. **Fine grouping** by [`FineKey`] (the coarse key plus the content hash).
//!    Only fine groups with two or more members are duplicates.
//!
//! [`CoarseGroups`] and [`FineGroups`] are the accumulation maps. Each is
//! owned by a single aggregating thread in the pipeline; nothing here is
//! shared or locked.
//!
//! # Example
//!
//! ```
//! use dupsift::scanner::FileDescriptor;
//! use dupsift::duplicates::group_by_size;
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     FileDescriptor::new(PathBuf::from("/a.txt"), 5, 0o644),
//!     FileDescriptor::new(PathBuf::from("/b.txt"), 5, 0o644),
//!     FileDescriptor::new(PathBuf::from("/c.txt"), 9, 0o644),
//! ];
//!
//! let (candidates, stats) = group_by_size(files, false);
//!
//! assert_eq!(candidates.len(), 2);
//! assert_eq!(stats.eliminated_unique, 1);
//! ```

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::path::PathBuf;

use crate::diagnostics::{self, Diagnostic, SharedSink};
use crate::scanner::FileDescriptor;

/// Cheap equivalence key: size and, optionally, permission bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoarseKey {
    /// File size in bytes
    pub size: u64,
    /// Permission bits, present only when permissions take part in matching
    pub mode: Option<u32>,
}

impl CoarseKey {
    /// Create a key from its parts.
    #[must_use]
    pub fn new(size: u64, mode: Option<u32>) -> Self {
        Self { size, mode }
    }

    /// Key for a file, including its mode only when `perm` is set.
    #[must_use]
    pub fn for_file(file: &FileDescriptor, perm: bool) -> Self {
        Self::new(file.size, perm.then_some(file.mode))
    }
}

impl fmt::Display for CoarseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            Some(mode) => write!(f, "size {} mode {:04o}", self.size, mode),
            None => write!(f, "size {}", self.size),
        }
    }
}

/// Content equivalence key: the coarse key plus the content hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FineKey {
    /// Size and optional mode
    pub coarse: CoarseKey,
    /// Hex content digest
    pub hash: String,
}

impl FineKey {
    /// Create a key from its parts.
    #[must_use]
    pub fn new(coarse: CoarseKey, hash: String) -> Self {
        Self { coarse, hash }
    }
}

impl fmt::Display for FineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} hash {}", self.coarse, self.hash)
    }
}

/// Confirmed group of files with identical content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// File size in bytes, shared by every member
    pub size: u64,
    /// Shared permission bits when permissions took part in matching
    pub mode: Option<u32>,
    /// Hex content digest, shared by every member
    pub hash: String,
    /// Member paths, in no particular order
    pub paths: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Create a group from its key and members.
    #[must_use]
    pub fn new(key: FineKey, paths: Vec<PathBuf>) -> Self {
        Self {
            size: key.coarse.size,
            mode: key.coarse.mode,
            hash: key.hash,
            paths,
        }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Number of redundant copies (total minus one original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.paths.len().saturating_sub(1)
    }

    /// Space held by the redundant copies.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Members as an ordered set, for order-insensitive comparison.
    #[must_use]
    pub fn path_set(&self) -> BTreeSet<PathBuf> {
        self.paths.iter().cloned().collect()
    }
}

/// Statistics from one grouping pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Number of files inserted
    pub total_files: usize,
    /// Number of distinct keys
    pub unique_keys: usize,
    /// Number of files alone under their key
    pub eliminated_unique: usize,
    /// Number of files in groups of 2+
    pub potential_duplicates: usize,
    /// Number of groups with 2+ files
    pub duplicate_groups: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by this pass.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }

    fn record(&mut self, members: usize) {
        self.unique_keys += 1;
        if members > 1 {
            self.potential_duplicates += members;
            self.duplicate_groups += 1;
        } else {
            self.eliminated_unique += members;
        }
    }
}

/// Accumulation map keyed by [`CoarseKey`].
#[derive(Debug, Default)]
pub struct CoarseGroups {
    perm: bool,
    total_files: usize,
    seen: HashSet<PathBuf>,
    groups: HashMap<CoarseKey, Vec<FileDescriptor>>,
}

impl CoarseGroups {
    /// Create an empty map. `perm` adds permission bits to the key.
    #[must_use]
    pub fn new(perm: bool) -> Self {
        Self {
            perm,
            ..Default::default()
        }
    }

    /// Add one file. A path reached through overlapping roots is only
    /// counted once.
    pub fn insert(&mut self, file: FileDescriptor) {
        if !self.seen.insert(file.path.clone()) {
            log::debug!("Ignoring repeated path: {}", file.path.display());
            return;
        }
        self.total_files += 1;
        let key = CoarseKey::for_file(&file, self.perm);
        self.groups.entry(key).or_default().push(file);
    }

    /// Consume the map, returning every file that shares its key with at
    /// least one other file.
    #[must_use]
    pub fn into_candidates(
        self,
        sink: Option<&SharedSink>,
    ) -> (Vec<FileDescriptor>, GroupingStats) {
        let mut stats = GroupingStats {
            total_files: self.total_files,
            ..Default::default()
        };
        let mut candidates = Vec::new();

        for (key, files) in self.groups {
            stats.record(files.len());
            let kept = files.len() > 1;
            diagnostics::record(sink, || Diagnostic::CoarseGroup {
                key: &key,
                members: files.len(),
                kept,
            });
            if kept {
                candidates.extend(files);
            }
        }

        (candidates, stats)
    }
}

/// Accumulation map keyed by [`FineKey`].
#[derive(Debug, Default)]
pub struct FineGroups {
    perm: bool,
    total_files: usize,
    groups: HashMap<FineKey, Vec<PathBuf>>,
}

impl FineGroups {
    /// Create an empty map. `perm` adds permission bits to the key.
    #[must_use]
    pub fn new(perm: bool) -> Self {
        Self {
            perm,
            ..Default::default()
        }
    }

    /// Add one hashed file. Files without a hash cannot be matched and are
    /// dropped.
    pub fn insert(&mut self, file: FileDescriptor) {
        let coarse = CoarseKey::for_file(&file, self.perm);
        let Some(hash) = file.hash else {
            log::warn!("Dropping unhashed file: {}", file.path.display());
            return;
        };
        self.total_files += 1;
        self.groups
            .entry(FineKey::new(coarse, hash))
            .or_default()
            .push(file.path);
    }

    /// Consume the map, returning every group with two or more members.
    #[must_use]
    pub fn into_duplicates(
        self,
        sink: Option<&SharedSink>,
    ) -> (Vec<DuplicateGroup>, GroupingStats) {
        let mut stats = GroupingStats {
            total_files: self.total_files,
            ..Default::default()
        };
        let mut duplicates = Vec::new();

        for (key, paths) in self.groups {
            stats.record(paths.len());
            let kept = paths.len() > 1;
            diagnostics::record(sink, || Diagnostic::FineGroup {
                key: &key,
                members: paths.len(),
                kept,
            });
            if kept {
                duplicates.push(DuplicateGroup::new(key, paths));
            }
        }

        (duplicates, stats)
    }
}

/// Group files by size (and mode when `perm` is set), keeping only files
/// that share their key with another file.
#[must_use]
pub fn group_by_size(
    files: impl IntoIterator<Item = FileDescriptor>,
    perm: bool,
) -> (Vec<FileDescriptor>, GroupingStats) {
    let mut groups = CoarseGroups::new(perm);
    for file in files {
        groups.insert(file);
    }
    groups.into_candidates(None)
}

/// Group hashed files by size, optional mode and hash, keeping only groups
/// with two or more members.
#[must_use]
pub fn group_by_hash(
    files: impl IntoIterator<Item = FileDescriptor>,
    perm: bool,
) -> (Vec<DuplicateGroup>, GroupingStats) {
    let mut groups = FineGroups::new(perm);
    for file in files {
        groups.insert(file);
    }
    groups.into_duplicates(None)
}
