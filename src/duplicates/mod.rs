//! Duplicate detection.
//!
//! This module provides:
//! - Equivalence keys and grouping maps ([`groups`])
//! - The threaded stages and their queues ([`pipeline`])
//! - The orchestrator tying them together ([`finder`])

pub mod finder;
pub mod groups;
pub mod pipeline;

pub use finder::{
    DuplicateFinder, FinderConfig, FinderError, ScanSummary, DEFAULT_BUFFER, DEFAULT_WORKERS,
};
pub use groups::{
    group_by_hash, group_by_size, CoarseGroups, CoarseKey, DuplicateGroup, FineGroups, FineKey,
    GroupingStats,
};
pub use pipeline::{
    queue, ContentHasher, EnumerationStats, Enumerator, HashGrouper, HashingStats, SizeGrouper,
    Stage, StageJoin,
};
