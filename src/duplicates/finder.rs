//! Duplicate finder: wires the pipeline stages together.
//!
//! # Overview
//!
//! [`DuplicateFinder::run`] spawns the four stages of
//! [`crate::duplicates::pipeline`], forwards every confirmed group to an
//! [`Emitter`] as it arrives, then joins the workers and folds their
//! counters into a [`ScanSummary`].
//!
//! # Example
//!
//! ```no_run
//! use dupsift::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::PathBuf;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_workers(8));
//! let (groups, summary) = finder.find_duplicates(&[PathBuf::from(".")]).unwrap();
//!
//! println!("Found {} duplicate groups", groups.len());
//! println!("Reclaimable space: {}", summary.reclaimable_display());
//! ```

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use crossbeam_channel::Receiver;

use super::groups::{DuplicateGroup, GroupingStats};
use super::pipeline::{
    ContentHasher, EnumerationStats, Enumerator, HashGrouper, HashingStats, SizeGrouper, StageJoin,
};
use crate::diagnostics::{self, Diagnostic, SharedSink};
use crate::output::Emitter;
use crate::scanner::{HashAlgorithm, Hasher, WalkerConfig};

/// Default number of workers in each pooled stage.
pub const DEFAULT_WORKERS: usize = 4;

/// Default capacity of each inter-stage queue.
pub const DEFAULT_BUFFER: usize = 0;

/// Validated settings for one scan.
#[derive(Debug, Clone)]
pub struct FinderConfig {
    /// Traversal and filtering options
    pub walker_config: WalkerConfig,
    /// Include permission bits in the equivalence key
    pub perm: bool,
    /// Content digest
    pub algorithm: HashAlgorithm,
    /// Capacity of every inter-stage queue (0 = rendezvous)
    pub buffer: usize,
    /// Worker count of the enumeration and hashing pools
    pub workers: usize,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            walker_config: WalkerConfig::default(),
            perm: false,
            algorithm: HashAlgorithm::default(),
            buffer: DEFAULT_BUFFER,
            workers: DEFAULT_WORKERS,
        }
    }
}

impl FinderConfig {
    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Include permission bits in the equivalence key.
    #[must_use]
    pub fn with_perm(mut self, perm: bool) -> Self {
        self.perm = perm;
        self
    }

    /// Set the content digest.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the inter-stage queue capacity.
    #[must_use]
    pub fn with_buffer(mut self, buffer: usize) -> Self {
        self.buffer = buffer;
        self
    }

    /// Set the pooled stage worker count (at least 1).
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }
}

/// Counters from a completed scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Distinct roots walked
    pub roots: usize,
    /// Files that passed the filters
    pub files_enumerated: usize,
    /// Traversal errors (unreadable directories, missing roots)
    pub enumeration_errors: usize,
    /// Files sharing their coarse key with another file
    pub size_candidates: usize,
    /// Files hashed successfully
    pub files_hashed: usize,
    /// Candidates dropped because they could not be read
    pub hash_failures: usize,
    /// Bytes read while hashing
    pub bytes_hashed: u64,
    /// Duplicate groups emitted
    pub duplicate_groups: usize,
    /// Files in emitted groups, excluding one original per group
    pub duplicate_files: usize,
    /// Bytes held by the redundant copies
    pub reclaimable_space: u64,
    /// Wall-clock time of the scan
    pub scan_duration: Duration,
}

impl ScanSummary {
    /// Whether any file or directory could not be processed.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.enumeration_errors > 0 || self.hash_failures > 0
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Format hashed bytes as human-readable string.
    #[must_use]
    pub fn bytes_hashed_display(&self) -> String {
        ByteSize::b(self.bytes_hashed).to_string()
    }

    fn record_group(&mut self, duplicate_files: usize, wasted_space: u64) {
        self.duplicate_groups += 1;
        self.duplicate_files += duplicate_files;
        self.reclaimable_space += wasted_space;
    }

    fn log(&self) {
        log::info!(
            "Scanned {} root(s): {} files, {} size candidates, {} hashed ({})",
            self.roots,
            self.files_enumerated,
            self.size_candidates,
            self.files_hashed,
            self.bytes_hashed_display()
        );
        log::info!(
            "Found {} duplicate group(s), {} redundant file(s), {} reclaimable in {:.2?}",
            self.duplicate_groups,
            self.duplicate_files,
            self.reclaimable_display(),
            self.scan_duration
        );
        if self.has_errors() {
            log::warn!(
                "{} traversal error(s), {} file(s) could not be hashed",
                self.enumeration_errors,
                self.hash_failures
            );
        }
    }
}

/// Errors that abort a scan.
///
/// Per-file problems are logged and counted, never returned here.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// A worker thread could not be started.
    #[error("Failed to start {stage} worker: {source}")]
    Spawn {
        /// Stage the worker belonged to
        stage: &'static str,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A worker thread panicked.
    #[error("A {stage} worker panicked")]
    WorkerPanicked {
        /// Stage the worker belonged to
        stage: &'static str,
    },

    /// Emitting a group failed.
    #[error("Failed to write output")]
    Output(#[from] std::io::Error),
}

/// Runs the duplicate detection pipeline.
pub struct DuplicateFinder {
    config: FinderConfig,
    diagnostics: Option<SharedSink>,
}

impl DuplicateFinder {
    /// Create a finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self {
            config,
            diagnostics: None,
        }
    }

    /// Attach a sink receiving every stage decision.
    #[must_use]
    pub fn with_diagnostics(mut self, sink: SharedSink) -> Self {
        self.diagnostics = Some(sink);
        self
    }

    /// Scan `roots`, passing each duplicate group to `emitter` as soon as
    /// it is confirmed.
    ///
    /// Roots that appear more than once are walked once. A missing or
    /// unreadable root is logged and counted, it does not abort the scan.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError`] if a worker cannot be started or panics,
    /// or if the emitter fails. Workers are joined before returning.
    pub fn run<E: Emitter>(
        &self,
        roots: &[PathBuf],
        emitter: &mut E,
    ) -> Result<ScanSummary, FinderError> {
        let start = Instant::now();
        let roots = distinct_roots(roots);
        let config = &self.config;
        let sink = self.diagnostics.clone();

        log::info!(
            "Scanning {} root(s) with {} worker(s), buffer {}, hash {}",
            roots.len(),
            config.workers,
            config.buffer,
            config.algorithm
        );

        let mut summary = ScanSummary {
            roots: roots.len(),
            ..Default::default()
        };

        let (files, enumerate) =
            Enumerator::new(config.walker_config.clone(), config.workers, sink.clone())
                .spawn(roots, config.buffer)?
                .into_parts();
        let (candidates, size_group) = SizeGrouper::new(config.perm, sink.clone())
            .spawn(files, config.buffer)?
            .into_parts();
        let hasher = Hasher::new(config.algorithm);
        let (hashed, hash) = ContentHasher::new(hasher, config.workers, sink.clone())
            .spawn(candidates, config.buffer)?
            .into_parts();
        let (groups, hash_group) = HashGrouper::new(config.perm, sink.clone())
            .spawn(hashed, config.buffer)?
            .into_parts();

        let emit_result = emit_groups(&groups, emitter, &mut summary);
        // Closing the final queue unblocks any stage still sending
        drop(groups);

        let enumerated: EnumerationStats = finish_stage(enumerate, sink.as_ref(), |s| s.files)?;
        let sized: GroupingStats =
            finish_stage(size_group, sink.as_ref(), |s| s.potential_duplicates)?;
        let hashing: HashingStats = finish_stage(hash, sink.as_ref(), |s| s.hashed)?;
        let _: GroupingStats =
            finish_stage(hash_group, sink.as_ref(), |s| s.duplicate_groups)?;

        emit_result?;
        emitter.finish()?;

        summary.files_enumerated = enumerated.files;
        summary.enumeration_errors = enumerated.errors;
        summary.size_candidates = sized.potential_duplicates;
        summary.files_hashed = hashing.hashed;
        summary.hash_failures = hashing.failed;
        summary.bytes_hashed = hashing.bytes;
        summary.scan_duration = start.elapsed();

        summary.log();
        Ok(summary)
    }

    /// Scan `roots` and collect every duplicate group in memory.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError`] if a worker cannot be started or panics.
    pub fn find_duplicates(
        &self,
        roots: &[PathBuf],
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let mut groups = Vec::new();
        let summary = self.run(roots, &mut groups)?;
        Ok((groups, summary))
    }
}

fn distinct_roots(roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    roots
        .iter()
        .filter(|root| {
            let first = seen.insert(root.as_path());
            if !first {
                log::debug!("Ignoring repeated root: {}", root.display());
            }
            first
        })
        .cloned()
        .collect()
}

/// Pass groups to `emitter` until the queue closes or a write fails. Only
/// groups the emitter accepted are counted.
fn emit_groups<E: Emitter>(
    groups: &Receiver<DuplicateGroup>,
    emitter: &mut E,
    summary: &mut ScanSummary,
) -> std::io::Result<()> {
    for group in groups.iter() {
        let (duplicate_files, wasted_space) = (group.duplicate_count(), group.wasted_space());
        emitter.emit(group)?;
        summary.record_group(duplicate_files, wasted_space);
    }
    Ok(())
}

fn finish_stage<S>(
    join: StageJoin<S>,
    sink: Option<&SharedSink>,
    emitted: impl FnOnce(&S) -> usize,
) -> Result<S, FinderError>
where
    S: Default + std::ops::AddAssign,
{
    let stage = join.stage();
    let workers = join.workers();
    let stats = join.join()?;
    let emitted = emitted(&stats);
    log::debug!("{stage}: {workers} worker(s) finished, {emitted} item(s) sent on");
    diagnostics::record(sink, || Diagnostic::StageFinished { stage, emitted });
    Ok(stats)
}
