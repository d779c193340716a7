//! Pipeline stages connected by bounded queues.
//!
//! # Overview
//!
//! ```text
//! roots ─► Enumerator (N workers) ─► SizeGrouper (1)
//!       ─► ContentHasher (N workers) ─► HashGrouper (1) ─► groups
//! ```
//!
//! Every stage owns the sending half of its output queue. Each worker
//! thread holds one sender clone, so a queue closes exactly when the last
//! worker of the upstream stage returns. The grouping stages read their
//! input to the end before emitting anything.
//!
//! Queues are `crossbeam_channel::bounded`: a capacity of 0 makes every
//! hand-off a rendezvous. Capacity only controls buffering; concurrency is
//! set by the worker count.
//!
//! Workers report their counters through their join handle, so no state is
//! shared between threads apart from the queues.

use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};

use super::finder::FinderError;
use super::groups::{CoarseGroups, DuplicateGroup, FineGroups, GroupingStats};
use crate::diagnostics::{self, Diagnostic, SharedSink};
use crate::scanner::{FileDescriptor, Hasher, Walker, WalkerConfig};

/// Create an inter-stage queue with the given capacity.
#[must_use]
pub fn queue<T>(capacity: usize) -> (Sender<T>, Receiver<T>) {
    crossbeam_channel::bounded(capacity)
}

/// A running stage: its output queue plus the handles of its workers.
#[derive(Debug)]
pub struct Stage<T, S> {
    output: Receiver<T>,
    join: StageJoin<S>,
}

impl<T, S> Stage<T, S> {
    /// Split into the output queue and the join handles.
    #[must_use]
    pub fn into_parts(self) -> (Receiver<T>, StageJoin<S>) {
        (self.output, self.join)
    }
}

impl<T, S> Stage<T, S>
where
    S: Default + std::ops::AddAssign,
{
    /// Drain the output queue, then join every worker.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::WorkerPanicked`] if a worker panicked.
    pub fn collect(self) -> Result<(Vec<T>, S), FinderError> {
        let items: Vec<T> = self.output.iter().collect();
        let stats = self.join.join()?;
        Ok((items, stats))
    }
}

/// Join handles of one stage's workers.
#[derive(Debug)]
pub struct StageJoin<S> {
    stage: &'static str,
    handles: Vec<JoinHandle<S>>,
}

impl<S> StageJoin<S>
where
    S: Default + std::ops::AddAssign,
{
    /// Name of the stage these workers belong to.
    #[must_use]
    pub fn stage(&self) -> &'static str {
        self.stage
    }

    /// Number of workers in the stage.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.handles.len()
    }

    /// Wait for every worker and sum their counters.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::WorkerPanicked`] if any worker panicked. All
    /// workers are joined before the error is returned.
    pub fn join(self) -> Result<S, FinderError> {
        let mut total = S::default();
        let mut panicked = false;
        for handle in self.handles {
            match handle.join() {
                Ok(stats) => total += stats,
                Err(_) => panicked = true,
            }
        }
        if panicked {
            log::error!("{}: worker thread panicked", self.stage);
            return Err(FinderError::WorkerPanicked { stage: self.stage });
        }
        Ok(total)
    }
}

fn spawn_worker<S, F>(
    name: String,
    stage: &'static str,
    work: F,
) -> Result<JoinHandle<S>, FinderError>
where
    S: Send + 'static,
    F: FnOnce() -> S + Send + 'static,
{
    thread::Builder::new()
        .name(name)
        .spawn(work)
        .map_err(|source| FinderError::Spawn { stage, source })
}

// ============================================================================
// Enumerator
// ============================================================================

/// Counters from the enumeration stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnumerationStats {
    /// Roots fully walked
    pub roots: usize,
    /// Files sent downstream
    pub files: usize,
    /// Entries skipped because of traversal errors
    pub errors: usize,
}

impl std::ops::AddAssign for EnumerationStats {
    fn add_assign(&mut self, other: Self) {
        self.roots += other.roots;
        self.files += other.files;
        self.errors += other.errors;
    }
}

/// Walks every root with a fixed pool of workers.
pub struct Enumerator {
    config: WalkerConfig,
    workers: usize,
    diagnostics: Option<SharedSink>,
}

impl Enumerator {
    /// Stage name used for threads and diagnostics.
    pub const NAME: &'static str = "enumerate";

    /// Create the stage. At most `workers` roots are walked at once.
    #[must_use]
    pub fn new(config: WalkerConfig, workers: usize, diagnostics: Option<SharedSink>) -> Self {
        Self {
            config,
            workers: workers.max(1),
            diagnostics,
        }
    }

    /// Start walking `roots`, sending descriptors into a queue of
    /// `capacity`.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Spawn`] if a worker thread cannot be created.
    pub fn spawn(
        &self,
        roots: Vec<PathBuf>,
        capacity: usize,
    ) -> Result<Stage<FileDescriptor, EnumerationStats>, FinderError> {
        let pool = self.workers.min(roots.len()).max(1);

        let (work_tx, work_rx) = crossbeam_channel::unbounded::<PathBuf>();
        for root in roots {
            if work_tx.send(root).is_err() {
                break;
            }
        }
        drop(work_tx);

        let (tx, rx) = queue(capacity);
        diagnostics::record(self.diagnostics.as_ref(), || Diagnostic::StageStarted {
            stage: Self::NAME,
            workers: pool,
        });

        let mut handles = Vec::with_capacity(pool);
        for id in 0..pool {
            let work_rx = work_rx.clone();
            let tx = tx.clone();
            let config = self.config.clone();
            let sink = self.diagnostics.clone();
            handles.push(spawn_worker(
                format!("dupsift-{}-{id}", Self::NAME),
                Self::NAME,
                move || enumerate_worker(&work_rx, &tx, &config, sink),
            )?);
        }

        Ok(Stage {
            output: rx,
            join: StageJoin {
                stage: Self::NAME,
                handles,
            },
        })
    }
}

fn enumerate_worker(
    work: &Receiver<PathBuf>,
    out: &Sender<FileDescriptor>,
    config: &WalkerConfig,
    sink: Option<SharedSink>,
) -> EnumerationStats {
    let mut stats = EnumerationStats::default();

    for root in work.iter() {
        log::debug!("Walking {}", root.display());
        let walker = Walker::new(&root, config.clone()).with_diagnostics(sink.clone());
        for result in walker.walk() {
            match result {
                Ok(file) => {
                    if out.send(file).is_err() {
                        log::debug!("{}: downstream closed, stopping", Enumerator::NAME);
                        return stats;
                    }
                    stats.files += 1;
                }
                // Already logged by the walker
                Err(_) => stats.errors += 1,
            }
        }
        stats.roots += 1;
    }

    stats
}

// ============================================================================
// SizeGrouper
// ============================================================================

/// Single aggregating stage that keeps files sharing a size (and mode).
pub struct SizeGrouper {
    perm: bool,
    diagnostics: Option<SharedSink>,
}

impl SizeGrouper {
    /// Stage name used for threads and diagnostics.
    pub const NAME: &'static str = "size-group";

    /// Create the stage. `perm` adds permission bits to the key.
    #[must_use]
    pub fn new(perm: bool, diagnostics: Option<SharedSink>) -> Self {
        Self { perm, diagnostics }
    }

    /// Start grouping `input`. Nothing is emitted until `input` closes.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Spawn`] if the thread cannot be created.
    pub fn spawn(
        &self,
        input: Receiver<FileDescriptor>,
        capacity: usize,
    ) -> Result<Stage<FileDescriptor, GroupingStats>, FinderError> {
        let (tx, rx) = queue(capacity);
        let perm = self.perm;
        let sink = self.diagnostics.clone();
        diagnostics::record(sink.as_ref(), || Diagnostic::StageStarted {
            stage: Self::NAME,
            workers: 1,
        });

        let handle = spawn_worker(format!("dupsift-{}", Self::NAME), Self::NAME, move || {
            let mut groups = CoarseGroups::new(perm);
            for file in input.iter() {
                groups.insert(file);
            }

            let (candidates, stats) = groups.into_candidates(sink.as_ref());
            log::debug!(
                "{}: {} files -> {} candidates ({:.1}% eliminated)",
                Self::NAME,
                stats.total_files,
                stats.potential_duplicates,
                stats.elimination_rate()
            );

            for file in candidates {
                if tx.send(file).is_err() {
                    break;
                }
            }
            stats
        })?;

        Ok(Stage {
            output: rx,
            join: StageJoin {
                stage: Self::NAME,
                handles: vec![handle],
            },
        })
    }
}

// ============================================================================
// ContentHasher
// ============================================================================

/// Counters from the hashing stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HashingStats {
    /// Files hashed and sent downstream
    pub hashed: usize,
    /// Files dropped because they could not be read
    pub failed: usize,
    /// Bytes read while hashing
    pub bytes: u64,
}

impl std::ops::AddAssign for HashingStats {
    fn add_assign(&mut self, other: Self) {
        self.hashed += other.hashed;
        self.failed += other.failed;
        self.bytes += other.bytes;
    }
}

/// Hashes candidates with a fixed pool of workers.
pub struct ContentHasher {
    hasher: Hasher,
    workers: usize,
    diagnostics: Option<SharedSink>,
}

impl ContentHasher {
    /// Stage name used for threads and diagnostics.
    pub const NAME: &'static str = "hash";

    /// Create the stage with `workers` hashing threads.
    #[must_use]
    pub fn new(hasher: Hasher, workers: usize, diagnostics: Option<SharedSink>) -> Self {
        Self {
            hasher,
            workers: workers.max(1),
            diagnostics,
        }
    }

    /// Start hashing `input`. Every worker pulls from the same queue.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Spawn`] if a worker thread cannot be created.
    pub fn spawn(
        &self,
        input: Receiver<FileDescriptor>,
        capacity: usize,
    ) -> Result<Stage<FileDescriptor, HashingStats>, FinderError> {
        let (tx, rx) = queue(capacity);
        diagnostics::record(self.diagnostics.as_ref(), || Diagnostic::StageStarted {
            stage: Self::NAME,
            workers: self.workers,
        });

        let mut handles = Vec::with_capacity(self.workers);
        for id in 0..self.workers {
            let input = input.clone();
            let tx = tx.clone();
            let hasher = self.hasher;
            let sink = self.diagnostics.clone();
            handles.push(spawn_worker(
                format!("dupsift-{}-{id}", Self::NAME),
                Self::NAME,
                move || hash_worker(&input, &tx, hasher, sink),
            )?);
        }

        Ok(Stage {
            output: rx,
            join: StageJoin {
                stage: Self::NAME,
                handles,
            },
        })
    }
}

fn hash_worker(
    input: &Receiver<FileDescriptor>,
    out: &Sender<FileDescriptor>,
    hasher: Hasher,
    sink: Option<SharedSink>,
) -> HashingStats {
    let mut stats = HashingStats::default();

    for file in input.iter() {
        match hasher.full_hash(&file.path) {
            Ok(hash) => {
                diagnostics::record(sink.as_ref(), || Diagnostic::FileHashed {
                    path: &file.path,
                    hash: &hash,
                });
                stats.hashed += 1;
                stats.bytes += file.size;
                if out.send(file.with_hash(hash)).is_err() {
                    log::debug!("{}: downstream closed, stopping", ContentHasher::NAME);
                    break;
                }
            }
            Err(e) => {
                log::warn!("Failed to hash {}: {}", file.path.display(), e);
                stats.failed += 1;
            }
        }
    }

    stats
}

// ============================================================================
// HashGrouper
// ============================================================================

/// Single aggregating stage that emits groups of identical content.
pub struct HashGrouper {
    perm: bool,
    diagnostics: Option<SharedSink>,
}

impl HashGrouper {
    /// Stage name used for threads and diagnostics.
    pub const NAME: &'static str = "hash-group";

    /// Create the stage. `perm` adds permission bits to the key.
    #[must_use]
    pub fn new(perm: bool, diagnostics: Option<SharedSink>) -> Self {
        Self { perm, diagnostics }
    }

    /// Start grouping `input`. Nothing is emitted until `input` closes.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Spawn`] if the thread cannot be created.
    pub fn spawn(
        &self,
        input: Receiver<FileDescriptor>,
        capacity: usize,
    ) -> Result<Stage<DuplicateGroup, GroupingStats>, FinderError> {
        let (tx, rx) = queue(capacity);
        let perm = self.perm;
        let sink = self.diagnostics.clone();
        diagnostics::record(sink.as_ref(), || Diagnostic::StageStarted {
            stage: Self::NAME,
            workers: 1,
        });

        let handle = spawn_worker(format!("dupsift-{}", Self::NAME), Self::NAME, move || {
            let mut groups = FineGroups::new(perm);
            for file in input.iter() {
                groups.insert(file);
            }

            let (duplicates, stats) = groups.into_duplicates(sink.as_ref());
            log::debug!(
                "{}: {} hashed files -> {} duplicate group(s)",
                Self::NAME,
                stats.total_files,
                stats.duplicate_groups
            );

            for group in duplicates {
                if tx.send(group).is_err() {
                    break;
                }
            }
            stats
        })?;

        Ok(Stage {
            output: rx,
            join: StageJoin {
                stage: Self::NAME,
                handles: vec![handle],
            },
        })
    }
}

impl std::ops::AddAssign for GroupingStats {
    fn add_assign(&mut self, other: Self) {
        self.total_files += other.total_files;
        self.unique_keys += other.unique_keys;
        self.eliminated_unique += other.eliminated_unique;
        self.potential_duplicates += other.potential_duplicates;
        self.duplicate_groups += other.duplicate_groups;
    }
}
