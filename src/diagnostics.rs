//! Diagnostic tracing of pipeline decisions.
//!
//! Each pipeline stage receives an optional [`DiagnosticSink`] at
//! construction time and reports the decisions it makes (files skipped,
//! candidate groups kept or discarded, files hashed). When no sink is
//! supplied the stage drops its diagnostics; nothing is toggled globally.
//!
//! Per-item errors are not diagnostics. They always go through the `log`
//! facade at warn level.
//!
//! # Example
//!
//! ```
//! use dupsift::diagnostics::{Diagnostic, DiagnosticSink};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! #[derive(Default)]
//! struct Counter(AtomicUsize);
//!
//! impl DiagnosticSink for Counter {
//!     fn record(&self, _diagnostic: &Diagnostic<'_>) {
//!         self.0.fetch_add(1, Ordering::Relaxed);
//!     }
//! }
//! ```

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::duplicates::{CoarseKey, FineKey};

/// Shared handle to a diagnostic sink.
pub type SharedSink = Arc<dyn DiagnosticSink>;

/// Why the walker did not emit a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Zero-length file with `no_empty` set
    Empty,
    /// Dot-prefixed base name with `no_hidden` set
    Hidden,
    /// Symbolic link while links are not followed
    Symlink,
    /// Not a regular file (socket, fifo, device)
    NotRegular,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::Empty => "empty file",
            Self::Hidden => "hidden file",
            Self::Symlink => "symbolic link",
            Self::NotRegular => "not a regular file",
        };
        f.write_str(reason)
    }
}

/// A single decision made by a pipeline stage.
#[derive(Debug)]
pub enum Diagnostic<'a> {
    /// A stage spawned its workers.
    StageStarted {
        /// Stage name
        stage: &'static str,
        /// Number of worker threads
        workers: usize,
    },
    /// Every worker of a stage has returned and been joined.
    StageFinished {
        /// Stage name
        stage: &'static str,
        /// Number of items sent downstream
        emitted: usize,
    },
    /// The walker emitted a file.
    FileDiscovered {
        /// File path
        path: &'a Path,
        /// File size in bytes
        size: u64,
    },
    /// The walker dropped a file.
    FileSkipped {
        /// File path
        path: &'a Path,
        /// Reason the file was dropped
        reason: SkipReason,
    },
    /// The size grouper judged a coarse group.
    CoarseGroup {
        /// Group key
        key: &'a CoarseKey,
        /// Number of paths sharing the key
        members: usize,
        /// Whether the members were sent on for hashing
        kept: bool,
    },
    /// The hasher computed a digest.
    FileHashed {
        /// File path
        path: &'a Path,
        /// Hex digest
        hash: &'a str,
    },
    /// The hash grouper judged a fine group.
    FineGroup {
        /// Group key
        key: &'a FineKey,
        /// Number of paths sharing the key
        members: usize,
        /// Whether the group was emitted as duplicates
        kept: bool,
    },
}

/// Receiver of pipeline diagnostics.
///
/// Implementations are shared across worker threads.
pub trait DiagnosticSink: Send + Sync {
    /// Record one diagnostic.
    fn record(&self, diagnostic: &Diagnostic<'_>);
}

/// Sink that forwards diagnostics to the `log` facade.
///
/// Stage and group decisions go to debug, per-file decisions to trace.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn record(&self, diagnostic: &Diagnostic<'_>) {
        match diagnostic {
            Diagnostic::StageStarted { stage, workers } => {
                log::debug!("{stage}: started with {workers} worker(s)");
            }
            Diagnostic::StageFinished { stage, emitted } => {
                log::debug!("{stage}: finished, {emitted} item(s) sent downstream");
            }
            Diagnostic::FileDiscovered { path, size } => {
                log::trace!("Discovered {} ({} bytes)", path.display(), size);
            }
            Diagnostic::FileSkipped { path, reason } => {
                log::trace!("Skipping {} ({})", path.display(), reason);
            }
            Diagnostic::CoarseGroup { key, members, kept } => {
                if *kept {
                    log::debug!("{key}: {members} candidate(s) sent for hashing");
                } else {
                    log::trace!("{key}: unique, eliminated");
                }
            }
            Diagnostic::FileHashed { path, hash } => {
                log::trace!("Hashed {} -> {}", path.display(), hash);
            }
            Diagnostic::FineGroup { key, members, kept } => {
                if *kept {
                    log::debug!("{key}: {members} duplicate(s)");
                } else {
                    log::trace!("{key}: {members} member(s) left after hashing, suppressed");
                }
            }
        }
    }
}

/// Record a diagnostic if a sink is present.
///
/// The diagnostic is only built when there is somewhere to send it.
pub(crate) fn record<'a>(sink: Option<&SharedSink>, build: impl FnOnce() -> Diagnostic<'a>) {
    if let Some(sink) = sink {
        sink.record(&build());
    }
}
