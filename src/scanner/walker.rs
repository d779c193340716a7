//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing one root and
//! collecting the metadata needed for duplicate detection. It supports two
//! depths:
//!
//! - [`WalkMode::Shallow`]: only the direct children of the root
//! - [`WalkMode::Recursive`]: the full tree below the root
//!
//! Only regular files are yielded. Traversal errors are yielded as
//! [`ScanError`] values and never stop iteration, so an unreadable
//! subdirectory only loses its own subtree.
//!
//! # Example
//!
//! ```no_run
//! use dupsift::scanner::{Walker, WalkerConfig, WalkMode};
//! use std::path::Path;
//!
//! let config = WalkerConfig {
//!     mode: WalkMode::Recursive,
//!     skip_hidden: true,
//!     ..Default::default()
//! };
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), config);
//! let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Found {} files", files.len());
//! ```

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use super::{is_hidden_name, FileDescriptor, ScanError, WalkMode, WalkerConfig};
use crate::diagnostics::{self, Diagnostic, SharedSink, SkipReason};

/// Directory walker for a single root.
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional sink for skip/discover decisions
    diagnostics: Option<SharedSink>,
}

impl std::fmt::Debug for Walker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walker")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("diagnostics", &self.diagnostics.as_ref().map(|_| "<sink>"))
            .finish()
    }
}

impl Walker {
    /// Create a new walker for the given root.
    ///
    /// An empty root means the current directory.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        let root = if path.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            path.to_path_buf()
        };
        Self {
            root,
            config,
            diagnostics: None,
        }
    }

    /// Report skip/discover decisions to `sink`.
    #[must_use]
    pub fn with_diagnostics(mut self, sink: Option<SharedSink>) -> Self {
        self.diagnostics = sink;
        self
    }

    /// The root this walker starts from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the root, yielding file descriptors.
    ///
    /// Returns a lazy iterator over [`FileDescriptor`] results. Errors are
    /// yielded as [`ScanError`] values rather than stopping iteration.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileDescriptor, ScanError>> + '_ {
        let walk_dir = WalkDir::new(&self.root).follow_links(self.config.follow_symlinks);
        let walk_dir = match self.config.mode {
            // Depth 0 is the root itself; a file root has no children
            WalkMode::Shallow => walk_dir.min_depth(1).max_depth(1),
            WalkMode::Recursive => walk_dir,
        };

        walk_dir
            .into_iter()
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => self.process_entry(&entry),
                Err(e) => Some(Err(self.handle_walk_error(e))),
            })
    }

    /// Turn a directory entry into a descriptor if it passes every filter.
    fn process_entry(&self, entry: &DirEntry) -> Option<Result<FileDescriptor, ScanError>> {
        let path = entry.path();
        let file_type = entry.file_type();

        if file_type.is_dir() {
            return None;
        }

        if file_type.is_symlink() {
            // With follow_links the type is already the target's, so this
            // is a link we were told not to follow
            self.skip(path, SkipReason::Symlink);
            return None;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => return Some(Err(self.handle_walk_error(e))),
        };

        if !metadata.is_file() {
            self.skip(path, SkipReason::NotRegular);
            return None;
        }

        if self.config.skip_empty && metadata.len() == 0 {
            self.skip(path, SkipReason::Empty);
            return None;
        }

        if self.config.skip_hidden && is_hidden_name(path) {
            self.skip(path, SkipReason::Hidden);
            return None;
        }

        diagnostics::record(self.diagnostics.as_ref(), || Diagnostic::FileDiscovered {
            path,
            size: metadata.len(),
        });

        Some(Ok(FileDescriptor::from_metadata(
            path.to_path_buf(),
            &metadata,
        )))
    }

    fn skip(&self, path: &Path, reason: SkipReason) {
        diagnostics::record(self.diagnostics.as_ref(), || Diagnostic::FileSkipped {
            path,
            reason,
        });
    }

    /// Convert a walkdir error into a [`ScanError`], logging it.
    fn handle_walk_error(&self, error: walkdir::Error) -> ScanError {
        use std::io::ErrorKind;

        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);

        if error.loop_ancestor().is_some() {
            log::warn!("Symlink loop at {}: {}", path.display(), error);
            return ScanError::Walk {
                path,
                message: error.to_string(),
            };
        }

        let message = error.to_string();
        match error.into_io_error() {
            Some(io) if io.kind() == ErrorKind::PermissionDenied => {
                log::warn!("Permission denied: {}", path.display());
                ScanError::PermissionDenied(path)
            }
            Some(io) if io.kind() == ErrorKind::NotFound => {
                log::warn!("Path not found: {}", path.display());
                ScanError::NotFound(path)
            }
            Some(io) => {
                log::warn!("I/O error for {}: {}", path.display(), io);
                ScanError::Io { path, source: io }
            }
            None => {
                log::warn!("Walker error for {}: {}", path.display(), message);
                ScanError::Walk { path, message }
            }
        }
    }
}
