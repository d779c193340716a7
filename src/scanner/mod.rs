//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Per-root directory walking using walkdir (recursive or single-level)
//! - Streaming content hashing with MD5 or SHA-1
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`hasher`]: Digest selection and streaming file hashing
//!
//! # Example
//!
//! ```no_run
//! use dupsift::scanner::{Walker, WalkerConfig, WalkMode};
//! use std::path::Path;
//!
//! let config = WalkerConfig {
//!     mode: WalkMode::Recursive,
//!     skip_empty: true,
//!     ..Default::default()
//! };
//!
//! let walker = Walker::new(Path::new("."), config);
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod hasher;
pub mod walker;

use std::fs::Metadata;
use std::path::PathBuf;

pub use hasher::{HashAlgorithm, Hasher};
pub use walker::Walker;

/// Metadata for one regular file at a point in time.
///
/// Descriptors are never mutated once built. The hasher produces a new
/// descriptor through [`FileDescriptor::with_hash`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    /// Path to the file as discovered under its root
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Permission bits (including setuid/setgid/sticky on Unix)
    pub mode: u32,
    /// Lowercase hex content digest, once computed
    pub hash: Option<String>,
}

impl FileDescriptor {
    /// Create a descriptor without a content hash.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, mode: u32) -> Self {
        Self {
            path,
            size,
            mode,
            hash: None,
        }
    }

    /// Create a descriptor from filesystem metadata.
    #[must_use]
    pub fn from_metadata(path: PathBuf, metadata: &Metadata) -> Self {
        Self::new(path, metadata.len(), permission_bits(metadata))
    }

    /// Return a copy of this descriptor carrying the given content hash.
    #[must_use]
    pub fn with_hash(self, hash: String) -> Self {
        Self {
            hash: Some(hash),
            ..self
        }
    }

    /// Whether the base name of this file starts with a dot.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        is_hidden_name(&self.path)
    }
}

/// Whether a path's base name starts with `.`.
pub(crate) fn is_hidden_name(path: &std::path::Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with('.'))
}

/// Extract permission bits from metadata.
#[cfg(unix)]
pub(crate) fn permission_bits(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

/// Extract permission bits from metadata.
///
/// Only the read-only attribute is available, mapped onto Unix-like bits.
#[cfg(not(unix))]
pub(crate) fn permission_bits(metadata: &Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}

/// How far below each root the walker descends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WalkMode {
    /// Expand exactly one directory level (the equivalent of `root/*`).
    #[default]
    Shallow,
    /// Traverse the full tree below the root.
    Recursive,
}

/// Configuration for directory walking.
///
/// Controls traversal depth, filtering and symlink handling.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Single-level expansion or full traversal.
    pub mode: WalkMode,

    /// Follow symbolic links during traversal.
    /// When disabled, links are neither followed nor reported.
    pub follow_symlinks: bool,

    /// Skip files whose base name starts with `.`.
    /// Hidden directories are still traversed.
    pub skip_hidden: bool,

    /// Skip zero-length files.
    pub skip_empty: bool,
}

impl WalkerConfig {
    /// Create a new configuration.
    ///
    /// # Arguments
    ///
    /// * `mode` - Walk depth
    /// * `follow_symlinks` - Whether to follow symbolic links
    /// * `skip_hidden` - Whether to skip dot-prefixed files
    /// * `skip_empty` - Whether to skip zero-length files
    #[must_use]
    pub fn new(mode: WalkMode, follow_symlinks: bool, skip_hidden: bool, skip_empty: bool) -> Self {
        Self {
            mode,
            follow_symlinks,
            skip_hidden,
            skip_empty,
        }
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The traversal itself failed (for example a symlink loop).
    #[error("Walk error for {path}: {message}")]
    Walk {
        /// Path where the error occurred
        path: PathBuf,
        /// Description from the walker
        message: String,
    },
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Classify an I/O error raised while hashing `path`.
    #[must_use]
    pub fn from_io(path: PathBuf, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io {
                path,
                source: error,
            },
        }
    }
}
