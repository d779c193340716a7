//! Streaming file hasher with a configurable digest.
//!
//! # Overview
//!
//! This module provides the [`Hasher`] struct, which streams the full
//! content of a file through the digest chosen at configuration time and
//! returns the lowercase hex encoding of the result.
//!
//! # Example
//!
//! ```no_run
//! use dupsift::scanner::{HashAlgorithm, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new(HashAlgorithm::Sha1);
//! let hash = hasher.full_hash(Path::new("some_file.txt")).unwrap();
//! println!("{hash}");
//! ```

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

use md5::{Digest, Md5};
use sha1::Sha1;

use super::HashError;
use crate::config::ConfigError;

/// Read buffer size used while streaming file content.
pub const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Content digest used for fine grouping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// MD5 (128-bit)
    #[default]
    Md5,
    /// SHA-1 (160-bit)
    Sha1,
}

impl HashAlgorithm {
    /// Name accepted on the command line and in config files.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
        }
    }

    /// Length of the hex digest produced by this algorithm.
    #[must_use]
    pub fn hex_len(self) -> usize {
        match self {
            Self::Md5 => 32,
            Self::Sha1 => 40,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "md5" => Ok(Self::Md5),
            "sha1" => Ok(Self::Sha1),
            other => Err(ConfigError::UnknownHash(other.to_string())),
        }
    }
}

/// Full-content file hasher.
#[derive(Debug, Clone, Copy)]
pub struct Hasher {
    algorithm: HashAlgorithm,
}

impl Hasher {
    /// Create a hasher for the given algorithm.
    #[must_use]
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Hash the entire content of a file.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read.
    pub fn full_hash(&self, path: &Path) -> Result<String, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path.to_path_buf(), e))?;
        self.hash_reader(file)
            .map_err(|e| HashError::from_io(path.to_path_buf(), e))
    }

    /// Hash everything readable from `reader`.
    ///
    /// # Errors
    ///
    /// Propagates read errors other than `Interrupted`.
    pub fn hash_reader<R: Read>(&self, reader: R) -> io::Result<String> {
        match self.algorithm {
            HashAlgorithm::Md5 => digest_reader::<Md5, R>(reader),
            HashAlgorithm::Sha1 => digest_reader::<Sha1, R>(reader),
        }
    }
}

fn digest_reader<D: Digest, R: Read>(mut reader: R) -> io::Result<String> {
    let mut digest = D::new();
    let mut buffer = vec![0u8; READ_BUFFER_SIZE];

    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        digest.update(&buffer[..n]);
    }

    Ok(digest.finalize().iter().map(|b| format!("{b:02x}")).collect())
}
