//! Command-line interface definitions for dupsift.
//!
//! Every option that shapes the scan is optional here so that an unset flag
//! leaves the config file or environment value in place. See
//! [`crate::config::Config::apply_cli`].
//!
//! # Example
//!
//! ```bash
//! # Recursively scan two trees, matching permissions too
//! dupsift -r -p ~/photos /mnt/backup/photos
//!
//! # SHA-1, eight hashing workers, skip empty and hidden files
//! dupsift -r --hash sha1 -j 8 --no-empty --no-hidden .
//! ```

use clap::Parser;
use std::path::PathBuf;

/// Find files with identical content.
///
/// Prints each group of duplicates as one path per line, with a blank line
/// between groups.
#[derive(Debug, Parser)]
#[command(name = "dupsift")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Paths to scan (default: current directory)
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recurse: bool,

    /// Only match files that also share permission bits
    #[arg(short, long)]
    pub perm: bool,

    /// Content hash: md5 or sha1 (default: md5)
    #[arg(long, value_name = "ALG")]
    pub hash: Option<String>,

    /// Skip zero-length files
    #[arg(long)]
    pub no_empty: bool,

    /// Skip files whose name starts with a dot
    #[arg(long)]
    pub no_hidden: bool,

    /// Follow symbolic links
    ///
    /// Warning: links forming a cycle are reported and skipped.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Capacity of each queue between stages (default: 0, unbuffered)
    #[arg(long, value_name = "N")]
    pub buffer: Option<usize>,

    /// Number of walking and hashing workers (default: 4)
    #[arg(short = 'j', long, value_name = "N")]
    pub workers: Option<usize>,

    /// Explicit config file (TOML)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity, tracing every pipeline decision (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all logging except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

impl Cli {
    /// Roots to scan, defaulting to the current directory.
    #[must_use]
    pub fn roots(&self) -> Vec<PathBuf> {
        if self.paths.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            self.paths.clone()
        }
    }
}
