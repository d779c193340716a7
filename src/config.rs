//! Layered configuration.
//!
//! Settings are merged with `figment`, later layers winning:
//!
//! 1. Built-in defaults
//! 2. A TOML file: `--config FILE`, else `dupsift.toml` in the platform
//!    config directory (skipped silently when absent)
//! 3. `DUPSIFT_*` environment variables, e.g. `DUPSIFT_WORKERS=8`
//! 4. Command-line flags, applied by [`Config::apply_cli`]
//!
//! The merged [`Config`] is checked once by [`Config::validate`], which
//! yields the typed [`FinderConfig`] the pipeline runs on.
//!
//! # Example file
//!
//! ```toml
//! recurse = true
//! hash = "sha1"
//! workers = 8
//! no_hidden = true
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::duplicates::{FinderConfig, DEFAULT_BUFFER, DEFAULT_WORKERS};
use crate::scanner::{HashAlgorithm, WalkMode, WalkerConfig};

/// File name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "dupsift.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "DUPSIFT_";

/// Invalid or unreadable configuration. Always fatal, before any I/O on the
/// scanned trees.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The hash name is not one of the supported digests.
    #[error("Unknown hash algorithm '{0}' (expected md5 or sha1)")]
    UnknownHash(String),

    /// Pools need at least one worker.
    #[error("workers must be at least 1")]
    ZeroWorkers,

    /// An explicitly requested config file does not exist.
    #[error("Config file not found: {}", .0.display())]
    MissingFile(PathBuf),

    /// A config source could not be read or has the wrong shape.
    #[error("Invalid configuration: {0}")]
    Load(#[from] Box<figment::Error>),
}

/// Scan settings as read from files, environment and flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Descend into subdirectories
    pub recurse: bool,
    /// Match permission bits as well as content
    pub perm: bool,
    /// Digest name
    pub hash: String,
    /// Skip zero-length files
    pub no_empty: bool,
    /// Skip dot-prefixed file names
    pub no_hidden: bool,
    /// Follow symbolic links
    pub follow_symlinks: bool,
    /// Inter-stage queue capacity
    pub buffer: usize,
    /// Enumeration and hashing pool size
    pub workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recurse: false,
            perm: false,
            hash: HashAlgorithm::default().name().to_string(),
            no_empty: false,
            no_hidden: false,
            follow_symlinks: false,
            buffer: DEFAULT_BUFFER,
            workers: DEFAULT_WORKERS,
        }
    }
}

impl Config {
    /// Platform-specific location of the default config file.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dupsift").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// The defaults, file and environment layers, without CLI flags.
    ///
    /// `file` replaces the default config path when given.
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        let path = file.map(Path::to_path_buf).or_else(Self::default_path);
        if let Some(path) = path {
            log::debug!("Reading config file {}", path.display());
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load the defaults, file and environment layers.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingFile`] if `file` is given but does not
    /// exist, and [`ConfigError::Load`] if a source is malformed.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = file {
            if !path.is_file() {
                return Err(ConfigError::MissingFile(path.to_path_buf()));
            }
        }
        let config: Self = Self::figment(file).extract().map_err(Box::new)?;
        log::debug!("Loaded configuration: {config:?}");
        Ok(config)
    }

    /// Overlay command-line flags. Flags that were not given leave the
    /// current value alone.
    pub fn apply_cli(&mut self, cli: &Cli) {
        self.recurse |= cli.recurse;
        self.perm |= cli.perm;
        self.no_empty |= cli.no_empty;
        self.no_hidden |= cli.no_hidden;
        self.follow_symlinks |= cli.follow_symlinks;
        if let Some(hash) = &cli.hash {
            self.hash.clone_from(hash);
        }
        if let Some(buffer) = cli.buffer {
            self.buffer = buffer;
        }
        if let Some(workers) = cli.workers {
            self.workers = workers;
        }
    }

    /// Check the settings and convert them for the finder.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownHash`] for an unsupported digest name
    /// and [`ConfigError::ZeroWorkers`] when `workers` is 0.
    pub fn validate(&self) -> Result<FinderConfig, ConfigError> {
        let algorithm: HashAlgorithm = self.hash.parse()?;
        if self.workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }

        let mode = if self.recurse {
            WalkMode::Recursive
        } else {
            WalkMode::Shallow
        };
        let walker_config =
            WalkerConfig::new(mode, self.follow_symlinks, self.no_hidden, self.no_empty);

        Ok(FinderConfig::default()
            .with_walker_config(walker_config)
            .with_perm(self.perm)
            .with_algorithm(algorithm)
            .with_buffer(self.buffer)
            .with_workers(self.workers))
    }
}
