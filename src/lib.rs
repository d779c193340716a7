//! dupsift - concurrent duplicate file finder
//!
//! Walks one or more roots, groups files by size (and optionally permission
//! bits), hashes only the files that share a size, and prints every group of
//! identical files. Each phase runs on its own threads, connected by bounded
//! queues.

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod scanner;

use std::io::{self, BufWriter};
use std::sync::Arc;

use anyhow::Context;

use crate::cli::Cli;
use crate::config::Config;
use crate::diagnostics::{LogSink, SharedSink};
use crate::duplicates::DuplicateFinder;
use crate::error::ExitCode;
use crate::output::TextEmitter;

/// Run the application for parsed command-line arguments.
///
/// # Errors
///
/// Returns a [`config::ConfigError`] (wrapped in `anyhow`) when the settings
/// are rejected, or the pipeline's error when the scan itself fails.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_cli(&cli);
    let finder_config = config.validate()?;

    let mut finder = DuplicateFinder::new(finder_config);
    if cli.verbose > 0 {
        let sink: SharedSink = Arc::new(LogSink);
        finder = finder.with_diagnostics(sink);
    }

    let roots = cli.roots();
    let stdout = io::stdout();
    let mut emitter = TextEmitter::new(BufWriter::new(stdout.lock()));
    finder
        .run(&roots, &mut emitter)
        .context("Duplicate scan failed")?;
    log::debug!("Wrote {} duplicate group(s)", emitter.groups_written());

    Ok(ExitCode::Success)
}
