//! dupfind - duplicate file finder
//!
//! Walks a directory tree, digests every regular file with a 128-bit
//! BLAKE3 fingerprint, and confirms each candidate duplicate byte for byte
//! before reporting it.
//!
//! The library entry point is [`duplicates::find_duplicates`]; the binary
//! drives [`run_app`].

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::env;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use cli::{Cli, OutputFormat};
use config::Config;
use duplicates::DuplicateFinder;
use error::ExitCode;
use output::{JsonOutput, TextOutput};
use progress::Progress;

/// Run the command line application.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded, the scan fails or is
/// interrupted, or the report cannot be written.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let mut config =
        Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config.apply_args(&cli);

    let root = resolve_root(cli.path.as_deref())?;
    let handler = signal::install_handler()?;

    let mut finder_config = config.finder_config().with_shutdown_flag(handler.flag());
    if config.progress {
        finder_config = finder_config.with_progress_callback(Arc::new(Progress::new(false)));
    }

    let (groups, summary) = DuplicateFinder::new(finder_config)
        .find_duplicates(&root)
        .with_context(|| format!("Failed to scan {}", root.display()))?;

    let exit_code = ExitCode::from_scan(groups.len(), summary.skipped_files.len());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.output {
        OutputFormat::Text => {
            let color = !cli.no_color && stdout.is_terminal();
            TextOutput::new(&root, &groups)
                .with_color(color)
                .write_to(&mut out)
                .context("Failed to write report")?;

            log::info!(
                "Scanned {} files ({}) in {:.2?}, {} reclaimable",
                summary.total_files,
                summary.total_size_display(),
                summary.scan_duration,
                summary.reclaimable_display()
            );
            if summary.is_partial() {
                log::warn!(
                    "{} files or directories could not be read",
                    summary.skipped_files.len()
                );
            }
        }
        OutputFormat::Json => {
            JsonOutput::new(&groups, &summary, exit_code)
                .write_to(&mut out, true)
                .context("Failed to write report")?;
        }
    }

    Ok(exit_code)
}

/// Directory to scan: the given path resolved against the working
/// directory, or the directory containing the executable.
fn resolve_root(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(path) if path.is_absolute() => Ok(path.to_path_buf()),
        Some(path) => Ok(env::current_dir()
            .context("Failed to determine working directory")?
            .join(path)),
        None => {
            let exe = env::current_exe().context("Failed to locate executable")?;
            exe.parent()
                .map(Path::to_path_buf)
                .with_context(|| format!("{} has no parent directory", exe.display()))
        }
    }
}
