use crate::cli::Cli;
use crate::config;
use crate::diff::unified_diff;
use crate::transforms::{PatchOptions, PatchReport, patch_source};
use clap::Parser;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(thiserror::Error, Debug)]
pub enum PatchError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Write,
    DryRun,
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_env("INDEXPATCH_LOG").unwrap_or_else(|_| EnvFilter::new("off"));

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

pub fn run() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let cfg = config::load_or_default(cli.config.as_deref())?;
    let target = cli.target.clone().unwrap_or_else(|| cfg.target_or_default());
    let options = PatchOptions {
        lookback: cli.lookback.unwrap_or(cfg.lookback),
    };
    let mode = if cli.dry_run { Mode::DryRun } else { Mode::Write };

    let stdout = io::stdout();
    patch_file(&target, &options, mode, &mut stdout.lock())?;
    Ok(())
}

/// Reads `path`, applies both rules and writes the result back to `path`.
pub fn patch_file(
    path: &Path,
    options: &PatchOptions,
    mode: Mode,
    out: &mut impl Write,
) -> anyhow::Result<PatchReport> {
    tracing::info!(path = %path.display(), ?mode, "patching");
    let original = fs::read_to_string(path).map_err(|source| PatchError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(bytes = original.len(), "read target");

    let report = patch_source(&original, options);
    tracing::info!(
        counted = report.linear_searches,
        replaced = report.lookups_replaced,
        "linear search rewrite"
    );
    if report.linear_searches != report.lookups_replaced {
        tracing::warn!(
            counted = report.linear_searches,
            replaced = report.lookups_replaced,
            "linear search count differs from replacements"
        );
    }
    writeln!(
        out,
        "Replaced {} linear searches with O(1) lookups",
        report.linear_searches
    )?;

    tracing::info!(
        added = report.invalidations_added,
        present = report.invalidations_present,
        "cache invalidation"
    );
    writeln!(out, "Added cache invalidation to all update functions")?;

    match mode {
        Mode::DryRun => {
            write!(out, "{}", unified_diff(path, &original, &report.text))?;
            writeln!(out, "Dry run: {} not modified", path.display())?;
        }
        Mode::Write => {
            if !report.changed() {
                tracing::debug!("no changes, rewriting unchanged contents");
            }
            fs::write(path, &report.text).map_err(|source| PatchError::Write {
                path: path.to_path_buf(),
                source,
            })?;
            tracing::debug!(bytes = report.text.len(), "wrote target");
            writeln!(out, "✅ All update functions optimized!")?;
        }
    }

    Ok(report)
}
