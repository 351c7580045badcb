//! Per-file driver: read, scan, analyze, write. Batches isolate failures.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use log::{debug, error, warn};

use crate::Result;
use crate::config::{DownloadConfig, RunConfig};
use crate::log::scan_bytes;
use crate::model::{self, Dialect, Report};
use crate::render;
use crate::render::naming::OUTPUT_SUFFIX;

/// Read one log and build its report. Only I/O problems are errors.
pub fn analyze_file(path: &Path, dialect: Dialect, download: &DownloadConfig) -> Result<Report> {
    let bytes = fs::read(path).with_context(|| format!("read log file {}", path.display()))?;
    let scanned = scan_bytes(&bytes)?;
    if scanned.is_degraded() {
        warn!(
            "{}: no console block found, using all document text",
            path.display()
        );
    }
    debug!(
        "{}: {} lines from {}",
        path.display(),
        scanned.lines.len(),
        scanned.region
    );

    let source = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    match dialect {
        Dialect::Promotion => model::analyze_promotion(&source, &scanned.lines),
        Dialect::TableDownload => model::analyze_table_download(&source, &scanned.lines, download),
    }
}

pub fn process_file(
    path: &Path,
    dialect: Dialect,
    download: &DownloadConfig,
    run: &RunConfig,
) -> Result<Vec<PathBuf>> {
    let report = analyze_file(path, dialect, download)?;
    render::write_report(&report, path, run)
}

/// Inputs named by `path`: the file itself, or the `*.html` files directly
/// inside a directory (table-download only), sorted. Previously written
/// reports are skipped.
pub fn collect_inputs(path: &Path, dialect: Dialect) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        bail!("input path does not exist: {}", path.display());
    }
    if dialect == Dialect::Promotion {
        bail!("promotion logs are processed one file at a time: {} is a directory", path.display());
    }

    let mut inputs = Vec::new();
    for entry in fs::read_dir(path).with_context(|| format!("list directory {}", path.display()))? {
        let p = entry?.path();
        let is_html = p
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("html"));
        // Reports from an earlier run live alongside the logs.
        let is_report = p
            .file_stem()
            .is_some_and(|stem| stem.to_string_lossy().ends_with(OUTPUT_SUFFIX));
        if p.is_file() && is_html && !is_report {
            inputs.push(p);
        }
    }
    inputs.sort();
    Ok(inputs)
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Input file and the artifacts written for it.
    pub written: Vec<(PathBuf, Vec<PathBuf>)>,
    pub failed: Vec<(PathBuf, anyhow::Error)>,
}

/// Process every input under `path`. A failing file is logged and skipped.
pub fn process_path(
    path: &Path,
    dialect: Dialect,
    download: &DownloadConfig,
    run: &RunConfig,
) -> Result<BatchOutcome> {
    let inputs = collect_inputs(path, dialect)?;
    if inputs.is_empty() {
        warn!("no .html files found in {}", path.display());
    }

    let mut outcome = BatchOutcome::default();
    for input in inputs {
        match process_file(&input, dialect, download, run) {
            Ok(paths) => outcome.written.push((input, paths)),
            Err(e) => {
                error!("{}: {:#}", input.display(), e);
                outcome.failed.push((input, e));
            }
        }
    }
    Ok(outcome)
}
