//! Report sink: persists the tables of one report as artifacts on disk.

pub mod html;
pub mod naming;

pub use html::render_html_report;
pub use naming::output_base;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use log::info;

use crate::Result;
use crate::config::RunConfig;
use crate::model::Report;
use crate::model::tables::IDENTIFIERS;

/// Write the HTML report (and optionally JSON) for `input`.
///
/// Artifacts go next to the input unless an output directory is configured.
/// Returns the written paths, HTML first.
pub fn write_report(report: &Report, input: &Path, config: &RunConfig) -> Result<Vec<PathBuf>> {
    let dir = match &config.out_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("create output directory {}", dir.display()))?;
            dir.clone()
        }
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    let base = output_base(input, report.dialect);

    if let Some(ids) = report.table(IDENTIFIERS) {
        let flagged = (0..ids.rows.len()).filter(|&row| ids.is_flagged(row)).count();
        if flagged > 0 {
            info!("{}: {} identifier(s) with errors", report.source, flagged);
        }
    }

    let mut written = Vec::new();

    let html_path = dir.join(format!("{base}.html"));
    fs::write(&html_path, render_html_report(report)?)
        .with_context(|| format!("write report {}", html_path.display()))?;
    info!("wrote {}", html_path.display());
    written.push(html_path);

    if config.write_json {
        let json_path = dir.join(format!("{base}.json"));
        fs::write(&json_path, serde_json::to_string_pretty(report)?)
            .with_context(|| format!("write report {}", json_path.display()))?;
        info!("wrote {}", json_path.display());
        written.push(json_path);
    }

    Ok(written)
}
