//! Run configuration assembled from the command line.

use std::path::PathBuf;

/// Sentinel technology for table-download logs.
pub const DEFAULT_DOWNLOAD_TECHNOLOGY: &str = "AS400";
/// Sentinel phase for table-download logs.
pub const DEFAULT_DOWNLOAD_PHASE: &str = "DOWNLOAD";

/// Values stamped on every table-download event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadConfig {
    pub technology: String,
    pub phase: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            technology: DEFAULT_DOWNLOAD_TECHNOLOGY.to_string(),
            phase: DEFAULT_DOWNLOAD_PHASE.to_string(),
        }
    }
}

/// Where and how report artifacts are written.
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    /// Output directory; `None` writes next to each input file.
    pub out_dir: Option<PathBuf>,
    /// Also write the tables as JSON.
    pub write_json: bool,
}
