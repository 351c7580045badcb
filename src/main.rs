use std::path::PathBuf;

use anyhow::bail;
use clap::{Parser, Subcommand};

mod config;
mod log;
mod logging;
mod model;
mod pipeline;
mod render;

use config::{DEFAULT_DOWNLOAD_PHASE, DEFAULT_DOWNLOAD_TECHNOLOGY, DownloadConfig, RunConfig};
use model::Dialect;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "log-metrics")]
#[command(about = "Timing and error metrics from Jenkins console logs", long_about = None)]
struct Cli {
    /// Show debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Silence all logging.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Phase timings per tag from a promotion log.
    Promotion {
        /// Promotion log (plain text or HTML console page).
        log: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Per-table download times from a table-download console page.
    TableDownload {
        /// An HTML console page, or a directory of them.
        path: PathBuf,

        /// Technology reported for every downloaded table.
        #[arg(long, default_value = DEFAULT_DOWNLOAD_TECHNOLOGY)]
        technology: String,

        /// Phase reported for every downloaded table.
        #[arg(long, default_value = DEFAULT_DOWNLOAD_PHASE)]
        phase: String,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(clap::Args)]
struct OutputArgs {
    /// Write reports here instead of next to each input.
    #[arg(short = 'o', long)]
    out_dir: Option<PathBuf>,

    /// Also write the tables as JSON.
    #[arg(long)]
    json: bool,
}

impl From<OutputArgs> for RunConfig {
    fn from(args: OutputArgs) -> Self {
        RunConfig {
            out_dir: args.out_dir,
            write_json: args.json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose, cli.quiet);

    let (path, dialect, download, run): (PathBuf, Dialect, DownloadConfig, RunConfig) = match cli.cmd {
        Commands::Promotion { log, output } => {
            (log, Dialect::Promotion, DownloadConfig::default(), output.into())
        }
        Commands::TableDownload {
            path,
            technology,
            phase,
            output,
        } => (
            path,
            Dialect::TableDownload,
            DownloadConfig { technology, phase },
            output.into(),
        ),
    };

    let outcome = pipeline::process_path(&path, dialect, &download, &run)?;
    for (_, written) in &outcome.written {
        for p in written {
            println!("Wrote {}", p.display());
        }
    }

    if !outcome.failed.is_empty() {
        bail!(
            "{} of {} file(s) failed",
            outcome.failed.len(),
            outcome.failed.len() + outcome.written.len()
        );
    }
    Ok(())
}
