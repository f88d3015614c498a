//! CLI for dfetch.

use clap::Parser;
use dfetch_core::config::DEFAULT_CONFIG_FILE;
use dfetch_core::logging;
use dfetch_core::progress::ProgressMode;
use dfetch_core::runner::{self, RunOptions, RunOutcome};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::subscriber::DefaultGuard;

/// Download every dataset named in a YAML config to `<data_dir>/<name>.parquet`.
#[derive(Debug, Parser)]
#[command(name = "dfetch", version)]
#[command(about = "Download the datasets listed in config.yaml", long_about = None)]
pub struct Cli {
    /// Configuration file to read.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Exit with status 1 if the config cannot be loaded or any download fails.
    #[arg(long)]
    pub strict: bool,

    /// Do not draw progress bars.
    #[arg(long)]
    pub no_progress: bool,

    /// Append log lines to this file instead of stderr.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Installs the logger; falls back to stderr if the log file cannot be opened.
    pub fn init_logging(&self) -> DefaultGuard {
        let Some(path) = &self.log_file else {
            return logging::init_logging_stderr();
        };
        match logging::init_logging_file(path) {
            Ok(guard) => guard,
            Err(err) => {
                let guard = logging::init_logging_stderr();
                tracing::warn!("logging to stderr: {:#}", err);
                guard
            }
        }
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            config_path: self.config.clone(),
            progress: if self.no_progress {
                ProgressMode::Silent
            } else {
                ProgressMode::Console
            },
        }
    }

    pub fn run(&self) -> ExitCode {
        let outcome = runner::run(&self.run_options());
        exit_code(&outcome, self.strict)
    }
}

/// Always success unless `strict` and something failed.
fn exit_code(outcome: &RunOutcome, strict: bool) -> ExitCode {
    if strict && outcome.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
