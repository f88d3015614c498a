//! One full run: load config, prepare `data_dir`, resolve resources, download.

use crate::batch::{self, BatchReport};
use crate::config::{self, ConfigError, FetchConfig, DEFAULT_CONFIG_FILE};
use crate::downloader::{Fetch, HttpFetcher};
use crate::progress::ProgressMode;
use crate::resolver::{self, Resolution, SkipReason};
use std::path::PathBuf;

/// Inputs of a run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config_path: PathBuf,
    pub progress: ProgressMode,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_FILE),
            progress: ProgressMode::Console,
        }
    }
}

/// How a run ended. Every variant has already been logged.
#[derive(Debug)]
pub enum RunOutcome {
    /// Config could not be loaded or `data_dir` could not be created; nothing was downloaded.
    ConfigFailed(ConfigError),
    /// Nothing to do (flag disabled, no links, empty mapping).
    Skipped(SkipReason),
    /// The batch ran; individual entries may have failed.
    Finished(BatchReport),
}

impl RunOutcome {
    /// True when the config failed or any download failed.
    pub fn has_failures(&self) -> bool {
        match self {
            RunOutcome::ConfigFailed(_) => true,
            RunOutcome::Skipped(_) => false,
            RunOutcome::Finished(report) => report.has_failures(),
        }
    }
}

/// Loads the config at `options.config_path` and runs the batch over HTTP.
pub fn run(options: &RunOptions) -> RunOutcome {
    let cfg = match config::load(&options.config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("error reading {}: {}", options.config_path.display(), e);
            return RunOutcome::ConfigFailed(e);
        }
    };
    tracing::debug!("loaded config: {:?}", cfg);

    let fetcher = HttpFetcher::new(cfg.http.clone());
    execute(&cfg, &fetcher, options.progress)
}

/// Runs an already loaded config with the given fetcher.
pub fn execute<F>(cfg: &FetchConfig, fetcher: &F, progress: ProgressMode) -> RunOutcome
where
    F: Fetch + ?Sized,
{
    if let Err(e) = cfg.ensure_data_dir() {
        tracing::error!("{}", e);
        return RunOutcome::ConfigFailed(e);
    }

    match resolver::resolve(cfg) {
        Resolution::Skip(reason) => {
            if reason.is_warning() {
                tracing::warn!("{}", reason);
            } else {
                tracing::info!("{}", reason);
            }
            RunOutcome::Skipped(reason)
        }
        Resolution::Resources(resources) => {
            tracing::debug!(
                count = resources.len(),
                policy = ?cfg.policy,
                "resolved resources"
            );
            let report = batch::run_batch(&resources, &cfg.data_dir, fetcher, progress);
            tracing::debug!(
                completed = report.completed.len(),
                failed = report.failed.len(),
                "batch finished"
            );
            RunOutcome::Finished(report)
        }
    }
}
