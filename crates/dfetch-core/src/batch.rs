//! Sequential batch over a resolved resource mapping.
//!
//! A failed entry is logged and recorded; the batch always continues.

use crate::downloader::{Fetch, FetchError};
use crate::progress::ProgressMode;
use crate::resolver::ResourceMap;
use crate::url_model;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One entry that could not be downloaded.
#[derive(Debug)]
pub struct FailedResource {
    pub name: String,
    pub url: String,
    pub error: FetchError,
}

/// Outcome of a batch, in mapping order.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Destination paths of completed downloads.
    pub completed: Vec<PathBuf>,
    pub failed: Vec<FailedResource>,
}

impl BatchReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Downloads every entry of `resources` into `data_dir/<name>.parquet`.
///
/// Names that sanitize to the same file (`a/b` and `a_b`) are not both
/// written: the later entry fails with [`FetchError::DestinationTaken`].
pub fn run_batch<F>(
    resources: &ResourceMap,
    data_dir: &Path,
    fetcher: &F,
    progress: ProgressMode,
) -> BatchReport
where
    F: Fetch + ?Sized,
{
    let mut report = BatchReport::default();
    let mut claimed: HashMap<PathBuf, &str> = HashMap::new();
    for resource in resources {
        let dest = url_model::destination_path(data_dir, &resource.name);

        let result = match claimed.get(&dest) {
            Some(by) => Err(FetchError::DestinationTaken {
                path: dest.clone(),
                by: by.to_string(),
            }),
            None => {
                claimed.insert(dest.clone(), &resource.name);
                let label = dest.file_name().unwrap_or(dest.as_os_str()).to_string_lossy();
                let mut reporter = progress.reporter(&format!("Downloading {}", label));
                fetcher.fetch_to(&resource.url, &dest, reporter.as_mut())
            }
        };

        match result {
            Ok(_) => {
                tracing::info!("Downloaded: {}", dest.display());
                report.completed.push(dest);
            }
            Err(error) => {
                tracing::error!("failed to download {}: {}", resource.url, error);
                report.failed.push(FailedResource {
                    name: resource.name.clone(),
                    url: resource.url.clone(),
                    error,
                });
            }
        }
    }
    report
}
