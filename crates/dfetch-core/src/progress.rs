//! Per-transfer progress reporting (bytes done / total, rate, ETA).
//!
//! The downloader only talks to [`TransferProgress`]; the console bar and the
//! silent reporter are the two implementations used by the CLI.

use indicatif::{ProgressBar, ProgressStyle};

/// Receives progress for a single transfer.
pub trait TransferProgress {
    /// Called once, before the first chunk, with `Content-Length` if the server sent one.
    fn start(&mut self, total: Option<u64>);
    /// Called after each chunk is written.
    fn advance(&mut self, bytes: u64);
    /// Called once the transfer completed successfully.
    fn finish(&mut self);
}

/// How progress is shown for each download of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressMode {
    #[default]
    Console,
    Silent,
}

impl ProgressMode {
    /// Creates a reporter for one transfer labelled `label`.
    pub fn reporter(self, label: &str) -> Box<dyn TransferProgress> {
        match self {
            ProgressMode::Console => Box::new(ConsoleProgress::new(label)),
            ProgressMode::Silent => Box::new(SilentProgress),
        }
    }
}

const BAR_TEMPLATE: &str =
    "{msg} [{bar:30}] {bytes}/{total_bytes} ({binary_bytes_per_sec}, {eta})";
const SPINNER_TEMPLATE: &str = "{msg} {spinner} {bytes} ({binary_bytes_per_sec})";

/// indicatif bar on stderr; a spinner when the total size is unknown.
pub struct ConsoleProgress {
    label: String,
    bar: Option<ProgressBar>,
}

impl ConsoleProgress {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            bar: None,
        }
    }
}

impl TransferProgress for ConsoleProgress {
    fn start(&mut self, total: Option<u64>) {
        let (bar, template) = match total {
            Some(len) => (ProgressBar::new(len), BAR_TEMPLATE),
            None => (ProgressBar::new_spinner(), SPINNER_TEMPLATE),
        };
        let style = ProgressStyle::with_template(template)
            .map(|s| s.progress_chars("=> "))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar.set_message(self.label.clone());
        self.bar = Some(bar);
    }

    fn advance(&mut self, bytes: u64) {
        if let Some(bar) = &self.bar {
            bar.inc(bytes);
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish();
        }
    }
}

impl Drop for ConsoleProgress {
    fn drop(&mut self) {
        // Failed transfer: leave the partial bar visible.
        if let Some(bar) = self.bar.take() {
            bar.abandon();
        }
    }
}

/// Discards all progress.
#[derive(Debug, Default)]
pub struct SilentProgress;

impl TransferProgress for SilentProgress {
    fn start(&mut self, _total: Option<u64>) {}
    fn advance(&mut self, _bytes: u64) {}
    fn finish(&mut self) {}
}
