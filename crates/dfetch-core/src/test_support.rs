//! Shared helpers for unit tests.

use crate::downloader::{Fetch, FetchError};
use crate::progress::TransferProgress;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

/// Records every progress call.
#[derive(Debug, Default)]
pub(crate) struct RecordingProgress {
    /// `Some(total)` once `start` was called.
    pub(crate) total: Option<Option<u64>>,
    pub(crate) chunks: Vec<u64>,
    pub(crate) finished: bool,
}

impl TransferProgress for RecordingProgress {
    fn start(&mut self, total: Option<u64>) {
        self.total = Some(total);
    }

    fn advance(&mut self, bytes: u64) {
        self.chunks.push(bytes);
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}

/// In-memory fetcher: serves bodies by URL, fails with HTTP 404 otherwise.
#[derive(Debug, Default)]
pub(crate) struct StubFetcher {
    bodies: HashMap<String, Vec<u8>>,
    pub(crate) requested: RefCell<Vec<String>>,
}

impl StubFetcher {
    pub(crate) fn with(mut self, url: &str, body: &[u8]) -> Self {
        self.bodies.insert(url.to_string(), body.to_vec());
        self
    }
}

impl Fetch for StubFetcher {
    fn fetch_to(
        &self,
        url: &str,
        dest: &Path,
        progress: &mut dyn TransferProgress,
    ) -> Result<u64, FetchError> {
        self.requested.borrow_mut().push(url.to_string());
        let body = self.bodies.get(url).ok_or(FetchError::Http(404))?;
        progress.start(Some(body.len() as u64));
        std::fs::write(dest, body).map_err(|source| FetchError::Write {
            path: dest.to_path_buf(),
            source,
        })?;
        progress.advance(body.len() as u64);
        progress.finish();
        Ok(body.len() as u64)
    }
}

/// Collects formatted log output in memory.
#[derive(Debug, Clone, Default)]
pub(crate) struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub(crate) fn lines(&self) -> Vec<String> {
        let buf = self.0.lock().unwrap();
        String::from_utf8_lossy(&buf)
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Runs `f` with a pipe-format subscriber writing into this capture.
    /// The level is fixed at `info` regardless of `RUST_LOG`.
    pub(crate) fn run<T>(&self, f: impl FnOnce() -> T) -> T {
        let capture = self.clone();
        let subscriber = crate::logging::build_subscriber_with_filter(
            move || capture.clone(),
            EnvFilter::new("info"),
        );
        tracing::subscriber::with_default(subscriber, f)
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
