//! Destination file written incrementally as body chunks arrive.

use super::{FetchError, CHUNK_SIZE};
use crate::progress::TransferProgress;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Owns the destination file for the duration of one transfer.
///
/// The file is created (truncated) lazily on the first chunk so a failed
/// response never touches the destination. It is closed when the sink drops,
/// on success and on every error path.
pub(super) struct ChunkSink<'a> {
    path: &'a Path,
    file: Option<File>,
    written: u64,
    error: Option<io::Error>,
    progress: &'a mut dyn TransferProgress,
}

impl<'a> ChunkSink<'a> {
    pub(super) fn new(path: &'a Path, progress: &'a mut dyn TransferProgress) -> Self {
        Self {
            path,
            file: None,
            written: 0,
            error: None,
            progress,
        }
    }

    /// Appends `data` in pieces of at most [`CHUNK_SIZE`]. Returns false once a
    /// write failed; the error is kept for [`ChunkSink::take_error`].
    pub(super) fn accept(&mut self, data: &[u8], total: Option<u64>) -> bool {
        if self.error.is_some() {
            return false;
        }
        for chunk in data.chunks(CHUNK_SIZE) {
            if let Err(e) = self.write_chunk(chunk, total) {
                self.error = Some(e);
                return false;
            }
        }
        true
    }

    fn write_chunk(&mut self, chunk: &[u8], total: Option<u64>) -> io::Result<()> {
        if chunk.is_empty() {
            return Ok(());
        }
        self.open(total)?.write_all(chunk)?;
        self.written += chunk.len() as u64;
        self.progress.advance(chunk.len() as u64);
        Ok(())
    }

    fn open(&mut self, total: Option<u64>) -> io::Result<&mut File> {
        let file = match self.file.take() {
            Some(file) => file,
            None => {
                let file = File::create(self.path)?;
                tracing::debug!(path = %self.path.display(), "opened destination");
                self.progress.start(total);
                file
            }
        };
        Ok(self.file.insert(file))
    }

    pub(super) fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    /// Completes a successful transfer. An empty body still yields an (empty) file.
    pub(super) fn finish(mut self, total: Option<u64>) -> Result<u64, FetchError> {
        let path = self.path;
        let to_write_error = |source| FetchError::Write {
            path: path.to_path_buf(),
            source,
        };
        self.open(total).and_then(|f| f.flush()).map_err(to_write_error)?;
        self.progress.finish();
        Ok(self.written)
    }
}
