//! Streaming HTTP GET downloader.
//!
//! Each resource is fetched with a single GET whose body is appended to the
//! destination file in chunks of at most [`CHUNK_SIZE`] bytes as it arrives.
//! There is no resume: a new request always starts from byte zero.

mod error;
mod headers;
mod single;
mod sink;

pub use error::FetchError;
pub use single::HttpFetcher;

use crate::progress::TransferProgress;
use std::path::Path;

/// Largest chunk written (and reported to progress) at once.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Fetches one URL into one destination file.
pub trait Fetch {
    /// Downloads `url` into `dest`, creating or truncating it, and returns the
    /// number of bytes written. On failure a partially written `dest` may remain.
    fn fetch_to(
        &self,
        url: &str,
        dest: &Path,
        progress: &mut dyn TransferProgress,
    ) -> Result<u64, FetchError>;
}
