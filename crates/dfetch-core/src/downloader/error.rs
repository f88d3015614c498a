//! Error type for a single resource transfer.

use std::fmt;
use std::path::PathBuf;

/// Failure of one download. Never fatal to the batch.
#[derive(Debug)]
pub enum FetchError {
    /// URL does not parse or is not http/https.
    InvalidUrl { url: String, reason: String },
    /// Server answered with a non-2xx status.
    Http(u32),
    /// Curl reported a transport error (connect, timeout, TLS, ...).
    Curl(curl::Error),
    /// Writing a chunk to the destination file failed.
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Another entry of the same batch already wrote to this destination.
    DestinationTaken { path: PathBuf, by: String },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::InvalidUrl { url, reason } => write!(f, "invalid URL {:?}: {}", url, reason),
            FetchError::Http(code) => write!(f, "HTTP {}", code),
            FetchError::Curl(e) => write!(f, "{}", e),
            FetchError::Write { path, source } => {
                write!(f, "failed to write {}: {}", path.display(), source)
            }
            FetchError::DestinationTaken { path, by } => {
                write!(f, "{} is already used by `{}`", path.display(), by)
            }
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Curl(e) => Some(e),
            FetchError::Write { source, .. } => Some(source),
            FetchError::InvalidUrl { .. }
            | FetchError::Http(_)
            | FetchError::DestinationTaken { .. } => None,
        }
    }
}

impl From<curl::Error> for FetchError {
    fn from(e: curl::Error) -> Self {
        FetchError::Curl(e)
    }
}
