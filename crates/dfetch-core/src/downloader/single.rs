//! Single-stream HTTP GET via libcurl's easy interface.

use super::headers::ResponseHead;
use super::sink::ChunkSink;
use super::{Fetch, FetchError, CHUNK_SIZE};
use crate::config::HttpConfig;
use crate::progress::TransferProgress;
use std::cell::RefCell;
use std::path::Path;
use std::str;

/// Below this rate (bytes/sec) for `stall_timeout` the transfer is aborted.
const LOW_SPEED_LIMIT: u32 = 1024;

/// Blocking downloader; one request per call, runs on the calling thread.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    config: HttpConfig,
}

impl HttpFetcher {
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    fn easy_for(&self, url: &str) -> Result<curl::easy::Easy, FetchError> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.max_redirections(self.config.max_redirects)?;
        easy.fail_on_error(true)?;
        easy.buffer_size(CHUNK_SIZE)?;
        easy.useragent(&self.config.user_agent)?;
        easy.connect_timeout(self.config.connect_timeout())?;
        easy.low_speed_limit(LOW_SPEED_LIMIT)?;
        easy.low_speed_time(self.config.stall_timeout())?;
        Ok(easy)
    }
}

impl Fetch for HttpFetcher {
    fn fetch_to(
        &self,
        url: &str,
        dest: &Path,
        progress: &mut dyn TransferProgress,
    ) -> Result<u64, FetchError> {
        check_url(url)?;
        let mut easy = self.easy_for(url)?;

        let head = RefCell::new(ResponseHead::default());
        let mut sink = ChunkSink::new(dest, progress);

        let performed = {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(line) = str::from_utf8(data) {
                    head.borrow_mut().observe(line);
                }
                true
            })?;
            transfer.write_function(|data| {
                let head = head.borrow();
                // Body of a non-2xx response is never written to the destination.
                if !head.is_success() {
                    return Ok(data.len());
                }
                if sink.accept(data, head.content_length) {
                    Ok(data.len())
                } else {
                    Ok(0) // abort transfer
                }
            })?;
            transfer.perform()
        };

        if let Some(source) = sink.take_error() {
            return Err(FetchError::Write {
                path: dest.to_path_buf(),
                source,
            });
        }
        if let Err(e) = performed {
            if e.is_http_returned_error() {
                return Err(FetchError::Http(easy.response_code()?));
            }
            return Err(FetchError::Curl(e));
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Http(code));
        }

        let total = head.borrow().content_length;
        let written = sink.finish(total)?;
        tracing::debug!(url, bytes = written, "transfer complete");
        Ok(written)
    }
}

/// Accepts only absolute http/https URLs.
fn check_url(raw: &str) -> Result<(), FetchError> {
    let invalid = |reason: String| FetchError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };
    let parsed = url::Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme `{}`", other))),
    }
}
