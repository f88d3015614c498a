//! Response header tracking for the streaming GET.

/// Status and size of the response currently being received.
///
/// Reset on every status line, so after redirects it describes the final response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct ResponseHead {
    pub(super) status: Option<u32>,
    pub(super) content_length: Option<u64>,
}

impl ResponseHead {
    /// Feeds one raw header line (as delivered by curl's header callback).
    pub(super) fn observe(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        if line.starts_with("HTTP/") {
            *self = ResponseHead {
                status: line.split_whitespace().nth(1).and_then(|s| s.parse().ok()),
                content_length: None,
            };
            return;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                self.content_length = value.trim().parse::<u64>().ok();
            }
        }
    }

    /// True once a 2xx status line has been seen.
    pub(super) fn is_success(&self) -> bool {
        matches!(self.status, Some(code) if (200..300).contains(&code))
    }
}
