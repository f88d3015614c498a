//! Configuration loaded from `config.yaml`.
//!
//! Only the fixed keys are typed here. Which other keys name resources depends
//! on the source policy, so the raw document is kept for the resolver.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file read when no path is given, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Destination directory when `data_dir` is not set.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Top-level keys never treated as resources under the flat policy.
pub(crate) const RESERVED_KEYS: &[&str] = &["download_data", "data_dir", "policy"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0}")]
    Read(#[from] std::io::Error),

    #[error("{0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("top level must be a mapping")]
    NotAMapping,

    #[error("`{field}` must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("invalid `http` section: {0}")]
    Http(#[source] serde_yaml::Error),

    #[error("failed to create data directory {}: {source}", path.display())]
    CreateDataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// How the `name -> url` mapping is discovered in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourcePolicy {
    /// Top-level string values starting with `http`, plus the legacy `files` mapping.
    Flat,
    /// The `links` mapping, gated by `download_data: true`.
    Links,
}

/// Transfer tuning (optional `http` section).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    /// Seconds allowed for the TCP/TLS connect phase.
    pub connect_timeout_secs: u64,
    /// A transfer slower than 1 KiB/s for this many seconds is aborted.
    pub stall_timeout_secs: u64,
    /// Maximum number of redirects followed per request.
    pub max_redirects: u32,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            stall_timeout_secs: 60,
            max_redirects: 10,
            user_agent: concat!("dfetch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn stall_timeout(&self) -> Duration {
        Duration::from_secs(self.stall_timeout_secs)
    }
}

/// Parsed configuration document.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Root directory for `<name>.parquet` files.
    pub data_dir: PathBuf,
    /// Explicit `policy` key, or inferred (see [`FetchConfig::from_document`]).
    pub policy: SourcePolicy,
    /// `download_data` flag; `None` when absent or null.
    pub download_data: Option<bool>,
    pub http: HttpConfig,
    document: Mapping,
}

impl FetchConfig {
    /// Parses YAML text into a configuration.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_yaml::from_str(text)?;
        Self::from_document(value)
    }

    /// Builds a configuration from an already parsed YAML value.
    ///
    /// When `policy` is absent it is inferred: `links` if the document has a
    /// `links` key, or a `download_data` key and no flat sources (see
    /// `has_flat_sources`); otherwise `flat`.
    pub fn from_document(value: Value) -> Result<Self, ConfigError> {
        let document = match value {
            Value::Mapping(m) => m,
            _ => return Err(ConfigError::NotAMapping),
        };

        let data_dir = match document.get("data_dir") {
            None | Some(Value::Null) => PathBuf::from(DEFAULT_DATA_DIR),
            Some(Value::String(s)) => PathBuf::from(s),
            Some(_) => {
                return Err(ConfigError::InvalidField {
                    field: "data_dir",
                    expected: "a string",
                })
            }
        };

        let download_data = match document.get("download_data") {
            None | Some(Value::Null) => None,
            Some(Value::Bool(b)) => Some(*b),
            Some(_) => {
                return Err(ConfigError::InvalidField {
                    field: "download_data",
                    expected: "a boolean",
                })
            }
        };

        let policy = match document.get("policy") {
            Some(v) => serde_yaml::from_value(v.clone()).map_err(|_| ConfigError::InvalidField {
                field: "policy",
                expected: "`flat` or `links`",
            })?,
            None if document.contains_key("links") => SourcePolicy::Links,
            None if document.contains_key("download_data") && !has_flat_sources(&document) => {
                SourcePolicy::Links
            }
            None => SourcePolicy::Flat,
        };

        let http = match document.get("http") {
            None | Some(Value::Null) => HttpConfig::default(),
            Some(v) => serde_yaml::from_value(v.clone()).map_err(ConfigError::Http)?,
        };

        Ok(Self {
            data_dir,
            policy,
            download_data,
            http,
            document,
        })
    }

    /// The raw top-level mapping, in document order.
    pub fn document(&self) -> &Mapping {
        &self.document
    }

    /// Creates `data_dir` (and parents) if it does not exist.
    pub fn ensure_data_dir(&self) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.data_dir).map_err(|source| ConfigError::CreateDataDir {
            path: self.data_dir.clone(),
            source,
        })
    }
}

/// True if `doc` has a `files` mapping or a non-reserved top-level string
/// value starting with `http`.
fn has_flat_sources(doc: &Mapping) -> bool {
    if let Some(Value::Mapping(_)) = doc.get("files") {
        return true;
    }
    doc.iter().any(|(key, value)| match (key, value) {
        (Value::String(k), Value::String(v)) => {
            !RESERVED_KEYS.contains(&k.as_str()) && v.starts_with("http")
        }
        (Value::Number(_) | Value::Bool(_), Value::String(v)) => v.starts_with("http"),
        _ => false,
    })
}

/// Reads and parses the configuration file at `path`.
pub fn load(path: &Path) -> Result<FetchConfig, ConfigError> {
    let data = fs::read_to_string(path)?;
    FetchConfig::from_yaml_str(&data)
}
