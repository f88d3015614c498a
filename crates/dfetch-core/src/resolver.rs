//! Derives the `name -> url` resource mapping from a loaded config.
//!
//! Two policies exist (see [`SourcePolicy`]); a config uses exactly one.

use crate::config::{FetchConfig, SourcePolicy, RESERVED_KEYS};
use serde_yaml::{Mapping, Value};
use std::fmt;

/// One named resource to download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub name: String,
    pub url: String,
}

/// Insertion-ordered `name -> url` mapping with unique names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceMap {
    entries: Vec<Resource>,
}

impl ResourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces `name`. A replaced entry keeps its position.
    pub fn insert(&mut self, name: String, url: String) {
        match self.entries.iter_mut().find(|r| r.name == name) {
            Some(existing) => existing.url = url,
            None => self.entries.push(Resource { name, url }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.url.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Resource> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a ResourceMap {
    type Item = &'a Resource;
    type IntoIter = std::slice::Iter<'a, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Why a run ends without downloading anything. None of these is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// `download_data` is absent or false.
    DownloadDisabled,
    /// `links` is absent.
    LinksMissing,
    /// `links` is present but not a mapping.
    LinksNotAMapping,
    /// Resolution produced no entries.
    NoResources,
}

impl SkipReason {
    /// Whether the skip is reported at WARN (otherwise INFO).
    pub fn is_warning(self) -> bool {
        !matches!(self, SkipReason::DownloadDisabled)
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::DownloadDisabled => write!(f, "download_data is disabled, skipping download"),
            SkipReason::LinksMissing => write!(f, "no `links` section in config, nothing to download"),
            SkipReason::LinksNotAMapping => write!(f, "`links` must be a mapping of name to URL, nothing to download"),
            SkipReason::NoResources => write!(f, "no files to download in config"),
        }
    }
}

/// Result of resolving a config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Skip(SkipReason),
    Resources(ResourceMap),
}

/// Resolves the resource mapping according to `cfg.policy`.
/// An empty mapping resolves to [`SkipReason::NoResources`].
pub fn resolve(cfg: &FetchConfig) -> Resolution {
    let resolved = match cfg.policy {
        SourcePolicy::Flat => Ok(resolve_flat(cfg.document())),
        SourcePolicy::Links => resolve_links(cfg),
    };
    match resolved {
        Ok(map) if map.is_empty() => Resolution::Skip(SkipReason::NoResources),
        Ok(map) => Resolution::Resources(map),
        Err(reason) => Resolution::Skip(reason),
    }
}

fn resolve_flat(doc: &Mapping) -> ResourceMap {
    let mut map = ResourceMap::new();
    for (key, value) in doc {
        let (Some(name), Value::String(url)) = (key_name(key), value) else {
            continue;
        };
        if RESERVED_KEYS.contains(&name.as_str()) || !url.starts_with("http") {
            continue;
        }
        map.insert(name, url.clone());
    }

    // Legacy `files` section is merged last and wins on collisions.
    if let Some(Value::Mapping(files)) = doc.get("files") {
        extend_from_section(&mut map, files, "files");
    }
    map
}

fn resolve_links(cfg: &FetchConfig) -> Result<ResourceMap, SkipReason> {
    if cfg.download_data != Some(true) {
        return Err(SkipReason::DownloadDisabled);
    }
    match cfg.document().get("links") {
        None | Some(Value::Null) => Err(SkipReason::LinksMissing),
        Some(Value::Mapping(links)) => {
            let mut map = ResourceMap::new();
            extend_from_section(&mut map, links, "links");
            Ok(map)
        }
        Some(_) => Err(SkipReason::LinksNotAMapping),
    }
}

fn extend_from_section(map: &mut ResourceMap, section: &Mapping, section_name: &str) {
    for (key, value) in section {
        let Some(name) = key_name(key) else {
            tracing::warn!("skipping entry in `{}`: key must be a string", section_name);
            continue;
        };
        match value {
            Value::String(url) => map.insert(name, url.clone()),
            _ => tracing::warn!("skipping {}.{}: URL must be a string", section_name, name),
        }
    }
}

/// Scalar keys become names; numbers and booleans are stringified.
fn key_name(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
